//! Per-class bandwidth aggregation.

use serde::Serialize;

use crate::frame::frame_size;
use crate::stream::StreamSpec;
use crate::{CbsError, Result};

const BITS_PER_BYTE: u128 = 8;
const BITS_PER_KILOBIT: u128 = 1000;

/// Bandwidth demand and largest frame of one SR class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassAggregate {
    /// Largest on-wire frame in the class, in bytes
    pub max_frame_size: u64,
    /// Reserved bandwidth in kbps
    pub idleslope: i64,
}

/// Aggregates every stream in `streams` into a single class demand.
///
/// The per-stream demands are summed exactly in bits per second and the
/// ceiling to kbps is taken once over the total. An empty slice yields the
/// zero aggregate.
///
/// # Errors
/// - `CbsError::Overflow` - The summed idleslope does not fit in an `i64`
pub fn aggregate_class(streams: &[StreamSpec]) -> Result<ClassAggregate> {
    let mut bits_per_second: u128 = 0;
    let mut max_frame_size = 0;

    for stream in streams {
        let size = frame_size(stream);
        let stream_bits = u128::from(stream.rate) * u128::from(size) * BITS_PER_BYTE;
        tracing::debug!(
            %stream,
            frame_size = size,
            bits_per_second = %stream_bits,
            "Accounted stream"
        );

        bits_per_second = bits_per_second
            .checked_add(stream_bits)
            .ok_or(CbsError::Overflow { stage: "idleslope" })?;
        max_frame_size = max_frame_size.max(size);
    }

    let idleslope = i64::try_from(bits_per_second.div_ceil(BITS_PER_KILOBIT))
        .map_err(|_| CbsError::Overflow { stage: "idleslope" })?;

    Ok(ClassAggregate {
        max_frame_size,
        idleslope,
    })
}
