//! End-to-end CBS parameter calculation.

use std::fmt;

use serde::Serialize;

use crate::aggregate::{ClassAggregate, aggregate_class};
use crate::config::LinkConfig;
use crate::credits::{CreditResult, class_a_credits, class_b_credits};
use crate::stream::{SrClass, StreamDescriptor, StreamSpec};
use crate::Result;

/// Shaper parameters for both SR classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CbsParameters {
    pub class_a: CreditResult,
    pub class_b: CreditResult,
}

impl CbsParameters {
    /// Parameters of the given class.
    pub fn class(&self, class: SrClass) -> &CreditResult {
        match class {
            SrClass::A => &self.class_a,
            SrClass::B => &self.class_b,
        }
    }

    /// Bandwidth reserved by both classes together, in kbps.
    ///
    /// Widened to `i128`: each class may reserve up to `i64::MAX` on its own.
    pub fn total_idleslope(&self) -> i128 {
        i128::from(self.class_a.idleslope) + i128::from(self.class_b.idleslope)
    }
}

impl fmt::Display for CbsParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for class in SrClass::ALL {
            writeln!(f, "Class {class}: {}", self.class(class))?;
        }
        Ok(())
    }
}

/// Computes the shaper parameters of both SR classes.
///
/// Every descriptor is resolved and the link is validated before any
/// equation runs, so a failure never leaves a partially computed result.
///
/// # Errors
/// - `CbsError::InvalidValue` - A descriptor has a non-numeric rate or psize
/// - `CbsError::InvalidLinkConfig` - Degenerate link configuration
/// - `CbsError::LinkSaturated` - Class A alone consumes the whole link
/// - `CbsError::Overflow` - Inputs too large for the integer model
pub fn calculate(descriptors: &[StreamDescriptor], link: &LinkConfig) -> Result<CbsParameters> {
    let streams = descriptors
        .iter()
        .map(StreamDescriptor::resolve)
        .collect::<Result<Vec<_>>>()?;
    calculate_streams(&streams, link)
}

/// Computes the shaper parameters from already resolved streams.
///
/// # Errors
/// Same as [`calculate`], minus descriptor coercion.
pub fn calculate_streams(streams: &[StreamSpec], link: &LinkConfig) -> Result<CbsParameters> {
    let link_speed = link.validate()?;

    let aggregate_a = aggregate_class(&streams_of(streams, SrClass::A))?;
    let aggregate_b = aggregate_class(&streams_of(streams, SrClass::B))?;
    tracing::debug!(?aggregate_a, ?aggregate_b, "Aggregated SR classes");

    let sendslope_a = aggregate_a.idleslope - link_speed;
    let (hicredit_a, locredit_a) = class_a_credits(
        aggregate_a.idleslope,
        sendslope_a,
        link.link_speed,
        link.frame_non_sr,
        aggregate_a.max_frame_size,
    )?;

    let sendslope_b = aggregate_b.idleslope - link_speed;
    let (hicredit_b, locredit_b) = class_b_credits(
        aggregate_a.idleslope,
        aggregate_b.idleslope,
        sendslope_b,
        link.link_speed,
        link.frame_non_sr,
        aggregate_a.max_frame_size,
        aggregate_b.max_frame_size,
    )?;

    let parameters = CbsParameters {
        class_a: credit_result(&aggregate_a, sendslope_a, hicredit_a, locredit_a),
        class_b: credit_result(&aggregate_b, sendslope_b, hicredit_b, locredit_b),
    };

    for class in SrClass::ALL {
        tracing::info!(%class, parameters = %parameters.class(class), "Computed CBS parameters");
    }
    if parameters.total_idleslope() > i128::from(link_speed) {
        tracing::warn!(
            total_idleslope = %parameters.total_idleslope(),
            link_speed,
            "SR classes reserve more bandwidth than the link provides"
        );
    }

    Ok(parameters)
}

/// Order-preserving selection of the streams belonging to `class`.
fn streams_of(streams: &[StreamSpec], class: SrClass) -> Vec<StreamSpec> {
    streams
        .iter()
        .filter(|stream| stream.class == class)
        .copied()
        .collect()
}

fn credit_result(
    aggregate: &ClassAggregate,
    sendslope: i64,
    hicredit: i64,
    locredit: i64,
) -> CreditResult {
    CreditResult {
        idleslope: aggregate.idleslope,
        sendslope,
        hicredit,
        locredit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CbsError;
    use crate::stream::Transport;

    fn descriptor(text: &str) -> StreamDescriptor {
        StreamDescriptor::parse(text).unwrap()
    }

    #[test]
    fn test_single_class_a_stream() {
        let streams = [descriptor("class=a,transport=avtp-aaf,rate=8000,psize=32")];
        let parameters = calculate(&streams, &LinkConfig::default()).unwrap();

        assert_eq!(
            parameters.class_a,
            CreditResult {
                idleslope: 6272,
                sendslope: -993_728,
                hicredit: 10,
                locredit: -97,
            }
        );
        assert_eq!(
            parameters.class_b,
            CreditResult {
                idleslope: 0,
                sendslope: -1_000_000,
                hicredit: 0,
                locredit: 0,
            }
        );
    }

    #[test]
    fn test_display_renders_one_line_per_class() {
        let streams = [descriptor("class=a,transport=avtp-aaf,rate=8000,psize=32")];
        let parameters = calculate(&streams, &LinkConfig::default()).unwrap();

        assert_eq!(
            parameters.to_string(),
            "Class A: idleslope 6272 sendslope -993728 hicredit 10 locredit -97\n\
             Class B: idleslope 0 sendslope -1000000 hicredit 0 locredit 0\n"
        );
    }

    #[test]
    fn test_both_classes() {
        let streams = [
            descriptor("class=a,transport=avtp-aaf,rate=8000,psize=32"),
            descriptor("class=b,transport=avtp-aaf,rate=4000,psize=98"),
        ];
        let parameters = calculate(&streams, &LinkConfig::default()).unwrap();

        // Class B: frame 164, idleslope ceil(4000 * 164 * 8 / 1000) = 5248
        assert_eq!(parameters.class_b.idleslope, 5248);
        assert_eq!(parameters.class_b.sendslope, 5248 - 1_000_000);
        // ceil(5248 * (1542 / 993728 + 98 / 1000000)) = ceil(8.6579...) = 9
        assert_eq!(parameters.class_b.hicredit, 9);
        // ceil(-994752 * 164 / 1000000) = ceil(-163.139...) = -163
        assert_eq!(parameters.class_b.locredit, -163);
        assert_eq!(parameters.total_idleslope(), 6272 + 5248);
    }

    #[test]
    fn test_no_streams_gives_zero_credits() {
        let parameters = calculate(&[], &LinkConfig::default()).unwrap();

        for class in SrClass::ALL {
            let result = parameters.class(class);
            assert_eq!(result.idleslope, 0);
            assert_eq!(result.sendslope, -1_000_000);
            assert_eq!(result.hicredit, 0);
            assert_eq!(result.locredit, 0);
        }
    }

    #[test]
    fn test_numeric_errors_abort_before_computation() {
        let streams = [
            descriptor("class=a,transport=avtp-aaf,rate=8000,psize=32"),
            descriptor("class=b,transport=avtp-aaf,rate=8000,psize=lots"),
        ];

        let result = calculate(&streams, &LinkConfig::default());
        assert_eq!(
            result.unwrap_err(),
            CbsError::InvalidValue {
                field: "psize",
                value: "lots".to_string()
            }
        );
    }

    #[test]
    fn test_zero_link_speed_is_rejected() {
        let result = calculate(&[], &LinkConfig::new(0, 1542));
        assert!(matches!(result, Err(CbsError::InvalidLinkConfig { .. })));
    }

    #[test]
    fn test_saturating_class_a_is_rejected() {
        // 1_000 * 1_066 * 8 / 1000 = 8528 kbps on an 8000 kbps link
        let streams = [StreamSpec::new(SrClass::A, Transport::Aaf, 1000, 1000)];
        let result = calculate_streams(&streams, &LinkConfig::new(8000, 1542));

        assert_eq!(
            result.unwrap_err(),
            CbsError::LinkSaturated {
                idleslope_a: 8528,
                link_speed: 8000
            }
        );
    }

    #[test]
    fn test_oversubscription_is_not_an_error() {
        // Class A fits, the sum does not
        let streams = [
            StreamSpec::new(SrClass::A, Transport::Aaf, 1000, 434),
            StreamSpec::new(SrClass::B, Transport::Aaf, 1000, 434),
        ];
        let parameters = calculate_streams(&streams, &LinkConfig::new(6000, 1542)).unwrap();

        assert_eq!(parameters.class_a.idleslope, 4000);
        assert_eq!(parameters.class_b.idleslope, 4000);
        assert!(parameters.total_idleslope() > 6000);
    }

    #[test]
    fn test_total_idleslope_beyond_i64() {
        let huge = |class| StreamSpec::new(class, Transport::Aaf, u32::MAX, u32::MAX);
        let mut streams = vec![huge(SrClass::A); 32];
        streams.extend(vec![huge(SrClass::B); 32]);

        let idleslope_a = aggregate_class(&streams[..32]).unwrap().idleslope;
        let link = LinkConfig::new(idleslope_a as u64 + 1, 1);
        assert!(link.validate().is_ok());

        let parameters = calculate_streams(&streams, &link).unwrap();

        assert_eq!(parameters.class_a.idleslope, idleslope_a);
        assert_eq!(parameters.class_b.idleslope, idleslope_a);
        assert_eq!(parameters.total_idleslope(), 2 * i128::from(idleslope_a));
        assert!(parameters.total_idleslope() > i128::from(i64::MAX));
    }
}
