//! On-wire frame size model.

use crate::stream::{StreamSpec, Transport};

/// AVTP stream header
pub const AAF_OVERHEAD: u64 = 24;
/// AVTP stream header + H.264 timestamp field + FU-A headers
pub const CVF_H264_OVERHEAD: u64 = 30;
/// 802.1Q VLAN tag
pub const VLAN_OVERHEAD: u64 = 4;
/// Ethernet header + CRC
pub const L2_OVERHEAD: u64 = 18;
/// Preamble + start frame delimiter + interpacket gap
pub const L1_OVERHEAD: u64 = 20;

impl Transport {
    /// Bytes the transport adds in front of the payload.
    pub fn overhead(self) -> u64 {
        match self {
            Transport::Aaf => AAF_OVERHEAD,
            Transport::CvfH264 => CVF_H264_OVERHEAD,
        }
    }
}

/// Total bytes one packet of `stream` occupies on the wire, including the
/// layer 1 gap so that it can be used directly for bandwidth accounting.
pub fn frame_size(stream: &StreamSpec) -> u64 {
    u64::from(stream.psize) + VLAN_OVERHEAD + L2_OVERHEAD + L1_OVERHEAD + stream.transport.overhead()
}
