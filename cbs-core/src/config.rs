//! Link configuration.
//!
//! Describes the egress port the shaper is configured on. Defaults match a
//! gigabit Ethernet link carrying full-size VLAN-tagged best-effort frames.

use serde::Serialize;

use crate::{CbsError, Result};

/// Default link speed in kbps (1 Gbit/s)
pub const DEFAULT_LINK_SPEED: u64 = 1_000_000;
/// Default maximum non-SR frame size in bytes
pub const DEFAULT_FRAME_NON_SR: u64 = 1542;

pub const LINK_SPEED_ENV: &str = "CBS_LINK_SPEED";
pub const FRAME_NON_SR_ENV: &str = "CBS_FRAME_NON_SR";

/// Characteristics of the link the SR classes share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkConfig {
    /// Port transmit rate in kbps
    pub link_speed: u64,
    /// Largest frame best-effort traffic may send, in bytes
    pub frame_non_sr: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            link_speed: DEFAULT_LINK_SPEED,
            frame_non_sr: DEFAULT_FRAME_NON_SR,
        }
    }
}

impl LinkConfig {
    pub fn new(link_speed: u64, frame_non_sr: u64) -> Self {
        Self {
            link_speed,
            frame_non_sr,
        }
    }

    /// Creates configuration with environment variable overrides.
    ///
    /// Unparsable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(speed) = std::env::var(LINK_SPEED_ENV) {
            if let Ok(kbps) = speed.parse::<u64>() {
                config.link_speed = kbps;
            }
        }

        if let Ok(frame) = std::env::var(FRAME_NON_SR_ENV) {
            if let Ok(bytes) = frame.parse::<u64>() {
                config.frame_non_sr = bytes;
            }
        }

        config
    }

    /// Rejects configurations the credit equations are not defined for.
    ///
    /// Returns the link speed as a signed kbps value, ready for slope
    /// arithmetic.
    ///
    /// # Errors
    /// - `CbsError::InvalidLinkConfig` - Zero or out-of-range link speed, or
    ///   zero frame size
    pub fn validate(&self) -> Result<i64> {
        if self.link_speed == 0 {
            return Err(CbsError::InvalidLinkConfig {
                reason: "link speed must be greater than zero".to_string(),
            });
        }
        let link_speed =
            i64::try_from(self.link_speed).map_err(|_| CbsError::InvalidLinkConfig {
                reason: format!("link speed {} kbps is out of range", self.link_speed),
            })?;
        if self.frame_non_sr == 0 {
            return Err(CbsError::InvalidLinkConfig {
                reason: "maximum non-SR frame size must be greater than zero".to_string(),
            });
        }
        Ok(link_speed)
    }
}
