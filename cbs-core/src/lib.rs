//! CBS Core - Credit-Based Shaper parameter model
//!
//! Translates a set of AVB stream descriptions and the characteristics of the
//! egress link into the four shaper parameters (idleslope, sendslope, hiCredit,
//! loCredit) for SR classes A and B, following IEEE 802.1Q-2014 Annex L.

pub mod aggregate;
pub mod calculator;
pub mod config;
pub mod credits;
pub mod frame;
pub mod stream;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use aggregate::{ClassAggregate, aggregate_class};
pub use calculator::{CbsParameters, calculate, calculate_streams};
pub use config::LinkConfig;
pub use credits::{CreditResult, class_a_credits, class_b_credits};
pub use frame::frame_size;
pub use stream::{SrClass, StreamDescriptor, StreamSpec, Transport};

/// Errors raised while validating input or evaluating the credit equations.
///
/// Descriptor errors are detected before any computation begins. The
/// remaining variants reject configurations the Annex L equations are not
/// defined for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CbsError {
    #[error("Invalid argument format: '{token}' is not a single key=value pair")]
    Format { token: String },

    #[error("Too many parameters: {count} given, at most {max} allowed")]
    TooManyFields { count: usize, max: usize },

    #[error("Missing {field} parameter")]
    MissingField { field: &'static str },

    #[error("Invalid {field} value: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("Invalid link configuration: {reason}")]
    InvalidLinkConfig { reason: String },

    #[error(
        "Class A idleslope {idleslope_a} kbps saturates the {link_speed} kbps link; \
         class B credits are undefined"
    )]
    LinkSaturated { idleslope_a: i64, link_speed: u64 },

    #[error("Arithmetic overflow while computing {stage}")]
    Overflow { stage: &'static str },
}

impl CbsError {
    /// Checks if this error is due to a malformed stream descriptor.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CbsError::Format { .. }
                | CbsError::TooManyFields { .. }
                | CbsError::MissingField { .. }
                | CbsError::InvalidValue { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CbsError>;
