//! Credit bounds from IEEE 802.1Q-2014 Annex L.
//!
//! All equations are evaluated in exact integer arithmetic: every quotient is
//! rewritten over a common denominator and rounded up with a single ceiling
//! division, so no intermediate value is ever truncated.

use std::fmt;

use serde::Serialize;

use crate::{CbsError, Result};

/// Shaper parameters of one SR class, in the order they are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CreditResult {
    /// kbps
    pub idleslope: i64,
    /// kbps, negative whenever idleslope is below the link speed
    pub sendslope: i64,
    /// bytes
    pub hicredit: i64,
    /// bytes
    pub locredit: i64,
}

impl fmt::Display for CreditResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "idleslope {} sendslope {} hicredit {} locredit {}",
            self.idleslope, self.sendslope, self.hicredit, self.locredit
        )
    }
}

/// hiCredit and loCredit for SR class A.
///
/// hiCredit follows L-10: credit built up while a class A frame waits behind
/// one maximum-size non-SR frame. loCredit follows L-12: credit spent while
/// transmitting one maximum-size class A frame.
///
/// # Errors
/// - `CbsError::InvalidLinkConfig` - `link_speed` is zero
/// - `CbsError::Overflow` - A result does not fit in an `i64`
pub fn class_a_credits(
    idleslope_a: i64,
    sendslope_a: i64,
    link_speed: u64,
    frame_non_sr: u64,
    max_frame_size_a: u64,
) -> Result<(i64, i64)> {
    let link_speed = nonzero_link_speed(link_speed)?;

    let hicredit = ceil_div(
        mul(i128::from(idleslope_a), i128::from(frame_non_sr), "class A hiCredit")?,
        link_speed,
    );
    let locredit = ceil_div(
        mul(i128::from(sendslope_a), i128::from(max_frame_size_a), "class A loCredit")?,
        link_speed,
    );

    Ok((
        narrow(hicredit, "class A hiCredit")?,
        narrow(locredit, "class A loCredit")?,
    ))
}

/// hiCredit and loCredit for SR class B.
///
/// The interference seen by class B is one maximum non-SR frame plus the
/// maximum class A burst (L-16), substituted into L-3:
///
/// ```text
/// hiCredit B = Rb * ( Mo / (Ro - Ra) + Ma / Ro )
/// ```
///
/// loCredit follows L-2, the same shape as class A.
///
/// # Errors
/// - `CbsError::InvalidLinkConfig` - `link_speed` is zero
/// - `CbsError::LinkSaturated` - `idleslope_a` is not below `link_speed`
/// - `CbsError::Overflow` - A result does not fit in an `i64`
pub fn class_b_credits(
    idleslope_a: i64,
    idleslope_b: i64,
    sendslope_b: i64,
    link_speed: u64,
    frame_non_sr: u64,
    max_frame_size_a: u64,
    max_frame_size_b: u64,
) -> Result<(i64, i64)> {
    let ro = nonzero_link_speed(link_speed)?;
    let ra = i128::from(idleslope_a);
    if ra >= ro {
        return Err(CbsError::LinkSaturated {
            idleslope_a,
            link_speed,
        });
    }

    const STAGE: &str = "class B hiCredit";
    let remaining = ro - ra;
    // Rb * (Mo * Ro + Ma * (Ro - Ra)) / ((Ro - Ra) * Ro)
    let interference = mul(i128::from(frame_non_sr), ro, STAGE)?
        .checked_add(mul(i128::from(max_frame_size_a), remaining, STAGE)?)
        .ok_or(CbsError::Overflow { stage: STAGE })?;
    let hicredit = ceil_div(
        mul(i128::from(idleslope_b), interference, STAGE)?,
        mul(remaining, ro, STAGE)?,
    );

    let locredit = ceil_div(
        mul(i128::from(sendslope_b), i128::from(max_frame_size_b), "class B loCredit")?,
        ro,
    );

    Ok((narrow(hicredit, STAGE)?, narrow(locredit, "class B loCredit")?))
}

fn nonzero_link_speed(link_speed: u64) -> Result<i128> {
    if link_speed == 0 {
        return Err(CbsError::InvalidLinkConfig {
            reason: "link speed must be greater than zero".to_string(),
        });
    }
    Ok(i128::from(link_speed))
}

/// Ceiling of `numerator / denominator` for a positive denominator.
pub(crate) fn ceil_div(numerator: i128, denominator: i128) -> i128 {
    debug_assert!(denominator > 0);
    -(-numerator).div_euclid(denominator)
}

fn mul(lhs: i128, rhs: i128, stage: &'static str) -> Result<i128> {
    lhs.checked_mul(rhs).ok_or(CbsError::Overflow { stage })
}

fn narrow(value: i128, stage: &'static str) -> Result<i64> {
    i64::try_from(value).map_err(|_| CbsError::Overflow { stage })
}
