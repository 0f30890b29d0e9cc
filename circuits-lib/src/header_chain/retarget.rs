//! # Difficulty Retarget Validator
//!
//! Decides whether the compact bits claimed by the first header of an epoch
//! follow from the previous epoch's bits and its measured duration.
//!
//! The check only multiplies, compares and subtracts, the same operations the
//! circuit has. Instead of dividing the scaled target by the epoch duration,
//! the claimed target is scaled up by the duration and the difference between
//! the two products must fall inside a variance window derived from the hex
//! digit lengths of the operands. Where a quotient is needed for reporting it
//! is produced by [`long_divide`], a fixed-width shift-and-subtract division.

use std::cmp::Ordering;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::BlockHeader;
use crate::common::constants::{FIELD_BITS, MAX_TARGET_BITS, TARGET_TIME_DELTA};

/// How the measured epoch duration is bounded before it scales the target.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RetargetRule {
    /// Clamp the duration to `[TARGET_TIME_DELTA / 4, TARGET_TIME_DELTA * 4]`.
    #[default]
    BitcoinConsensus,
    /// Only cap the scaled target at the proof-of-work limit. Negative
    /// durations count as zero.
    CeilingOnly,
}

/// Outcome of a retarget check. An invalid retarget is a legitimate result,
/// not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetargetVerdict {
    pub valid: bool,
    /// Target of the epoch head.
    pub current_target: BigUint,
    /// Target the next epoch head should carry.
    pub next_target: BigUint,
    /// Compact form of `next_target`.
    pub expected_bits: u32,
    pub max_variance: BigUint,
    pub delta: BigUint,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RetargetValidator {
    rule: RetargetRule,
}

impl RetargetValidator {
    pub fn new(rule: RetargetRule) -> Self {
        RetargetValidator { rule }
    }

    pub fn rule(&self) -> RetargetRule {
        self.rule
    }

    /// Checks `next_epoch_head_bits` against the retarget of
    /// `epoch_head_bits` over `time_delta` seconds.
    ///
    /// ## Parameters
    ///
    /// * `epoch_head_bits` - Compact bits of the current epoch head
    /// * `time_delta` - Epoch tail time minus epoch head time, in seconds
    /// * `next_epoch_head_bits` - Compact bits claimed by the next epoch head
    pub fn validate(
        &self,
        epoch_head_bits: u32,
        time_delta: i64,
        next_epoch_head_bits: u32,
    ) -> RetargetVerdict {
        let timespan = self.bound_timespan(time_delta);
        let target_time_delta = BigUint::from(TARGET_TIME_DELTA);

        let current_target = expand(epoch_head_bits);
        let ceiling = max_target() * &target_time_delta;
        let raw_retarget = (&current_target * timespan).min(ceiling);
        let claimed = expand(next_epoch_head_bits) * &target_time_delta;

        let digit_gap = hex_digit_length(&raw_retarget) as i64
            - hex_digit_length(&BigUint::from(next_epoch_head_bits & 0x00ff_ffff)) as i64;
        let max_variance = match digit_gap {
            gap if gap < 0 || gap > 32 => BigUint::zero(),
            gap => (BigUint::one() << (4 * gap as u64)) - 1u32,
        };

        let delta = match raw_retarget.cmp(&claimed) {
            Ordering::Less => &max_variance + 1u32,
            _ => &raw_retarget - &claimed,
        };
        let valid = digit_gap >= 0 && delta <= max_variance;

        let next_target = long_divide(
            &raw_retarget,
            &target_time_delta,
            division_width(&target_time_delta),
        )
        // The ceiling keeps the dividend inside the division width.
        .unwrap_or_else(max_target);
        let expected_bits = target_to_bits(&next_target);

        debug!(
            epoch_head_bits = %format!("{epoch_head_bits:08x}"),
            next_epoch_head_bits = %format!("{next_epoch_head_bits:08x}"),
            time_delta,
            timespan,
            digit_gap,
            expected_bits = %format!("{expected_bits:08x}"),
            valid,
            "Validated retarget"
        );

        RetargetVerdict {
            valid,
            current_target,
            next_target,
            expected_bits,
            max_variance,
            delta,
        }
    }

    /// Same as [`Self::validate`], reading times and bits from the epoch
    /// head, the last header of the epoch and the first header of the next
    /// epoch.
    pub fn validate_epoch(
        &self,
        epoch_head: &BlockHeader,
        epoch_tail: &BlockHeader,
        next_epoch_head: &BlockHeader,
    ) -> RetargetVerdict {
        let time_delta = i64::from(epoch_tail.time) - i64::from(epoch_head.time);
        self.validate(epoch_head.bits, time_delta, next_epoch_head.bits)
    }

    fn bound_timespan(&self, time_delta: i64) -> u64 {
        let target_time_delta = i64::from(TARGET_TIME_DELTA);
        let bounded = match self.rule {
            RetargetRule::BitcoinConsensus => {
                time_delta.clamp(target_time_delta / 4, target_time_delta * 4)
            }
            RetargetRule::CeilingOnly => time_delta.max(0),
        };
        bounded as u64
    }
}

/// Expands compact bits into the full target:
/// `coefficient * 256^(exponent - 3)`. Exponents below 3 shift the
/// coefficient right.
pub fn expand(bits: u32) -> BigUint {
    let exponent = bits >> 24;
    let coefficient = BigUint::from(bits & 0x00ff_ffff);
    if exponent >= 3 {
        coefficient << (8 * (exponent as u64 - 3))
    } else {
        coefficient >> (8 * (3 - exponent as u64))
    }
}

/// Converts a target back into compact bits, the inverse of [`expand`] for
/// normalized encodings.
pub fn target_to_bits(target: &BigUint) -> u32 {
    if target.is_zero() {
        return 0;
    }
    let bytes = target.to_bytes_be();
    let mut size = bytes.len() as u32;
    let mut mantissa = bytes
        .iter()
        .take(3)
        .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte));
    if size < 3 {
        mantissa <<= 8 * (3 - size);
    }
    // The high bit of the mantissa is a sign bit.
    if mantissa & 0x0080_0000 != 0 {
        mantissa >>= 8;
        size += 1;
    }
    (size << 24) | mantissa
}

/// Target encoded by the proof-of-work limit bits.
pub fn max_target() -> BigUint {
    expand(MAX_TARGET_BITS)
}

/// Number of hex digits needed to write `value`. Zero has no digits.
pub fn hex_digit_length(value: &BigUint) -> u64 {
    value.bits().div_ceil(4)
}

/// Quotient width available for dividing by `divisor` without leaving the
/// field.
pub fn division_width(divisor: &BigUint) -> u64 {
    FIELD_BITS.saturating_sub(divisor.bits())
}

/// Binary long division over `width` quotient bits, from the most significant
/// bit down.
///
/// Returns `None` when `divisor` is zero or the quotient does not fit into
/// `width` bits.
pub fn long_divide(dividend: &BigUint, divisor: &BigUint, width: u64) -> Option<BigUint> {
    if divisor.is_zero() || *dividend >= divisor << width {
        return None;
    }

    let mut remainder = dividend.clone();
    let mut quotient = BigUint::zero();
    for i in (0..width).rev() {
        let shifted = divisor << i;
        if shifted <= remainder {
            remainder -= shifted;
            quotient += BigUint::one() << i;
        }
    }
    Some(quotient)
}
