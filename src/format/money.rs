//! Monetary bounds and rounding.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Upper bound for any monetary amount on a DTE.
pub const MAX_AMOUNT: Decimal = dec!(999_999_999_999.99);

/// Whether `value` lies within `[0, MAX_AMOUNT]`.
pub fn in_bounds(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= MAX_AMOUNT
}

/// Round to `dp` decimal places using half-up (commercial rounding).
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Round to the centavo.
pub fn round2(value: Decimal) -> Decimal {
    round_half_up(value, 2)
}

/// Absolute-difference comparison; monetary equality is never exact.
pub fn approx_eq(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    (a - b).abs() <= tolerance
}
