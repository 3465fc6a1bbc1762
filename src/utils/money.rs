//! Monetary rounding helpers shared by the ledger and depreciation engines

use bigdecimal::{BigDecimal, RoundingMode};

/// Round an amount half-up (away from zero) to `scale` decimal places
pub fn round_amount(amount: &BigDecimal, scale: i64) -> BigDecimal {
    amount.with_scale_round(scale, RoundingMode::HalfUp)
}

/// Default comparison tolerance: one hundredth of a currency unit
pub fn default_tolerance() -> BigDecimal {
    BigDecimal::new(1.into(), 2)
}

/// True when `a` and `b` differ by at most `tolerance`
pub fn within_tolerance(a: &BigDecimal, b: &BigDecimal, tolerance: &BigDecimal) -> bool {
    (a - b).abs() <= *tolerance
}

/// Fixed two-decimal rendering used by exports
pub fn format_amount(amount: &BigDecimal) -> String {
    round_amount(amount, 2).to_string()
}
