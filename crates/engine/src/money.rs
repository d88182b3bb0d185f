//! Rounding policy for monetary values, ratios, and percentages.
//!
//! Every final monetary output is rounded **half-up** at 2 decimal places;
//! ratios feeding the health score are rounded half-up at 4 decimal places.
//! Intermediate rates stay at full [`Decimal`] precision so exponentiation
//! does not compound rounding error.
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Rounds a monetary amount half-up at 2 decimal places.
pub(crate) fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a ratio half-up at 4 decimal places.
pub(crate) fn round_ratio(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Share of `part` over `whole` as a percentage, rounded at 2 decimal places.
///
/// Returns 0 when `whole` is zero so distribution rows stay renderable.
pub(crate) fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    round_money(part / whole * dec!(100))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_rounds_half_up() {
        assert_eq!(round_money(dec!(2.345)), dec!(2.35));
        assert_eq!(round_money(dec!(2.344)), dec!(2.34));
        assert_eq!(round_money(dec!(659.9557)), dec!(659.96));
        assert_eq!(round_money(dec!(-2.345)), dec!(-2.35));
    }

    #[test]
    fn ratio_rounds_at_four_places() {
        assert_eq!(round_ratio(dec!(0.33335)), dec!(0.3334));
        assert_eq!(round_ratio(dec!(0.33334)), dec!(0.3333));
    }

    #[test]
    fn percent_of_zero_whole_is_zero() {
        assert_eq!(percent_of(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percent_of(dec!(1), dec!(3)), dec!(33.33));
        assert_eq!(percent_of(dec!(2), dec!(3)), dec!(66.67));
    }
}
