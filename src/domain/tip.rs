use super::calculation::NewCalculation;
use rust_decimal::Decimal;

/// Tip percent used when the caller does not pick one.
pub const DEFAULT_TIP_PERCENT: u32 = 15;

/// Tip and total derived from a bill amount and a tip percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TipBreakdown {
    pub tip_amount: Decimal,
    pub total_amount: Decimal,
}

impl TipBreakdown {
    /// Packages this breakdown as a record payload for the history store.
    pub fn into_new_calculation(self, bill_amount: Decimal, tip_percent: u32) -> NewCalculation {
        NewCalculation {
            bill_amount,
            tip_percent,
            tip_amount: self.tip_amount,
            total_amount: self.total_amount,
        }
    }
}

/// Computes `tip = bill * percent / 100` and `total = bill + tip`.
///
/// Inputs are not validated. Negative or out-of-range values still produce
/// arithmetically consistent results; range checks belong to the caller.
/// Results beyond the `Decimal` range saturate at `Decimal::MAX`/`Decimal::MIN`.
pub fn compute(bill_amount: Decimal, tip_percent: Decimal) -> TipBreakdown {
    // Scale the percent down first so large bills don't overflow the product.
    let rate = tip_percent / Decimal::ONE_HUNDRED;
    let tip_amount = bill_amount.saturating_mul(rate);
    TipBreakdown {
        tip_amount,
        total_amount: bill_amount.saturating_add(tip_amount),
    }
}

/// [`compute`] with [`DEFAULT_TIP_PERCENT`].
pub fn compute_default(bill_amount: Decimal) -> TipBreakdown {
    compute(bill_amount, Decimal::from(DEFAULT_TIP_PERCENT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compute_twenty_percent() {
        let breakdown = compute(dec!(50.00), dec!(20));
        assert_eq!(breakdown.tip_amount, dec!(10.00));
        assert_eq!(breakdown.total_amount, dec!(60.00));
    }

    #[test]
    fn test_compute_zero_bill() {
        for percent in [0, 15, 30] {
            let breakdown = compute(Decimal::ZERO, Decimal::from(percent));
            assert_eq!(breakdown.tip_amount, Decimal::ZERO);
            assert_eq!(breakdown.total_amount, Decimal::ZERO);
        }
    }

    #[test]
    fn test_compute_zero_percent() {
        let breakdown = compute(dec!(87.45), Decimal::ZERO);
        assert_eq!(breakdown.tip_amount, Decimal::ZERO);
        assert_eq!(breakdown.total_amount, dec!(87.45));
    }

    #[test]
    fn test_compute_holds_for_full_percent_range() {
        let bills = [dec!(0.01), dec!(12.34), dec!(99.99), dec!(1000000)];
        for bill in bills {
            for percent in 0..=30u32 {
                let percent = Decimal::from(percent);
                let breakdown = compute(bill, percent);
                assert_eq!(breakdown.tip_amount, bill * percent / dec!(100));
                assert_eq!(breakdown.total_amount, bill + breakdown.tip_amount);
            }
        }
    }

    #[test]
    fn test_compute_does_not_reject_negative_input() {
        let breakdown = compute(dec!(-20), dec!(10));
        assert_eq!(breakdown.tip_amount, dec!(-2));
        assert_eq!(breakdown.total_amount, dec!(-22));
    }

    #[test]
    fn test_compute_large_bill_does_not_overflow() {
        let bill = Decimal::from_str_exact("10000000000000000000000000000").unwrap();
        let breakdown = compute(bill, dec!(30));
        assert_eq!(breakdown.tip_amount, bill * dec!(0.3));
        assert_eq!(breakdown.total_amount, bill + breakdown.tip_amount);
    }

    #[test]
    fn test_compute_saturates_at_decimal_max() {
        let breakdown = compute(Decimal::MAX, dec!(30));
        assert_eq!(breakdown.tip_amount, Decimal::MAX * dec!(0.3));
        assert_eq!(breakdown.total_amount, Decimal::MAX);

        let breakdown = compute(Decimal::MIN, dec!(30));
        assert_eq!(breakdown.total_amount, Decimal::MIN);
    }

    #[test]
    fn test_compute_default_uses_fifteen_percent() {
        let breakdown = compute_default(dec!(40));
        assert_eq!(breakdown.tip_amount, dec!(6));
        assert_eq!(breakdown.total_amount, dec!(46));
    }

    #[test]
    fn test_into_new_calculation() {
        let calculation = compute(dec!(50), dec!(20)).into_new_calculation(dec!(50), 20);
        assert_eq!(calculation.bill_amount, dec!(50));
        assert_eq!(calculation.tip_percent, 20);
        assert_eq!(calculation.tip_amount, dec!(10));
        assert_eq!(calculation.total_amount, dec!(60));
    }
}
