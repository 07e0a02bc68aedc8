use rust_decimal::Decimal;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Tip percents the input surface accepts.
pub const TIP_PERCENT_RANGE: RangeInclusive<u32> = 0..=30;

/// Parses free-text bill input. Anything that is not a number counts as zero.
pub fn parse_bill_amount(text: &str) -> Decimal {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .unwrap_or(Decimal::ZERO)
}
