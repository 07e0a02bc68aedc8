use rust_decimal::Decimal;

/// Renders an amount as dollars with two decimals.
///
/// Locale-aware formatting is the platform's job; this is the fixed format
/// used for terminal output and share text.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${:.2}", rounded.abs())
    }
}

/// Plain-text summary of a calculation, ready to hand to a share target.
pub fn share_text(bill_amount: Decimal, tip_percent: u32, tip_amount: Decimal, total_amount: Decimal) -> String {
    format!(
        "Tip Calculation:\nBill: {}\nTip ({}%): {}\nTotal: {}",
        format_currency(bill_amount),
        tip_percent,
        format_currency(tip_amount),
        format_currency(total_amount)
    )
}
