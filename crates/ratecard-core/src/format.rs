//! Display formatting for money and ratios.

use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount as dollars with two decimals and thousands separators.
///
/// ```
/// use ratecard_core::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1234.5)), "$1,234.50");
/// assert_eq!(format_currency(dec!(-12)), "-$12.00");
/// ```
#[must_use]
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{sign}${}.{fraction}", group_thousands(whole))
}

/// Format a ratio as a percentage with one decimal (`0.3667` → `36.7%`).
#[must_use]
pub fn format_percentage(ratio: Decimal) -> String {
    let percent = (ratio * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{percent:.1}%")
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(850)), "$850.00");
        assert_eq!(format_currency(dec!(1234.567)), "$1,234.57");
        assert_eq!(format_currency(dec!(1000000)), "$1,000,000.00");
        assert_eq!(format_currency(dec!(999.995)), "$1,000.00");
        assert_eq!(format_currency(dec!(-12.5)), "-$12.50");
        assert_eq!(format_currency(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(dec!(0.6)), "60.0%");
        assert_eq!(format_percentage(dec!(55) / dec!(150)), "36.7%");
        assert_eq!(format_percentage(dec!(118) / dec!(150)), "78.7%");
        assert_eq!(format_percentage(dec!(0)), "0.0%");
        assert_eq!(format_percentage(dec!(-0.25)), "-25.0%");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456"), "123,456");
    }
}
