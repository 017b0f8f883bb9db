//! Number formatting for reports

use rust_decimal::Decimal;

/// Format a value with thousands separators and a fixed number of decimals.
///
/// Rounds half to even, e.g. `1234567.891` at 2 decimals -> `1,234,567.89`.
pub fn format_amount(value: Decimal, decimals: u32) -> String {
    let mut rounded = value.round_dp(decimals);
    rounded.rescale(decimals);

    let text = rounded.to_string();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut out = String::with_capacity(text.len() + int_part.len() / 3);
    out.push_str(sign);
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Dollar-prefixed variant of [`format_amount`]
pub fn format_usd(value: Decimal, decimals: u32) -> String {
    if value.is_sign_negative() && !value.is_zero() {
        format!("-${}", format_amount(value.abs(), decimals))
    } else {
        format!("${}", format_amount(value, decimals))
    }
}

/// Percentage rounded for display, e.g. `12.3456` -> `12.35%`
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", value.round_dp(2).normalize())
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
