/// Placeholder shown wherever an average is undefined (empty group).
pub const NOT_AVAILABLE: &str = "n/a";

/// Round `value` to `places` decimal places, halves away from zero.
///
/// This is the single rounding rule used for every derived average.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::round_to;
///
/// assert_eq!(round_to(75.0, 2), 75.0);
/// assert_eq!(round_to(33.333_333, 2), 33.33);
/// assert_eq!(round_to(2.0 / 3.0, 2), 0.67);
/// ```
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10_f64.powi(places as i32);
    (value * factor).round() / factor
}

/// `numerator / denominator` rounded to cents, or `None` when the
/// denominator is zero.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::ratio;
///
/// assert_eq!(ratio(150.0, 2), Some(75.0));
/// assert_eq!(ratio(10.0, 0), None);
/// ```
pub fn ratio(numerator: f64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    Some(round_to(numerator / denominator as f64, 2))
}

/// Format a number with thousands separators and a fixed number of decimals.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.prec$}", value.abs(), prec = decimals as usize);

    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if negative && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format an amount of dollars, e.g. `"$1,234.56"`.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_currency;
///
/// assert_eq!(format_currency(1234.56), "$1,234.56");
/// assert_eq!(format_currency(-9.99), "-$9.99");
/// ```
pub fn format_currency(amount: f64) -> String {
    let body = format_number(amount.abs(), 2);
    if amount < 0.0 && body != "0.00" {
        format!("-${}", body)
    } else {
        format!("${}", body)
    }
}

/// Format an optional number, falling back to [`NOT_AVAILABLE`].
pub fn format_optional(value: Option<f64>, decimals: u32) -> String {
    value
        .map(|v| format_number(v, decimals))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Format an optional dollar amount, falling back to [`NOT_AVAILABLE`].
pub fn format_optional_currency(value: Option<f64>) -> String {
    value
        .map(format_currency)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of a digit string.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── round_to / ratio ─────────────────────────────────────────────────────

    #[test]
    fn test_round_to_two_places() {
        assert_eq!(round_to(75.0, 2), 75.0);
        assert_eq!(round_to(1.234, 2), 1.23);
        assert_eq!(round_to(1.236, 2), 1.24);
        assert_eq!(round_to(-1.236, 2), -1.24);
    }

    #[test]
    fn test_round_to_zero_places() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
    }

    #[test]
    fn test_ratio_divides_and_rounds() {
        assert_eq!(ratio(100.0, 3), Some(33.33));
        assert_eq!(ratio(200.0, 3), Some(66.67));
    }

    #[test]
    fn test_ratio_zero_denominator_is_none() {
        assert_eq!(ratio(0.0, 0), None);
        assert_eq!(ratio(123.0, 0), None);
    }

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_no_thousands() {
        assert_eq!(format_number(123.456, 2), "123.46");
    }

    #[test]
    fn test_format_number_exact_thousands() {
        assert_eq!(format_number(1_000.0, 0), "1,000");
        assert_eq!(format_number(100_000.0, 0), "100,000");
    }

    #[test]
    fn test_format_number_negative_rounding_to_zero_has_no_sign() {
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    // ── format_currency ──────────────────────────────────────────────────────

    #[test]
    fn test_format_currency_positive() {
        assert_eq!(format_currency(48_215.5), "$48,215.50");
    }

    #[test]
    fn test_format_currency_zero() {
        assert_eq!(format_currency(0.0), "$0.00");
    }

    #[test]
    fn test_format_currency_negative_adjustment() {
        assert_eq!(format_currency(-40.0), "-$40.00");
    }

    // ── optional formatting ──────────────────────────────────────────────────

    #[test]
    fn test_format_optional_none_is_placeholder() {
        assert_eq!(format_optional(None, 2), "n/a");
        assert_eq!(format_optional_currency(None), "n/a");
    }

    #[test]
    fn test_format_optional_some() {
        assert_eq!(format_optional(Some(3.5), 2), "3.50");
        assert_eq!(format_optional_currency(Some(95.0)), "$95.00");
    }
}
