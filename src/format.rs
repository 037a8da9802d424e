//! Number formatting for messages and log output, and lenient parsing of
//! user-entered numbers.

use num_format::{Locale, ToFormattedString};

/// Group the integer part of `scaled / 10^decimals` and append the fraction.
fn grouped(value: f64, decimals: u32, trim_fraction: bool) -> String {
    let factor = 10u128.pow(decimals);
    let scaled = (value.abs() * factor as f64).round() as u128;
    let whole = (scaled / factor).to_formatted_string(&Locale::en);
    let sign = if value < 0.0 && scaled != 0 { "-" } else { "" };

    if decimals == 0 {
        return format!("{}{}", sign, whole);
    }

    let mut fraction = format!("{:0width$}", scaled % factor, width = decimals as usize);
    if trim_fraction {
        fraction.truncate(fraction.trim_end_matches('0').len());
    }

    if fraction.is_empty() {
        format!("{}{}", sign, whole)
    } else {
        format!("{}{}.{}", sign, whole, fraction)
    }
}

/// Thousands-grouped number with up to three fraction digits, e.g. `60,000`
/// or `0.625`.
pub fn format_amount(value: f64) -> String {
    grouped(value, 3, true)
}

/// US dollar amount with two fraction digits, e.g. `$64,230.00`.
pub fn format_currency(value: f64) -> String {
    let body = grouped(value, 2, false);
    match body.strip_prefix('-') {
        Some(rest) => format!("-${}", rest),
        None => format!("${}", body),
    }
}

/// Signed percentage with two fraction digits, or `-` when absent.
pub fn format_percentage(value: Option<f64>) -> String {
    match value {
        Some(v) if v > 0.0 => format!("+{:.2}%", v),
        Some(v) => format!("{:.2}%", v),
        None => "-".to_string(),
    }
}

/// Read the longest number at the start of `raw`, ignoring leading
/// whitespace and whatever follows the number.
///
/// `"12abc"` reads as 12 and `"1.5 btc"` as 1.5. Returns `None` when no
/// digits lead the input or the value is not finite.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |start: usize| {
        let mut end = start;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        end
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if frac_end > end + 1 {
            digits += frac_end - end - 1;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(60_000.0), "60,000");
        assert_eq!(format_amount(0.625), "0.625");
        assert_eq!(format_amount(1_234.5), "1,234.5");
        assert_eq!(format_amount(0.0001), "0");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(64_230.0), "$64,230.00");
        assert_eq!(format_currency(0.16), "$0.16");
        assert_eq!(format_currency(-12.5), "-$12.50");
    }

    #[test]
    fn test_parse_number_reads_leading_value() {
        assert_eq!(parse_number("12abc"), Some(12.0));
        assert_eq!(parse_number("1.5 btc"), Some(1.5));
        assert_eq!(parse_number("60000$"), Some(60_000.0));
        assert_eq!(parse_number("  -2.5"), Some(-2.5));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("5."), Some(5.0));
        assert_eq!(parse_number("1e3x"), Some(1_000.0));
        assert_eq!(parse_number("2e"), Some(2.0));
    }

    #[test]
    fn test_parse_number_without_digits() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("$60000"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("1e999"), None);
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(Some(1.234)), "+1.23%");
        assert_eq!(format_percentage(Some(-0.5)), "-0.50%");
        assert_eq!(format_percentage(None), "-");
    }
}
