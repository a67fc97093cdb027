/// Formats an integer with `.` as thousands separator
///
/// # Examples
/// ```ignore
/// assert_eq!(format_number(1234567), "1.234.567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    group_thousands(&n.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut result = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// es-AR number: `.` for thousands, `,` before `decimals` fraction digits
fn format_decimal(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::new();
    // "-0,00" is printed as "0,00"
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

/// `$1.234,56`
pub fn format_currency_ars(value: f64) -> String {
    format!("${}", format_decimal(value, 2))
}

/// `1.234`
pub fn format_quantity(value: f64) -> String {
    format_decimal(value, 0)
}

/// `12,5%`
pub fn format_percentage(value: f64) -> String {
    format!("{}%", format_decimal(value, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(42), "42");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1.000");
        assert_eq!(format_number(1234567), "1.234.567");
    }

    #[test]
    fn test_format_currency_ars() {
        assert_eq!(format_currency_ars(1234.56), "$1.234,56");
        assert_eq!(format_currency_ars(0.0), "$0,00");
        assert_eq!(format_currency_ars(-98765.4), "$-98.765,40");
        assert_eq!(format_currency_ars(-0.001), "$0,00");
        assert_eq!(format_currency_ars(f64::NAN), "$0,00");
    }

    #[test]
    fn test_format_quantity_and_percentage() {
        assert_eq!(format_quantity(1234.4), "1.234");
        assert_eq!(format_quantity(7.0), "7");
        assert_eq!(format_percentage(12.5), "12,5%");
        assert_eq!(format_percentage(100.0), "100,0%");
    }
}
