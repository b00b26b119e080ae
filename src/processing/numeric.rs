//! Lenient numeric parsing for spreadsheet cells.

/// Parse the longest numeric prefix of `raw`, ignoring leading whitespace.
///
/// Accepts an optional sign, digits with an optional fractional part, an optional exponent, or
/// `Infinity`. Trailing text is ignored (`"12.5%"` → `12.5`, `"1,234"` → `1`). Returns `NaN` when
/// no number starts the string, including for empty input.
pub fn parse_leading_float(raw: &str) -> f64 {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    if s[i..].starts_with("Infinity") {
        return if negative { f64::NEG_INFINITY } else { f64::INFINITY };
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = &s[int_start..i];

    let mut frac_digits = "";
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        frac_digits = &s[frac_start..j];
        if !int_digits.is_empty() || !frac_digits.is_empty() {
            i = j;
        }
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return f64::NAN;
    }

    let mut exponent = "";
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > digits_start {
            exponent = &s[i + 1..j];
        }
    }

    let mut literal = String::with_capacity(int_digits.len() + frac_digits.len() + exponent.len() + 4);
    if negative {
        literal.push('-');
    }
    literal.push_str(if int_digits.is_empty() { "0" } else { int_digits });
    if !frac_digits.is_empty() {
        literal.push('.');
        literal.push_str(frac_digits);
    }
    if !exponent.is_empty() {
        literal.push('e');
        literal.push_str(exponent);
    }

    literal.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::parse_leading_float;

    #[test]
    fn plain_numbers() {
        assert_eq!(parse_leading_float("12.5"), 12.5);
        assert_eq!(parse_leading_float("  -3"), -3.0);
        assert_eq!(parse_leading_float("+.5"), 0.5);
        assert_eq!(parse_leading_float("7."), 7.0);
        assert_eq!(parse_leading_float("1e3"), 1000.0);
        assert_eq!(parse_leading_float("2.5E-1"), 0.25);
    }

    #[test]
    fn trailing_text_is_ignored() {
        assert_eq!(parse_leading_float("12.5%"), 12.5);
        assert_eq!(parse_leading_float("1,234"), 1.0);
        assert_eq!(parse_leading_float("3e"), 3.0);
        assert_eq!(parse_leading_float("4e+x"), 4.0);
    }

    #[test]
    fn non_numbers_are_nan() {
        assert!(parse_leading_float("").is_nan());
        assert!(parse_leading_float("NA").is_nan());
        assert!(parse_leading_float("-").is_nan());
        assert!(parse_leading_float(".").is_nan());
        assert!(parse_leading_float("#DIV/0!").is_nan());
    }

    #[test]
    fn infinity() {
        assert_eq!(parse_leading_float("Infinity"), f64::INFINITY);
        assert_eq!(parse_leading_float("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_leading_float("inf").is_nan());
    }
}
