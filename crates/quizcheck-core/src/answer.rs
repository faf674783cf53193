//! Free-text answer parsers.
//!
//! Quiz takers in this domain enter distances and bearings in mixed
//! Cyrillic/Latin notation (`2км`, `2km`, `500м.`), so the unit alphabet is
//! a fixed property of the grammar rather than configuration. Each parser is
//! a pure function from raw answer text to a canonical integer; the unit
//! convention of the result is fixed per parser (meters for `distance`,
//! degrees*100+minutes for `direction_angle`).

use crate::error::ParseError;

/// Names the checker snippet language exposes for these parsers.
pub const BUILTIN_NAMES: &[&str] = &["to_int", "distance", "direction_angle"];

/// Parse a strict signed decimal integer.
///
/// Accepts surrounding whitespace and an optional leading `-`, nothing else:
/// no `+` sign, no decimal point, no digit separators.
pub fn to_int(text: &str) -> Result<i64, ParseError> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(format!("invalid integer: '{trimmed}'")));
    }

    trimmed
        .parse::<i64>()
        .map_err(|_| ParseError::new(format!("integer out of range: '{trimmed}'")))
}

/// Parse a distance into a whole number of meters.
///
/// Grammar: `<number><optional unit><optional single trailing '.'>`, matched
/// case-insensitively after trimming. Units: bare number and `m`/`м` are
/// meters, `km`/`км` multiply by 1000. The number may carry a decimal
/// fraction; the product is truncated toward zero, so `distance("2500.5")`
/// is `2500` and `distance("0.5km")` is `500`.
pub fn distance(text: &str) -> Result<i64, ParseError> {
    let normalized = text.trim().to_lowercase();
    let wrong_format = || ParseError::new(format!("Неверный формат расстояния: '{}'", text.trim()));

    // One trailing dot is tolerated after the unit or a bare number ("2км.").
    let body = normalized.strip_suffix('.').unwrap_or(&normalized);

    let (number, multiplier) = if let Some(n) = body.strip_suffix("km").or(body.strip_suffix("км"))
    {
        (n, 1000.0)
    } else if let Some(n) = body.strip_suffix('m').or(body.strip_suffix('м')) {
        (n, 1.0)
    } else {
        (body, 1.0)
    };

    let value = parse_decimal(number).ok_or_else(wrong_format)?;
    Ok((value * multiplier).trunc() as i64)
}

/// Parse a direction angle in degrees or degrees-minutes notation.
///
/// `"20"` is 20 degrees, canonically `2000`; `"20-30"` is 20 degrees 30
/// minutes, canonically `2030`. Whitespace around the single `-` separator
/// is tolerated; minutes are not bound-checked beyond being an integer.
pub fn direction_angle(text: &str) -> Result<i64, ParseError> {
    let trimmed = text.trim();
    let wrong_format = || ParseError::new(format!("Неверный формат угла: '{trimmed}'"));

    let parts: Vec<&str> = trimmed.split('-').collect();
    let (degrees, minutes) = match parts.as_slice() {
        [d] => (*d, None),
        [d, m] => (*d, Some(*m)),
        _ => return Err(wrong_format()),
    };

    let degrees = to_int(degrees).map_err(|_| wrong_format())?;
    let minutes = match minutes {
        Some(m) => to_int(m).map_err(|_| wrong_format())?,
        None => 0,
    };

    degrees
        .checked_mul(100)
        .and_then(|d| d.checked_add(minutes))
        .ok_or_else(wrong_format)
}

/// Strict `-?digits(.digits)?` scan. Rejects everything `f64::from_str`
/// would additionally accept: exponents, `+` signs, `inf`, leading dots.
fn parse_decimal(text: &str) -> Option<f64> {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) {
        return None;
    }
    if let Some(frac) = frac_part {
        if !all_digits(frac) {
            return None;
        }
    }

    text.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_int_simple() {
        assert_eq!(to_int("42").unwrap(), 42);
        assert_eq!(to_int("0").unwrap(), 0);
    }

    #[test]
    fn to_int_whitespace() {
        assert_eq!(to_int("  42  ").unwrap(), 42);
        assert_eq!(to_int("\t42\n").unwrap(), 42);
        assert_eq!(to_int("  -5  ").unwrap(), -5);
    }

    #[test]
    fn to_int_negative() {
        assert_eq!(to_int("-10").unwrap(), -10);
    }

    #[test]
    fn to_int_rejects_floats_and_text() {
        assert!(to_int("3.14").is_err());
        assert!(to_int("abc").is_err());
        assert!(to_int("12a").is_err());
    }

    #[test]
    fn to_int_rejects_empty_and_whitespace() {
        assert!(to_int("").is_err());
        assert!(to_int("   ").is_err());
    }

    #[test]
    fn to_int_rejects_plus_sign_and_separators() {
        assert!(to_int("+5").is_err());
        assert!(to_int("1_000").is_err());
        assert!(to_int("--5").is_err());
    }

    #[test]
    fn to_int_out_of_range() {
        assert!(to_int("99999999999999999999").is_err());
    }

    #[test]
    fn distance_plain_number() {
        assert_eq!(distance("2000").unwrap(), 2000);
        assert_eq!(distance("  2000  ").unwrap(), 2000);
    }

    #[test]
    fn distance_meters_both_scripts() {
        assert_eq!(distance("2000m").unwrap(), 2000);
        assert_eq!(distance("500m").unwrap(), 500);
        assert_eq!(distance("2000м").unwrap(), 2000);
        assert_eq!(distance("500м").unwrap(), 500);
    }

    #[test]
    fn distance_kilometers_both_scripts() {
        assert_eq!(distance("2km").unwrap(), 2000);
        assert_eq!(distance("5km").unwrap(), 5000);
        assert_eq!(distance("2км").unwrap(), 2000);
        assert_eq!(distance("5км").unwrap(), 5000);
    }

    #[test]
    fn distance_fractional_kilometers() {
        assert_eq!(distance("0.5km").unwrap(), 500);
        assert_eq!(distance("1.5км").unwrap(), 1500);
        assert_eq!(distance("2.5km").unwrap(), 2500);
    }

    #[test]
    fn distance_trailing_dot() {
        assert_eq!(distance("2км.").unwrap(), 2000);
        assert_eq!(distance("500м.").unwrap(), 500);
        assert_eq!(distance("2000.").unwrap(), 2000);
    }

    #[test]
    fn distance_case_insensitive() {
        assert_eq!(distance("2KM").unwrap(), 2000);
        assert_eq!(distance("500M").unwrap(), 500);
        assert_eq!(distance("2КМ").unwrap(), 2000);
    }

    #[test]
    fn distance_truncates_fractional_meters() {
        assert_eq!(distance("1500.0m").unwrap(), 1500);
        assert_eq!(distance("2500.5").unwrap(), 2500);
    }

    #[test]
    fn distance_unit_normalization_agrees() {
        for k in [0i64, 1, 2, 7, 40] {
            assert_eq!(
                distance(&format!("{k}km")).unwrap(),
                distance(&format!("{}m", k * 1000)).unwrap()
            );
        }
    }

    #[test]
    fn distance_wrong_format_is_localized() {
        let err = distance("abc").unwrap_err();
        assert!(err.message.contains("Неверный формат"));
    }

    #[test]
    fn distance_rejects_garbage() {
        assert!(distance("").is_err());
        assert!(distance("10xyz").is_err());
        assert!(distance("2..5km").is_err());
        assert!(distance("2.km").is_err());
        assert!(distance("1e3").is_err());
        assert!(distance("2 km").is_err());
    }

    #[test]
    fn angle_degrees_only() {
        assert_eq!(direction_angle("20").unwrap(), 2000);
        assert_eq!(direction_angle("15").unwrap(), 1500);
        assert_eq!(direction_angle("  20  ").unwrap(), 2000);
    }

    #[test]
    fn angle_degrees_minutes() {
        assert_eq!(direction_angle("20-00").unwrap(), 2000);
        assert_eq!(direction_angle("15-30").unwrap(), 1530);
        assert_eq!(direction_angle("0-45").unwrap(), 45);
        assert_eq!(direction_angle("5-00").unwrap(), 500);
        assert_eq!(direction_angle("1-45").unwrap(), 145);
        assert_eq!(direction_angle("10-15").unwrap(), 1015);
        assert_eq!(direction_angle("35-59").unwrap(), 3559);
    }

    #[test]
    fn angle_whitespace_around_separator() {
        assert_eq!(direction_angle("20 - 00").unwrap(), 2000);
        assert_eq!(direction_angle(" 15 - 30 ").unwrap(), 1530);
    }

    #[test]
    fn angle_zero() {
        assert_eq!(direction_angle("0").unwrap(), 0);
        assert_eq!(direction_angle("0-00").unwrap(), 0);
    }

    #[test]
    fn angle_too_many_separators() {
        let err = direction_angle("20-30-40").unwrap_err();
        assert!(err.message.contains("Неверный формат"));
        assert!(direction_angle("1-2-3-4").is_err());
    }

    #[test]
    fn angle_rejects_non_numeric() {
        assert!(direction_angle("abc").is_err());
        assert!(direction_angle("20-xx").is_err());
        assert!(direction_angle("").is_err());
    }

    #[test]
    fn parsers_are_pure() {
        for _ in 0..3 {
            assert_eq!(distance("1.5км").unwrap(), 1500);
            assert_eq!(direction_angle("35-59").unwrap(), 3559);
        }
    }
}
