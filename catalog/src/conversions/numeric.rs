//! Parsers for the numeric canonical fields.
//!
//! Listing sources render numbers for humans: currency symbols, thousands
//! separators, unit suffixes and locale-dependent decimal marks all appear in
//! the wild. These parsers strip the decoration and produce plain Rust
//! numerics, returning `None` for anything that does not contain a usable
//! number.

/// Parses a model year.
pub fn parse_year(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

/// Parses a price into a decimal amount.
///
/// Strips currency symbols and thousands separators first. A trailing
/// separator followed by one or two digits is kept as a decimal mark, so both
/// `"$15.000"` (thousands) and `"1,250.50"` (cents) parse correctly.
///
/// Source quirk: several listing pages express prices in thousands, so a
/// parsed amount below 1000 is multiplied by 1000.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    // Split off a decimal tail (1-2 digits after the last separator); every
    // other separator is a thousands mark.
    let (integral, fraction) = match cleaned.rfind(['.', ',']) {
        Some(pos) => {
            let tail = &cleaned[pos + 1..];
            if !tail.is_empty() && tail.len() <= 2 && tail.bytes().all(|b| b.is_ascii_digit()) {
                (&cleaned[..pos], Some(tail))
            } else {
                (cleaned.as_str(), None)
            }
        }
        None => (cleaned.as_str(), None),
    };

    let mut digits: String = integral
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    if let Some(fraction) = fraction {
        digits.push('.');
        digits.push_str(fraction);
    }

    let amount = digits.parse::<f64>().ok()?;
    if amount < 1000.0 {
        Some(amount * 1000.0)
    } else {
        Some(amount)
    }
}

/// Parses a mileage value, tolerating `km`/`kms` suffixes and separators.
pub fn parse_mileage(raw: &str) -> Option<i64> {
    let lowered = raw.to_lowercase();
    let stripped = lowered.replace("kms", "").replace("km", "");
    let digits: String = stripped.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok()
}

/// Parses an engine displacement.
///
/// Prefers a raw cubic-centimeter value (a run of 3-4 digits, e.g. `"1600cc"`)
/// and falls back to a liters figure (e.g. `"1.6"`). Returns `None` when
/// neither pattern is present.
pub fn parse_displacement(raw: &str) -> Option<f64> {
    if let Some(cc) = digit_run(raw, 3, 4) {
        return cc.parse::<f64>().ok();
    }
    liters(raw)
}

/// Finds a liters figure: one or two digits, a `.` or `,` mark, one digit.
///
/// Also used on its own for sources that encode displacement inside a trim
/// description (`"2.0 TDI TM"`), where a digit run would match unrelated
/// numbers.
pub fn liters(raw: &str) -> Option<f64> {
    let bytes = raw.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if !b.is_ascii_digit() {
            continue;
        }
        // Skip to the end of this digit run; a liters mantissa is 1-2 digits.
        let start = i;
        if start > 0 && bytes[start - 1].is_ascii_digit() {
            continue;
        }
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end - start > 2 {
            continue;
        }
        if end < bytes.len()
            && matches!(bytes[end], b'.' | b',')
            && end + 1 < bytes.len()
            && bytes[end + 1].is_ascii_digit()
        {
            let text = format!("{}.{}", &raw[start..end], &raw[end + 1..end + 2]);
            return text.parse::<f64>().ok();
        }
    }
    None
}

/// Finds the first run of consecutive digits with length in `min..=max`.
fn digit_run(raw: &str, min: usize, max: usize) -> Option<&str> {
    let bytes = raw.as_bytes();
    let mut start = None;
    for (i, &b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            let len = i - s;
            if (min..=max).contains(&len) {
                return Some(&raw[s..i]);
            }
        }
    }
    if let Some(s) = start {
        let len = bytes.len() - s;
        if (min..=max).contains(&len) {
            return Some(&raw[s..]);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_parses_plain_integers() {
        assert_eq!(parse_year(" 2020 "), Some(2020));
        assert_eq!(parse_year("n/a"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn price_below_one_thousand_is_expressed_in_thousands() {
        assert_eq!(parse_price("850"), Some(850_000.0));
        assert_eq!(parse_price("15000"), Some(15_000.0));
    }

    #[test]
    fn price_strips_currency_and_thousands_separators() {
        assert_eq!(parse_price("$15.000"), Some(15_000.0));
        assert_eq!(parse_price("USD 12,500"), Some(12_500.0));
        assert_eq!(parse_price("1,250.50"), Some(1_250.50));
    }

    #[test]
    fn price_rejects_text_without_digits() {
        assert_eq!(parse_price("consultar"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn mileage_strips_units_and_separators() {
        assert_eq!(parse_mileage("120.000 km"), Some(120_000));
        assert_eq!(parse_mileage("85,000 kms"), Some(85_000));
        assert_eq!(parse_mileage("42000"), Some(42_000));
        assert_eq!(parse_mileage("sin datos"), None);
    }

    #[test]
    fn displacement_prefers_cubic_centimeters() {
        assert_eq!(parse_displacement("1600cc"), Some(1600.0));
        assert_eq!(parse_displacement("2000"), Some(2000.0));
        // A liters figure is accepted only when no cc run matches.
        assert_eq!(parse_displacement("1.6"), Some(1.6));
        assert_eq!(parse_displacement("motor v8"), None);
    }

    #[test]
    fn liters_matches_short_decimal_figures() {
        assert_eq!(liters("2.0 TDI TM"), Some(2.0));
        assert_eq!(liters("1,6 full equipo"), Some(1.6));
        assert_eq!(liters("version 2024"), None);
    }
}
