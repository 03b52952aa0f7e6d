use std::sync::OnceLock;

use regex::Regex;

// ASCII digits only; a Unicode-aware \d would admit digit runs the
// 4/2/2 byte re-split cannot slice.
static DATE_RE: OnceLock<Regex> = OnceLock::new();

/// Normalize a raw account-holder identifier into the identity key:
/// strip everything that is not alphanumeric. "123.456.789-01" and
/// "12345678901" collapse to the same key; a blank input collapses to
/// the unknown-identity key "".
pub fn normalize_identity(raw: &str) -> String {
    raw.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Extract a calendar date embedded in a filename or field.
///
/// Recognizes the leftmost digit run shaped `YYYY-MM-DD`, `YYYY_MM_DD`
/// or `YYYYMMDD` and renders it as `YYYY-MM-DD`. Runs with one
/// separator are stripped and re-split 4/2/2 — even when the result is
/// not a sane calendar date; date sanity is not this function's job.
/// Returns "" (the unknown-date sentinel) when nothing matches.
pub fn extract_date(text: &str) -> String {
    let re = DATE_RE
        .get_or_init(|| Regex::new(r"[0-9]{4}[-_]?[0-9]{2}[-_]?[0-9]{2}").unwrap());
    let Some(m) = re.find(text) else {
        return String::new();
    };

    let mut digits = m.as_str().replace('_', "-");
    if digits.matches('-').count() == 2 {
        return digits;
    }
    digits.retain(|c| c != '-');
    format!("{}-{}-{}", &digits[..4], &digits[4..6], &digits[6..8])
}

/// Parse a locale-tolerant decimal amount into signed cents, rounding
/// half away from zero beyond two decimals.
///
/// Separator rule: with both `.` and `,` present the rightmost one is
/// the decimal separator and the other kind is grouping ("1.234,56");
/// a single occurrence of one kind is the decimal separator ("1234,56",
/// "0.005"); repeated occurrences of one kind are all grouping
/// ("1.234.567"). Embedded spaces are dropped.
pub fn parse_amount_cents(text: &str) -> Option<i64> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let (negative, unsigned) = match compact.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, compact.strip_prefix('+').unwrap_or(&compact)),
    };
    if unsigned.is_empty() {
        return None;
    }

    let dots = unsigned.matches('.').count();
    let commas = unsigned.matches(',').count();
    let dec_pos = if dots > 0 && commas > 0 {
        unsigned.rfind('.').max(unsigned.rfind(','))
    } else if dots == 1 {
        unsigned.rfind('.')
    } else if commas == 1 {
        unsigned.rfind(',')
    } else {
        None
    };

    let (int_part, frac_part) = match dec_pos {
        Some(pos) => (&unsigned[..pos], &unsigned[pos + 1..]),
        None => (unsigned, ""),
    };

    let int_digits: String = int_part.chars().filter(|c| *c != '.' && *c != ',').collect();
    if !int_digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if int_digits.is_empty() && frac_part.is_empty() {
        return None;
    }

    let int_value: i64 = if int_digits.is_empty() {
        0
    } else {
        int_digits.parse().ok()?
    };

    // Scale the fraction to thousandths, then round the third digit
    // half away from zero.
    let mut thousandths: i64 = 0;
    for (i, c) in frac_part.chars().take(3).enumerate() {
        thousandths += (c as i64 - '0' as i64) * 10_i64.pow(2 - i as u32);
    }
    let frac_cents = thousandths / 10 + i64::from(thousandths % 10 >= 5);

    let cents = int_value.checked_mul(100)?.checked_add(frac_cents)?;
    Some(if negative { -cents } else { cents })
}
