use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Diacritic-stripped, case-folded, ASCII alphanumeric-only form of `s`.
///
/// This is the equality key for names, teammates and group codes.
pub fn normalize(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

// franchises that relocated or were renamed, keyed by their old code
const LEGACY_GROUP_CODES: &[(&str, &str)] = &[
    ("NJN", "BKN"),
    ("SEA", "OKC"),
    ("NOH", "NOP"),
    ("NOK", "NOP"),
    ("CHH", "CHA"),
    ("WSB", "WAS"),
    ("VAN", "MEM"),
];

/// Upper-cased group code with legacy codes mapped to their modern franchise.
pub fn canonical_group_code(code: &str) -> String {
    let raw = code.trim().to_uppercase();
    LEGACY_GROUP_CODES
        .iter()
        .find(|(old, _)| *old == raw)
        .map(|(_, modern)| (*modern).to_string())
        .unwrap_or(raw)
}

/// Equality key for a group code: canonical franchise, then normalized.
pub fn group_key(code: &str) -> String {
    normalize(&canonical_group_code(code))
}

/// Numeric keys lose leading zeros and fractional parts ("00123.0" -> "123");
/// anything else is kept trimmed.
pub fn canonical_person_key(value: &str) -> String {
    let raw = value.trim();
    if raw.is_empty() {
        return String::new();
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => format!("{}", n.trunc() as i64),
        _ => raw.to_string(),
    }
}

pub fn is_numeric_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
