//! Validity gate for serials read from the built-in probe

use hauth_domain::constants::BUILTIN_SERIAL_LEN;
use once_cell::sync::Lazy;
use regex::Regex;

static BUILTIN_SERIAL: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[0-9A-Z]+$").expect("static serial pattern")
});

/// Normalise and validate a built-in serial.
///
/// The raw probe output is trimmed and stripped of line separators; the
/// result must be exactly ten characters of `[0-9A-Z]`.
pub fn validate_builtin_serial(raw: &str) -> Option<String> {
    let cleaned: String = raw.trim().chars().filter(|c| !matches!(c, '\n' | '\r')).collect();

    if cleaned.chars().count() == BUILTIN_SERIAL_LEN && BUILTIN_SERIAL.is_match(&cleaned) {
        Some(cleaned)
    } else {
        None
    }
}
