//! Text normalization.

/// Trims a raw string and collapses blank values to `None`.
///
/// This runs last in translation, after every fallback has been applied, so a
/// field populated from an alias that turns out to be whitespace is nulled
/// like any other missing value. Canonical records never contain empty
/// strings.
pub fn clean_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Applies [`clean_text`] through an `Option`.
pub fn clean_opt(raw: Option<String>) -> Option<String> {
    raw.as_deref().and_then(clean_text)
}
