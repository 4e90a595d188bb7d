//! URI heuristics (§4.C): `looks_like_uri`, a liberal, pure predicate used
//! to decide whether an arbitrary string (a `value` attribute, a flashvar,
//! meta-refresh content) is worth treating as a speculative URI. Grounded
//! on the teacher's `utils::url_utils::is_valid_url`, generalized: that
//! function only accepts `http`/`https` absolute URLs (right for its
//! mirror-path use case); this predicate must also accept scheme-relative
//! and path-like fragments, per §4.C, since SPECULATIVE/INFERRED links are
//! explicitly meant to catch looser candidates than a strict parse would.

use std::sync::LazyLock;

use regex::Regex;

static SCHEME_PREFIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z][a-z0-9+.-]*:").expect("static pattern"));

static HAS_RECOGNIZED_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(html?|php|aspx?|jsp|json|xml|css|js|png|jpe?g|gif|svg|pdf|zip)(\?|#|$)")
        .expect("static pattern")
});

static PURE_NUMERIC_OR_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F_-]+$").expect("static pattern"));

/// Liberal, side-effect-free "does this look like a URI" predicate. False
/// positives are acceptable — callers are expected to attempt a real parse
/// before trusting the result — but false negatives lose real links, so
/// this errs toward "yes".
#[must_use]
pub fn looks_like_uri(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return false;
    }

    if SCHEME_PREFIXED.is_match(s) || s.starts_with("//") {
        return true;
    }

    if PURE_NUMERIC_OR_ID.is_match(s) {
        return false;
    }

    let has_slash = s.contains('/');
    let has_extension = HAS_RECOGNIZED_EXTENSION.is_match(s);
    let long_enough_non_punctuation_run = s
        .split(|c: char| c == '/' || c == '?' || c == '#')
        .any(|segment| segment.chars().filter(|c| c.is_alphanumeric()).count() >= 3);

    (has_slash && (has_extension || long_enough_non_punctuation_run)) || has_extension
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_absolute_schemes() {
        assert!(looks_like_uri("http://example.com/x"));
        assert!(looks_like_uri("https://example.com"));
        assert!(looks_like_uri("ftp://h/x"));
    }

    #[test]
    fn accepts_protocol_relative() {
        assert!(looks_like_uri("//cdn.example.com/lib.js"));
    }

    #[test]
    fn accepts_path_like_with_extension() {
        assert!(looks_like_uri("/assets/app.js"));
        assert!(looks_like_uri("images/photo.png"));
    }

    #[test]
    fn rejects_pure_numeric_ids() {
        assert!(!looks_like_uri("12345"));
        assert!(!looks_like_uri("deadbeef"));
    }

    #[test]
    fn rejects_empty() {
        assert!(!looks_like_uri(""));
        assert!(!looks_like_uri("   "));
    }

    #[test]
    fn accepts_long_path_segment_without_extension() {
        assert!(looks_like_uri("/user/profile/settings"));
    }
}
