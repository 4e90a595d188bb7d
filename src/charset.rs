//! Character-set sniffer (§4.B). No teacher module does this — it's new,
//! but follows the teacher's convention of small, pure, regex-driven
//! detection functions (see `utils::url_utils::is_valid_url`) rather than
//! pulling in a whole-document HTML parser just to look at `<meta>` tags.

use std::sync::LazyLock;

use regex::Regex;

static META_CONTENT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta\s+[^>]*http-equiv\s*=\s*["']?content-type["']?[^>]*>"#)
        .expect("static pattern")
});

static META_CHARSET_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)charset\s*=\s*["']?\s*([a-z0-9_-]+)"#).expect("static pattern")
});

static META_CHARSET_SHORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta\s+[^>]*charset\s*=\s*["']?\s*([a-z0-9_-]+)"#).expect("static pattern")
});

static XML_ENCODING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<\?xml[^>]*encoding\s*=\s*["']([a-z0-9_-]+)["'][^>]*\?>"#)
        .expect("static pattern")
});

/// Result of one sniff pass over a content prefix.
pub struct SniffResult {
    /// `None` means no charset could be determined at all.
    pub charset: Option<String>,
    pub annotations: Vec<String>,
}

/// Sniff a charset out of the first `prefix` (already-decoded) characters
/// of a document, per §4.B's four-step procedure.
#[must_use]
pub fn sniff(prefix: &str) -> SniffResult {
    // Step 1: <meta http-equiv=...content-type...> with charset=VALUE
    // inside its attributes.
    if let Some(m) = META_CONTENT_TYPE.find(prefix) {
        if let Some(c) = META_CHARSET_ATTR.captures(m.as_str()) {
            let value = c[1].to_string();
            return resolve(value);
        }
    }

    // Step 2: <meta charset="VALUE">
    if let Some(c) = META_CHARSET_SHORT.captures(prefix) {
        return resolve(c[1].to_string());
    }

    // Step 3: <?xml ... encoding="VALUE"?>
    if let Some(c) = XML_ENCODING.captures(prefix) {
        return resolve(c[1].to_string());
    }

    SniffResult { charset: None, annotations: Vec::new() }
}

fn resolve(value: String) -> SniffResult {
    match encoding_rs::Encoding::for_label(value.as_bytes()) {
        Some(encoding) => SniffResult {
            charset: Some(encoding.name().to_string()),
            annotations: Vec::new(),
        },
        None => SniffResult {
            charset: Some("none".to_string()),
            annotations: vec![format!("unsatisfiableCharsetInHTML:{value}")],
        },
    }
}

/// The reflexive check (§4.B): given a sniffed charset `x` different from
/// the current decoding, the caller re-decodes using `x` and re-sniffs the
/// first `prefix_len` chars. If the second sniff again yields `x`, adopt it
/// (annotated `usingCharsetInHTML:x`); otherwise keep the original
/// (annotated `inconsistentCharsetInHTML:x`).
#[must_use]
pub fn reflexive_check(candidate: &str, re_sniffed_prefix: &str) -> (bool, String) {
    let second = sniff(re_sniffed_prefix);
    match second.charset.as_deref() {
        Some(c) if c.eq_ignore_ascii_case(candidate) => {
            (true, format!("usingCharsetInHTML:{candidate}"))
        }
        _ => (false, format!("inconsistentCharsetInHTML:{candidate}")),
    }
}
