//! Tag scanner and attribute scanner (§4.D, §4.E).
//!
//! §4.D describes a regex-alternation "relevant-tag pattern" scanned
//! directly over `content_sequence`, with priority-ordered alternatives,
//! bounded non-greedy script/style bodies, and cooperative cancellation
//! between matches — a byte-offset-producing token stream, not a DOM walk.
//! That shape is built here with `fancy_regex` (already a teacher
//! dependency), not forced onto a tree-building crate.

use std::sync::LazyLock;

use fancy_regex::Regex;

use crate::config::ExtractorConfig;
use crate::error::ExtractError;

/// One token produced by the tag scanner, in document order.
#[derive(Debug, Clone)]
pub enum TagMatch<'a> {
    /// `<script ...>...</script>` — the open-tag slice (for attribute
    /// scanning) and the inner body (forwarded to the JS sub-extractor).
    Script { open_tag: &'a str, body: &'a str, offset: usize },
    /// `<style ...>...</style>`, likewise for the CSS sub-extractor.
    Style { open_tag: &'a str, body: &'a str, offset: usize },
    /// `<meta ...>`.
    Meta { open_tag: &'a str, offset: usize },
    /// Any other tag with at least one attribute.
    Tag { name: &'a str, open_tag: &'a str, offset: usize },
    /// A comment, excluding conditional comments (`<!--[if` / `<!-->`),
    /// which are filtered out at the pattern level since they are never
    /// semantically interesting to the handler.
    Comment { offset: usize },
}

impl TagMatch<'_> {
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            TagMatch::Script { offset, .. }
            | TagMatch::Style { offset, .. }
            | TagMatch::Meta { offset, .. }
            | TagMatch::Tag { offset, .. }
            | TagMatch::Comment { offset } => *offset,
        }
    }
}

/// Compiled, reusable tag-scan pattern. Built once per [`ExtractorConfig`]
/// (the element-name length cap is baked into the pattern), then reused
/// across documents — per §9's "compiled once, pooled per thread" note.
/// `TagScanner` itself holds no per-document state, so "pooling" here is
/// just "construct once, `&self` thereafter"; nothing about it is
/// thread-unsafe, but callers should not share a scan *session* (the
/// cancellation flag) across threads.
pub struct TagScanner {
    pattern: Regex,
}

impl TagScanner {
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        let name_cap = config.max_element_length;
        // Attribute run: one-or-more `name[=value]` groups, required so
        // bracketless self-closing tags with no attributes (`<br>`, `<hr>`)
        // never match the generic-tag alternative (§4.D edge rule).
        let attr_run = r#"(?:\s+[^\s=<>/]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s<>]*))?)+"#;
        let pattern = format!(
            r#"(?is)(?:(?P<script><script\b[^>]*>)(?P<script_body>.*?)</script\s*>)|(?:(?P<style><style\b[^>]*>)(?P<style_body>.*?)</style\s*>)|(?P<meta><meta\b[^>]*>)|(?:<!--(?!\[if)(?!>).*?-->)|(?:<(?P<tagname>[a-zA-Z][a-zA-Z0-9:_-]{{0,{max}}})\b(?P<tagbody>{attrs})\s*/?>)"#,
            max = name_cap.saturating_sub(1),
            attrs = attr_run,
        );
        Ok(Self {
            pattern: Regex::new(&pattern)?,
        })
    }

    /// Scan `text`, calling `on_match` for each token in document order
    /// until it returns `false` (cooperative cancellation, §5) or the text
    /// is exhausted.
    pub fn scan<'a>(&self, text: &'a str, mut on_match: impl FnMut(TagMatch<'a>) -> bool) -> anyhow::Result<()> {
        let mut pos = 0usize;
        while pos <= text.len() {
            let Some(m) = self.pattern.captures_from_pos(text, pos)? else {
                break;
            };
            let whole = m.get(0).expect("alternation always has group 0");
            let next_pos = whole.end().max(pos + 1);

            let token = if let Some(open) = m.name("script") {
                TagMatch::Script {
                    open_tag: open.as_str(),
                    body: m.name("script_body").map_or("", |b| b.as_str()),
                    offset: whole.start(),
                }
            } else if let Some(open) = m.name("style") {
                TagMatch::Style {
                    open_tag: open.as_str(),
                    body: m.name("style_body").map_or("", |b| b.as_str()),
                    offset: whole.start(),
                }
            } else if let Some(open) = m.name("meta") {
                TagMatch::Meta { open_tag: open.as_str(), offset: whole.start() }
            } else if let Some(name) = m.name("tagname") {
                TagMatch::Tag {
                    name: name.as_str(),
                    open_tag: whole.as_str(),
                    offset: whole.start(),
                }
            } else {
                TagMatch::Comment { offset: whole.start() }
            };

            if !on_match(token) {
                return Ok(());
            }
            pos = next_pos;
        }
        Ok(())
    }
}

/// One attribute-scanner match within a tag's open-tag body (§4.E).
#[derive(Debug, Clone)]
pub struct AttrMatch<'a> {
    pub name: &'a str,
    pub value: String,
}

static ATTR_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r#"(?s)([^\s=<>/]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s<>]*)))?"#)
        .expect("static pattern")
});

/// Scan an open-tag body for `(name, value)` pairs. Names/values are
/// truncated (not rejected) at the configured caps; HTML entities in the
/// value are unescaped before the caller sees them.
pub fn scan_attributes<'a>(
    open_tag_body: &'a str,
    config: &ExtractorConfig,
) -> anyhow::Result<Vec<AttrMatch<'a>>> {
    let mut out = Vec::new();
    for caps in ATTR_PATTERN.captures_iter(open_tag_body) {
        let name_raw = caps.get(1).map_or("", |m| m.as_str());
        // Skip the element-name token itself and a trailing bare `/`.
        if name_raw.is_empty() || name_raw == "/" {
            continue;
        }
        let name = &name_raw[..name_raw.len().min(config.max_attribute_name_length)];
        let value_raw = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        let unescaped = html_escape::decode_html_entities(value_raw);
        let value: String = unescaped
            .chars()
            .take(config.max_attribute_value_length)
            .collect();
        out.push(AttrMatch { name, value });
    }
    // The first token in an open-tag body is the element name, not an
    // attribute; the caller is expected to pass only the body after the
    // element name (see `handler` for how `Tag`/`open_tag` are sliced).
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> TagScanner {
        TagScanner::new(&ExtractorConfig::default()).unwrap()
    }

    #[test]
    fn scans_generic_tag_with_attribute() {
        let html = r#"<a href="/x">hi</a>"#;
        let mut found = Vec::new();
        scanner().scan(html, |m| {
            if let TagMatch::Tag { name, .. } = m {
                found.push(name.to_string());
            }
            true
        }).unwrap();
        assert_eq!(found, vec!["a"]);
    }

    #[test]
    fn skips_bracketless_tags_without_attributes() {
        let html = "<br><hr>text";
        let mut count = 0;
        scanner().scan(html, |_| { count += 1; true }).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn captures_script_block_body() {
        let html = "<script>var x = 1;</script>";
        let mut body = String::new();
        scanner().scan(html, |m| {
            if let TagMatch::Script { body: b, .. } = m {
                body = b.to_string();
            }
            true
        }).unwrap();
        assert_eq!(body, "var x = 1;");
    }

    #[test]
    fn excludes_conditional_comments() {
        let html = "<!--[if IE]>oops<![endif]--><p>ok</p>";
        let mut tags = Vec::new();
        scanner().scan(html, |m| {
            if let TagMatch::Tag { name, .. } = m { tags.push(name.to_string()); }
            true
        }).unwrap();
        assert_eq!(tags, vec!["p"]);
    }

    #[test]
    fn cooperative_cancellation_stops_scan() {
        let html = r#"<a href="/1"><a href="/2"><a href="/3">"#;
        let mut count = 0;
        scanner().scan(html, |_| { count += 1; count < 1 }).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn attribute_scan_unescapes_entities() {
        let attrs = scan_attributes(r#" href="/x?a=1&amp;b=2""#, &ExtractorConfig::default()).unwrap();
        assert_eq!(attrs[0].name, "href");
        assert_eq!(attrs[0].value, "/x?a=1&b=2");
    }

    #[test]
    fn attribute_scan_handles_bare_value() {
        let attrs = scan_attributes(" disabled", &ExtractorConfig::default()).unwrap();
        assert_eq!(attrs[0].name, "disabled");
        assert_eq!(attrs[0].value, "");
    }
}
