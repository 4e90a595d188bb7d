//! The data model (§3): the document-under-extraction and what it emits.
//!
//! `Hop` and `DiscoveredLink` are closed sum types per §9's design note —
//! no trait-object hierarchy, just a tagged enum and a plain struct. `Due`
//! is the per-fetch mutable record; the extractor core touches only the
//! operations listed in §4.H.

use std::collections::{BTreeSet, HashMap};

use crate::replay::ContentSequence;
use crate::uri::Uri;

/// How a link was discovered. Single-character tag in the crawl log, per
/// the glossary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hop {
    /// L — ordinary navigational link.
    NavLink,
    /// E — embedded resource (image, stylesheet, frame src, ...).
    Embed,
    /// X — speculative, heuristically URI-like string.
    Speculative,
    /// R — referral (meta refresh target).
    Refer,
    /// I — inferred by the implied-URI extractor.
    Inferred,
    /// P — prerequisite (reserved for crawler-side use; the core never
    /// emits this hop type itself, but the variant exists so a caller can
    /// tag prerequisite fetches using the same enum).
    Prereq,
}

impl Hop {
    /// The single-character tag used in crawl logs.
    #[must_use]
    pub fn code(self) -> char {
        match self {
            Hop::NavLink => 'L',
            Hop::Embed => 'E',
            Hop::Speculative => 'X',
            Hop::Refer => 'R',
            Hop::Inferred => 'I',
            Hop::Prereq => 'P',
        }
    }
}

impl std::fmt::Display for Hop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl serde::Serialize for Hop {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.code())
    }
}

/// An immutable record of one discovered outlink. Context strings and the
/// target URI are owned copies — §5 requires that emitted records outlive
/// the DUE's content buffer without aliasing it.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DiscoveredLink {
    pub target: Uri,
    pub hop: Hop,
    pub context: String,
}

impl DiscoveredLink {
    #[must_use]
    pub fn new(target: Uri, hop: Hop, context: impl Into<String>) -> Self {
        Self {
            target,
            hop,
            context: context.into(),
        }
    }
}

/// One of the closed error kinds from §7, recorded rather than thrown.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NonFatalFailure {
    BadUri { context: String, detail: String },
    DecodeAnomaly { detail: String },
    OversizeValue { attribute: String, bytes: usize },
    /// §7 `read_error`: I/O failure on the content replay buffer. Recorded
    /// before `extract` stops and returns `false` for this DUE.
    ReadError { detail: String },
}

impl std::fmt::Display for NonFatalFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonFatalFailure::BadUri { context, detail } => {
                write!(f, "bad_uri at {context}: {detail}")
            }
            NonFatalFailure::DecodeAnomaly { detail } => write!(f, "decode_error: {detail}"),
            NonFatalFailure::OversizeValue { attribute, bytes } => {
                write!(f, "oversize_value on {attribute}: {bytes} bytes")
            }
            NonFatalFailure::ReadError { detail } => write!(f, "read_error: {detail}"),
        }
    }
}

/// A [`NonFatalFailure`] with the wall-clock time it was recorded, the same
/// `timestamp: chrono::DateTime<Utc>` shape the teacher stamps onto its own
/// event records (`crawl_events::types`).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct NonFatalFailureRecord {
    pub failure: NonFatalFailure,
    pub at: chrono::DateTime<chrono::Utc>,
}

impl std::fmt::Display for NonFatalFailureRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.at.to_rfc3339(), self.failure)
    }
}

/// Values stored in the DUE's `data_map` side channel (§3, §4.H).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataValue {
    Single(String),
    List(Vec<String>),
}

/// Document-under-extraction: the transient per-fetch object the crawler
/// hands to `extract()`. The extractor mutates it in place and never
/// retains a reference past return (§3 Lifecycle).
pub struct Due {
    request_uri: Uri,
    base_uri: Uri,
    base_uri_locked: bool,
    content_charset: String,
    content: ContentSequence,
    content_type: String,
    outlinks: Vec<DiscoveredLink>,
    annotations: BTreeSet<String>,
    non_fatal_failures: Vec<NonFatalFailureRecord>,
    data_map: HashMap<String, DataValue>,
}

impl Due {
    #[must_use]
    pub fn new(request_uri: Uri, content: ContentSequence, content_type: impl Into<String>) -> Self {
        let base_uri = request_uri.clone();
        Self {
            request_uri,
            base_uri,
            base_uri_locked: false,
            content_charset: "utf-8".to_string(),
            content,
            content_type: content_type.into(),
            outlinks: Vec::new(),
            annotations: BTreeSet::new(),
            non_fatal_failures: Vec::new(),
            data_map: HashMap::new(),
        }
    }

    #[must_use]
    pub fn request_uri(&self) -> &Uri {
        &self.request_uri
    }

    #[must_use]
    pub fn base_uri(&self) -> &Uri {
        &self.base_uri
    }

    /// Invariant 5: `base_uri` is updated at most once per DUE, only by the
    /// first `<base href>` encountered. Later calls are no-ops.
    pub fn set_base_uri(&mut self, new_base: Uri) {
        if !self.base_uri_locked {
            self.base_uri = new_base;
            self.base_uri_locked = true;
        }
    }

    #[must_use]
    pub fn content_charset(&self) -> &str {
        &self.content_charset
    }

    pub fn set_content_charset(&mut self, charset: impl Into<String>) {
        self.content_charset = charset.into();
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// First `n` decoded characters, for charset sniffing and HTML-expected
    /// gating (§4.B, §4.F.7).
    pub fn content_prefix(&self, n: usize) -> anyhow::Result<String> {
        let full = self.content.as_str(&self.content_charset)?;
        Ok(full.chars().take(n).collect())
    }

    /// Full decoded text, for the tag scanner. May involve a replay read
    /// from disk if the content was spilled (see [`ContentSequence`]).
    pub fn content_sequence(&self) -> anyhow::Result<std::borrow::Cow<'_, str>> {
        self.content.as_str(&self.content_charset)
    }

    /// Invariant 4 enforced here: caller passes `max_outlinks`; once the cap
    /// is hit, further pushes are silently dropped.
    pub fn append_outlink(&mut self, link: DiscoveredLink, max_outlinks: usize) {
        if self.outlinks.len() < max_outlinks {
            self.outlinks.push(link);
        }
    }

    #[must_use]
    pub fn outlinks(&self) -> &[DiscoveredLink] {
        &self.outlinks
    }

    pub fn outlinks_mut(&mut self) -> &mut Vec<DiscoveredLink> {
        &mut self.outlinks
    }

    pub fn remove_outlink(&mut self, index: usize) -> DiscoveredLink {
        self.outlinks.remove(index)
    }

    pub fn add_annotation(&mut self, tag: impl Into<String>) {
        self.annotations.insert(tag.into());
    }

    #[must_use]
    pub fn annotations(&self) -> &BTreeSet<String> {
        &self.annotations
    }

    pub fn add_non_fatal_failure(&mut self, failure: NonFatalFailure) {
        tracing::debug!(failure = %failure, "non-fatal extraction failure");
        self.non_fatal_failures.push(NonFatalFailureRecord {
            failure,
            at: chrono::Utc::now(),
        });
    }

    #[must_use]
    pub fn non_fatal_failures(&self) -> &[NonFatalFailureRecord] {
        &self.non_fatal_failures
    }

    pub fn data_map_put(&mut self, key: impl Into<String>, value: DataValue) {
        self.data_map.insert(key.into(), value);
    }

    #[must_use]
    pub fn data_map_contains(&self, key: &str) -> bool {
        self.data_map.contains_key(key)
    }

    #[must_use]
    pub fn data_map_get(&self, key: &str) -> Option<&DataValue> {
        self.data_map.get(key)
    }

    /// Append to a list-valued `data_map` entry, creating it if absent.
    /// Used for `form-offsets` (§4.F.5), which accumulates one entry per
    /// `<form>` tag rather than overwriting.
    pub fn data_map_push_list(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.data_map.entry(key.into()).or_insert_with(|| DataValue::List(Vec::new())) {
            DataValue::List(list) => list.push(value),
            single @ DataValue::Single(_) => {
                let DataValue::Single(existing) = std::mem::replace(single, DataValue::List(Vec::new())) else {
                    unreachable!()
                };
                *single = DataValue::List(vec![existing, value]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::ContentSequence;

    fn due_with(html: &str, request: &str) -> Due {
        let uri = Uri::parse(request).unwrap();
        Due::new(uri, ContentSequence::from_bytes(html.as_bytes().to_vec()), "text/html")
    }

    #[test]
    fn base_uri_defaults_to_request_uri() {
        let due = due_with("<p>hi</p>", "http://h/p/q");
        assert_eq!(due.base_uri().as_str(), "http://h/p/q");
    }

    #[test]
    fn base_uri_set_once() {
        let mut due = due_with("", "http://h/p/q");
        due.set_base_uri(Uri::parse("http://b/").unwrap());
        due.set_base_uri(Uri::parse("http://c/").unwrap());
        assert_eq!(due.base_uri().as_str(), "http://b/");
    }

    #[test]
    fn outlinks_respect_cap() {
        let mut due = due_with("", "http://h/");
        let target = Uri::parse("http://h/x").unwrap();
        for _ in 0..5 {
            due.append_outlink(DiscoveredLink::new(target.clone(), Hop::NavLink, "a/@href"), 3);
        }
        assert_eq!(due.outlinks().len(), 3);
    }
}
