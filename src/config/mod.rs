//! Extractor configuration (§6's parameter table). Shaped after the
//! teacher's `CrawlConfig`/`CrawlConfigBuilder` (`config/types.rs`,
//! `config/builder.rs`): a plain struct with one documented field per
//! parameter and chainable `with_*` setters. Unlike `CrawlConfig` this
//! config has no required fields, so the typestate builder machinery isn't
//! needed — every field already has a sane default, matching the simpler,
//! always-available builder methods the teacher also uses
//! (`compression_threshold_bytes`, `max_page_retries`).

use regex::Regex;

use crate::error::ExtractError;

/// One configured implied-URI rule (§4.G): if a link's target matches
/// `trigger`, build a new URI via `format` and emit it with hop `Inferred`.
#[derive(Clone, Debug)]
pub struct ImpliedUriPattern {
    pub trigger: Regex,
    pub format: String,
    pub remove_trigger: bool,
}

/// Extractor-wide configuration. Read-only once built; shared immutably
/// across calls to `extract` (§5 — no shared mutable state).
#[derive(Clone, Debug)]
pub struct ExtractorConfig {
    /// Cap on element-name length in the tag scan. Default 64.
    pub max_element_length: usize,
    /// Cap on attribute-name length. Default 64.
    pub max_attribute_name_length: usize,
    /// Cap on attribute-value length; over-long values are truncated, not
    /// rejected. Default 2048.
    pub max_attribute_value_length: usize,
    /// `frame`/`iframe` `src` emits EMBED when true, NAVLINK when false.
    /// Default true.
    pub treat_frames_as_embed_links: bool,
    /// Drop all `action` URIs outright. Default false.
    pub ignore_form_action_urls: bool,
    /// Drop non-GET form actions. Default true.
    pub extract_only_form_gets: bool,
    /// Invoke the JS sub-extractor for `on*` handlers and `javascript:`
    /// URIs. Default true.
    pub extract_javascript: bool,
    /// Consider `value` attributes as possible URIs. Default true.
    pub extract_value_attributes: bool,
    /// Gate extraction per §4.F.7 based on file extension / content-type /
    /// content sniff. Default true.
    pub ignore_unexpected_html: bool,
    /// Drop links whose `rel` contains `nofollow`. Default false.
    pub obey_rel_nofollow: bool,
    /// Cap on total emitted outlinks per document.
    pub max_outlinks: usize,
    /// Honor `<meta name="robots" content="nofollow|none">` by aborting
    /// extraction (§4.F.4, §7). This is the "robots policy" the crawl
    /// context exposes to the extractor; default true.
    pub obey_meta_robots: bool,
    /// Window size, in bytes, fed to the charset sniffer (§4.B). Default
    /// 1000, per spec.
    pub sniff_window_bytes: usize,
    /// Charset assumed when sniffing yields nothing usable. Default
    /// "windows-1252", matching the web's de-facto default for untagged
    /// legacy HTML.
    pub default_charset_fallback: String,
    /// MIME-type prefixes treated as "definitely HTML" in §4.F.7's gate.
    pub html_expected_mime_types: Vec<String>,
    /// File extensions (lowercased, no dot) treated as "definitely not
    /// HTML" in §4.F.7's gate.
    pub non_html_extensions: Vec<String>,
    /// Parse `srcset`-family attributes into individual URIs (§4.F.6).
    /// Default true.
    pub extract_srcset: bool,
    /// Implied-URI rules (§4.G). Empty by default — a no-op pass.
    pub implied_uri_patterns: Vec<ImpliedUriPattern>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_element_length: 64,
            max_attribute_name_length: 64,
            max_attribute_value_length: 2048,
            treat_frames_as_embed_links: true,
            ignore_form_action_urls: false,
            extract_only_form_gets: true,
            extract_javascript: true,
            extract_value_attributes: true,
            ignore_unexpected_html: true,
            obey_rel_nofollow: false,
            max_outlinks: 10_000,
            obey_meta_robots: true,
            sniff_window_bytes: 1000,
            default_charset_fallback: "windows-1252".to_string(),
            html_expected_mime_types: vec![
                "text/html".to_string(),
                "application/xhtml".to_string(),
                "text/vnd.wap.wml".to_string(),
                "application/vnd.wap.wml".to_string(),
                "application/vnd.wap.xhtml".to_string(),
            ],
            non_html_extensions: [
                "gif", "jpg", "jpeg", "png", "tif", "bmp", "avi", "mov", "mpg", "mpeg", "mp3",
                "mp4", "swf", "wav", "au", "aiff", "mid",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            extract_srcset: true,
            implied_uri_patterns: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    #[must_use]
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::default()
    }
}

/// Chainable builder over [`ExtractorConfig`]. Every setter is infallible
/// except `build`, which is the only step that can fail (compiling the
/// implied-URI trigger patterns), mirroring the teacher's
/// `compile_glob_pattern` step in `config/builder.rs`.
#[derive(Clone, Debug, Default)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
    pending_implied: Vec<(String, String, bool)>,
}

impl ExtractorConfigBuilder {
    #[must_use]
    pub fn max_outlinks(mut self, n: usize) -> Self {
        self.config.max_outlinks = n;
        self
    }

    #[must_use]
    pub fn treat_frames_as_embed_links(mut self, value: bool) -> Self {
        self.config.treat_frames_as_embed_links = value;
        self
    }

    #[must_use]
    pub fn extract_only_form_gets(mut self, value: bool) -> Self {
        self.config.extract_only_form_gets = value;
        self
    }

    #[must_use]
    pub fn obey_rel_nofollow(mut self, value: bool) -> Self {
        self.config.obey_rel_nofollow = value;
        self
    }

    #[must_use]
    pub fn obey_meta_robots(mut self, value: bool) -> Self {
        self.config.obey_meta_robots = value;
        self
    }

    #[must_use]
    pub fn ignore_unexpected_html(mut self, value: bool) -> Self {
        self.config.ignore_unexpected_html = value;
        self
    }

    #[must_use]
    pub fn extract_srcset(mut self, value: bool) -> Self {
        self.config.extract_srcset = value;
        self
    }

    /// Queue an implied-URI rule; the trigger regex is compiled in
    /// `build()` so a bad pattern is reported once, at config-construction
    /// time, rather than on the first document that happens to trip it.
    #[must_use]
    pub fn with_implied_uri_pattern(
        mut self,
        trigger: impl Into<String>,
        format: impl Into<String>,
        remove_trigger: bool,
    ) -> Self {
        self.pending_implied
            .push((trigger.into(), format.into(), remove_trigger));
        self
    }

    pub fn build(mut self) -> Result<ExtractorConfig, ExtractError> {
        for (trigger, format, remove_trigger) in self.pending_implied {
            let trigger = Regex::new(&trigger)?;
            self.config
                .implied_uri_patterns
                .push(ImpliedUriPattern { trigger, format, remove_trigger });
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let cfg = ExtractorConfig::default();
        assert_eq!(cfg.max_element_length, 64);
        assert_eq!(cfg.max_attribute_value_length, 2048);
        assert!(cfg.treat_frames_as_embed_links);
        assert!(cfg.extract_only_form_gets);
        assert!(!cfg.obey_rel_nofollow);
    }

    #[test]
    fn builder_compiles_implied_patterns() {
        let cfg = ExtractorConfig::builder()
            .with_implied_uri_pattern(r"^http://h/(\d+)$", "http://h/full/$1", false)
            .build()
            .unwrap();
        assert_eq!(cfg.implied_uri_patterns.len(), 1);
    }

    #[test]
    fn builder_rejects_bad_pattern() {
        let err = ExtractorConfig::builder()
            .with_implied_uri_pattern("(unclosed", "x", false)
            .build()
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidRegex(_)));
    }
}
