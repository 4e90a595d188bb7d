//! Tag-handler (§4.F): the semantic core. Dispatches on the `TagMatch`
//! variants the scanner produces, drives the attribute scanner and URI
//! model for each attribute bucket (§4.E), and emits `DiscoveredLink`s onto
//! the DUE. New module — the bucket-dispatch logic has no direct teacher
//! analogue, but the "buffer attributes, then resolve at end-of-tag" shape
//! mirrors `link_rewriter::LinkRewriter`'s buffer-then-rewrite structure.

use std::sync::LazyLock;

use regex::Regex;
use url::form_urlencoded;

use crate::config::ExtractorConfig;
use crate::due::{DataValue, DiscoveredLink, Due, Hop, NonFatalFailure};
use crate::error::ExtractError;
use crate::scan::{scan_attributes, AttrMatch, TagMatch};
use crate::subextract::UriSubExtractor;
use crate::uri::Uri;

static JAVASCRIPT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^javascript:").expect("static pattern"));

static NOFOLLOW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnofollow\b").expect("static pattern"));

static DATA_LAZY_VARIANT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^data-(src|src-small|src-medium|srcset|original|original-set|lazy|lazy-srcset|full-src)$")
        .expect("static pattern")
});

/// What the caller should do after a handler call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerSignal {
    /// Keep scanning.
    Continue,
    /// `meta name="robots"` matched an obeyed nofollow directive (§4.F.4,
    /// §7) — stop scanning; the caller treats this as a successful,
    /// early-terminated extraction, not an error.
    Abort,
}

/// Bucket classification for an attribute name (§4.E). Ordering of the
/// match arms below encodes bucket priority — a name matches the first
/// bucket it falls into.
enum AttrBucket {
    HrefCite,
    Action,
    OnStar,
    SrcLike,
    Codebase,
    ClassidData,
    Archive,
    Code,
    Value,
    Style,
    Method,
    Other,
}

fn classify(name_lower: &str) -> AttrBucket {
    match name_lower {
        "href" | "cite" => AttrBucket::HrefCite,
        "action" => AttrBucket::Action,
        _ if name_lower.starts_with("on") => AttrBucket::OnStar,
        "src" | "srcset" | "lowsrc" | "background" | "longdesc" | "usemap" | "profile"
        | "datasrc" | "data-src" | "data-srcset" | "data-original" | "data-original-set" => {
            AttrBucket::SrcLike
        }
        "codebase" => AttrBucket::Codebase,
        "classid" | "data" => AttrBucket::ClassidData,
        "archive" => AttrBucket::Archive,
        "code" => AttrBucket::Code,
        "value" => AttrBucket::Value,
        "style" => AttrBucket::Style,
        "method" => AttrBucket::Method,
        _ => AttrBucket::Other,
    }
}

fn is_srcset_attr(name_lower: &str) -> bool {
    matches!(
        name_lower,
        "srcset" | "data-srcset" | "data-original-set" | "data-lazy-srcset"
    )
}

/// §4.F.7: decide whether extraction should run at all for this document.
pub fn should_extract(due: &Due, config: &ExtractorConfig) -> anyhow::Result<bool> {
    if !config.ignore_unexpected_html {
        return Ok(true);
    }

    let path = due.request_uri().path().to_ascii_lowercase();
    if let Some((_, ext)) = path.rsplit_once('.') {
        if config.non_html_extensions.iter().any(|e| e == ext) {
            return Ok(false);
        }
    }

    let content_type = due.content_type().to_ascii_lowercase();
    if config
        .html_expected_mime_types
        .iter()
        .any(|prefix| content_type.starts_with(prefix.as_str()))
    {
        return Ok(true);
    }

    let prefix = due.content_prefix(1000)?.to_ascii_lowercase();
    Ok(prefix.contains("<html") || prefix.contains("<!doctype html"))
}

/// §4.F.6: parse a `srcset`-family value into its candidate URLs, ignoring
/// descriptors. Splits on commas not nested inside `(...)`; malformed tails
/// (empty candidates) are skipped, not errored.
#[must_use]
pub fn parse_srcset(value: &str) -> Vec<String> {
    let mut depth = 0i32;
    let mut start = 0usize;
    let mut candidates = Vec::new();
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = (depth - 1).max(0),
            ',' if depth == 0 => {
                candidates.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    candidates.push(&value[start..]);

    candidates
        .into_iter()
        .filter_map(|candidate| candidate.trim().split_whitespace().next())
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

fn attr_body<'a>(open_tag: &'a str, element_name: &str) -> &'a str {
    let without_bracket = open_tag.strip_prefix('<').unwrap_or(open_tag);
    let after_name = without_bracket
        .get(element_name.len()..)
        .unwrap_or(without_bracket);
    after_name
        .strip_suffix("/>")
        .or_else(|| after_name.strip_suffix('>'))
        .unwrap_or(after_name)
}

/// Per-tag semantic processing (§4.F). Holds only the two injected
/// sub-extractor collaborators (§1's "replaceable capabilities"); all other
/// state lives on the `Due` it's given or is local to a single call.
pub struct TagHandler<'a> {
    config: &'a ExtractorConfig,
    js: &'a dyn UriSubExtractor,
    css: &'a dyn UriSubExtractor,
}

impl<'a> TagHandler<'a> {
    #[must_use]
    pub fn new(config: &'a ExtractorConfig, js: &'a dyn UriSubExtractor, css: &'a dyn UriSubExtractor) -> Self {
        Self { config, js, css }
    }

    pub fn handle(&self, due: &mut Due, token: TagMatch<'_>) -> anyhow::Result<HandlerSignal> {
        match token {
            TagMatch::Tag { name, open_tag, offset } => {
                self.handle_tag_open(due, name, open_tag, offset)?;
                Ok(HandlerSignal::Continue)
            }
            TagMatch::Script { open_tag, body, offset } => {
                self.handle_tag_open(due, "script", open_tag, offset)?;
                if self.config.extract_javascript {
                    let base = due.base_uri().clone();
                    dispatch_sub_extraction(due, self.config, &base, body, self.js, "script");
                }
                Ok(HandlerSignal::Continue)
            }
            TagMatch::Style { open_tag, body, offset } => {
                self.handle_tag_open(due, "style", open_tag, offset)?;
                let base = due.base_uri().clone();
                dispatch_sub_extraction(due, self.config, &base, body, self.css, "style");
                Ok(HandlerSignal::Continue)
            }
            TagMatch::Meta { open_tag, .. } => self.handle_meta(due, open_tag),
            TagMatch::Comment { .. } => Ok(HandlerSignal::Continue),
        }
    }

    fn handle_tag_open(
        &self,
        due: &mut Due,
        element_name: &str,
        open_tag: &str,
        offset: usize,
    ) -> anyhow::Result<()> {
        let element_lower = element_name.to_ascii_lowercase();
        if element_lower == "form" {
            due.data_map_push_list("form-offsets", offset.to_string());
        }

        let body = attr_body(open_tag, element_name);
        let attrs = scan_attributes(body, self.config)?;

        let data_remote_true = attrs.iter().any(|a| {
            a.name.eq_ignore_ascii_case("data-remote") && a.value.eq_ignore_ascii_case("true")
        });

        let base = due.base_uri().clone();
        let mut codebase: Option<Uri> = None;
        let mut resources: Vec<String> = Vec::new();
        let mut action: Option<String> = None;
        let mut action_context: Option<String> = None;
        let mut method: Option<String> = None;
        let mut value_val: Option<String> = None;
        let mut value_context: Option<String> = None;
        let mut name_val: Option<String> = None;
        let mut link_href: Option<String> = None;
        let mut link_rel: Option<String> = None;
        let mut link_context: Option<String> = None;

        for AttrMatch { name, value } in attrs {
            let name_lower = name.to_ascii_lowercase();
            match classify(&name_lower) {
                AttrBucket::HrefCite => {
                    if element_lower == "base" {
                        if !due.data_map_contains("html-base") {
                            if let Some(uri) = resolve_or_record(due, &base, &value) {
                                due.data_map_put(
                                    "html-base",
                                    DataValue::Single(uri.as_str().to_string()),
                                );
                                due.set_base_uri(uri);
                            }
                        }
                    } else if element_lower == "a" && data_remote_true {
                        let ctx = "a[data-remote='true']/@href".to_string();
                        if let Some(uri) =
                            resolve_href_like(due, self.config, &base, &value, self.js, &ctx)
                        {
                            emit(due, self.config, uri, Hop::Embed, ctx);
                        }
                    } else if element_lower == "a" || element_lower == "link" {
                        link_href = Some(value);
                        link_context = Some(format!("{element_lower}/@{name_lower}"));
                    } else {
                        let ctx = format!("{element_lower}/@{name_lower}");
                        if let Some(uri) =
                            resolve_href_like(due, self.config, &base, &value, self.js, &ctx)
                        {
                            emit(due, self.config, uri, Hop::NavLink, ctx);
                        }
                    }
                }
                AttrBucket::Action => {
                    if !self.config.ignore_form_action_urls {
                        action = Some(value);
                        action_context = Some(format!("{element_lower}/@action"));
                    }
                }
                AttrBucket::OnStar => {
                    if self.config.extract_javascript {
                        let ctx = format!("{element_lower}/@{name_lower}");
                        dispatch_sub_extraction(due, self.config, &base, &value, self.js, &ctx);
                    }
                }
                AttrBucket::SrcLike => {
                    if !value.starts_with("data:") {
                        let hop = embed_or_navlink(self.config, &element_lower);
                        let ctx = format!("{element_lower}/@{name_lower}");
                        emit_src_like(due, self.config, &base, &value, &name_lower, hop, &ctx, self.js);
                    }
                }
                AttrBucket::Codebase => {
                    if let Some(uri) = resolve_or_record(due, &base, &value) {
                        let ctx = format!("{element_lower}/@codebase");
                        emit(due, self.config, uri.clone(), Hop::NavLink, ctx);
                        codebase = Some(uri);
                    }
                }
                AttrBucket::ClassidData => resources.push(value),
                AttrBucket::Archive => {
                    resources.extend(value.split_ascii_whitespace().map(str::to_string));
                }
                AttrBucket::Code => {
                    let mut v = value;
                    if element_lower == "applet" && !v.to_ascii_lowercase().ends_with(".class") {
                        v.push_str(".class");
                    }
                    resources.push(v);
                }
                AttrBucket::Value => {
                    value_val = Some(value);
                    value_context = Some(format!("{element_lower}/@value"));
                }
                AttrBucket::Style => {
                    let ctx = format!("{element_lower}/@style");
                    dispatch_sub_extraction(due, self.config, &base, &value, self.css, &ctx);
                }
                AttrBucket::Method => method = Some(value.to_ascii_uppercase()),
                AttrBucket::Other => match name_lower.as_str() {
                    "name" => name_val = Some(value),
                    "flashvars" => handle_flashvars(due, self.config, &base, &value),
                    "rel" => link_rel = Some(value),
                    _ if DATA_LAZY_VARIANT.is_match(&name_lower) => {
                        let hop = embed_or_navlink(self.config, &element_lower);
                        let ctx = format!("{element_lower}/@{name_lower}");
                        emit_src_like(due, self.config, &base, &value, &name_lower, hop, &ctx, self.js);
                    }
                    _ => {}
                },
            }
        }

        if !resources.is_empty() {
            let resource_base = codebase.unwrap_or_else(|| base.clone());
            for raw in &resources {
                if let Some(uri) = resolve_or_record(due, &resource_base, raw) {
                    emit(due, self.config, uri, Hop::Embed, element_lower.clone());
                }
            }
        }

        if let Some(href) = link_href {
            let ctx = link_context.unwrap_or_else(|| format!("{element_lower}/@href"));
            self.finalize_link_href(due, &element_lower, &href, link_rel.as_deref(), &ctx, &base);
        }

        if let Some(action_val) = action {
            let ctx = action_context.unwrap_or_else(|| "form/@action".to_string());
            let is_get = method.as_deref().map(|m| m == "GET").unwrap_or(true);
            if is_get || !self.config.extract_only_form_gets {
                if let Some(uri) =
                    resolve_href_like(due, self.config, &base, &action_val, self.js, &ctx)
                {
                    emit(due, self.config, uri, Hop::NavLink, ctx);
                }
            }
        }

        if let Some(val) = value_val {
            let is_flashvars_param = element_lower == "param"
                && name_val
                    .as_deref()
                    .is_some_and(|n| n.eq_ignore_ascii_case("flashvars"));
            if is_flashvars_param {
                handle_flashvars(due, self.config, &base, &val);
            } else if self.config.extract_value_attributes {
                let ctx = value_context.unwrap_or_else(|| format!("{element_lower}/@value"));
                consider_if_likely_uri(due, self.config, &base, &val, Hop::NavLink, &ctx);
            }
        }

        Ok(())
    }

    /// §4.F.1: the LINK rel-type table, plus the shared nofollow/default
    /// path used for both `link` and `a` elements.
    fn finalize_link_href(
        &self,
        due: &mut Due,
        element_lower: &str,
        href: &str,
        link_rel: Option<&str>,
        context: &str,
        base: &Uri,
    ) {
        if element_lower == "link" {
            if let Some(rel) = link_rel {
                self.apply_link_rel_table(due, href, rel, base);
                return;
            }
        }

        if let Some(rel) = link_rel {
            if self.config.obey_rel_nofollow && NOFOLLOW.is_match(rel) {
                return;
            }
        }

        if let Some(uri) = resolve_href_like(due, self.config, base, href, self.js, context) {
            emit(due, self.config, uri, Hop::NavLink, context.to_string());
        }
    }

    fn apply_link_rel_table(&self, due: &mut Due, href: &str, rel: &str, base: &Uri) {
        let mut mark_navlink = false;
        for keyword in rel.split_ascii_whitespace().map(str::to_ascii_lowercase) {
            match keyword.as_str() {
                "icon" | "stylesheet" | "modulepreload" | "prefetch" | "prerender" => {
                    let ctx = format!("link[rel='{keyword}']/@href");
                    if let Some(uri) =
                        resolve_href_like(due, self.config, base, href, self.js, &ctx)
                    {
                        emit(due, self.config, uri, Hop::Embed, ctx);
                    }
                    return;
                }
                "pingback" => return,
                "dns-prefetch" | "preconnect" | "" => continue,
                _ => mark_navlink = true,
            }
        }
        if mark_navlink {
            if let Some(uri) =
                resolve_href_like(due, self.config, base, href, self.js, "link/@href")
            {
                emit(due, self.config, uri, Hop::NavLink, "link/@href");
            }
        }
    }

    /// §4.F.4: meta tag handling — robots directives, refresh redirects,
    /// and speculative fallback.
    fn handle_meta(&self, due: &mut Due, open_tag: &str) -> anyhow::Result<HandlerSignal> {
        let body = attr_body(open_tag, "meta");
        let attrs = scan_attributes(body, self.config)?;

        let mut name = None;
        let mut http_equiv = None;
        let mut content = None;
        for AttrMatch { name: attr_name, value } in attrs {
            match attr_name.to_ascii_lowercase().as_str() {
                "name" => name = Some(value),
                "http-equiv" => http_equiv = Some(value),
                "content" => content = Some(value),
                _ => {}
            }
        }

        let base = due.base_uri().clone();

        if let (Some(name), Some(content)) = (&name, &content) {
            if name.eq_ignore_ascii_case("robots") {
                due.data_map_put("meta-robots", DataValue::Single(content.clone()));
                if self.config.obey_meta_robots {
                    let lower = content.to_ascii_lowercase();
                    if lower.contains("nofollow") || lower.contains("none") {
                        tracing::warn!(request = %due.request_uri(), "aborting extraction: meta robots nofollow");
                        return Ok(HandlerSignal::Abort);
                    }
                }
                return Ok(HandlerSignal::Continue);
            }
        }

        if let (Some(http_equiv), Some(content)) = (&http_equiv, &content) {
            if http_equiv.eq_ignore_ascii_case("refresh") {
                if let Some(target) = parse_refresh_content(content) {
                    if let Some(uri) = resolve_or_record(due, &base, &target) {
                        emit(due, self.config, uri, Hop::Refer, "meta");
                    }
                }
                return Ok(HandlerSignal::Continue);
            }
        }

        if let Some(content) = &content {
            consider_if_likely_uri(due, self.config, &base, content, Hop::Speculative, "meta");
        }

        Ok(HandlerSignal::Continue)
    }
}

fn parse_refresh_content(content: &str) -> Option<String> {
    let eq = content.find('=')?;
    let raw = content[eq + 1..].trim();
    let trimmed = raw.trim_matches(|c| c == '"' || c == '\'');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn embed_or_navlink(config: &ExtractorConfig, element_lower: &str) -> Hop {
    if (element_lower == "frame" || element_lower == "iframe") && !config.treat_frames_as_embed_links {
        Hop::NavLink
    } else {
        Hop::Embed
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_src_like(
    due: &mut Due,
    config: &ExtractorConfig,
    base: &Uri,
    value: &str,
    name_lower: &str,
    hop: Hop,
    context: &str,
    js: &dyn UriSubExtractor,
) {
    if is_srcset_attr(name_lower) {
        if config.extract_srcset {
            for url in parse_srcset(value) {
                if let Some(uri) = resolve_href_like(due, config, base, &url, js, context) {
                    emit(due, config, uri, hop, context.to_string());
                }
            }
        }
        // `extract_srcset` disabled: the attribute is recognized but left
        // unparsed rather than resolved as a single malformed URI.
    } else if let Some(uri) = resolve_href_like(due, config, base, value, js, context) {
        emit(due, config, uri, hop, context.to_string());
    }
}

fn emit(due: &mut Due, config: &ExtractorConfig, target: Uri, hop: Hop, context: impl Into<String>) {
    due.append_outlink(DiscoveredLink::new(target, hop, context), config.max_outlinks);
}

fn resolve_or_record(due: &mut Due, base: &Uri, raw: &str) -> Option<Uri> {
    match Uri::resolve(base, raw) {
        Ok(uri) => Some(uri),
        Err(ExtractError::BadUri(detail)) => {
            due.add_non_fatal_failure(NonFatalFailure::BadUri { context: raw.to_string(), detail });
            None
        }
        Err(_) => None,
    }
}

/// §4.F.2: strip a leading `javascript:` scheme and hand the remainder to
/// the script sub-extractor instead of resolving it as a URI.
fn resolve_href_like(
    due: &mut Due,
    config: &ExtractorConfig,
    base: &Uri,
    raw: &str,
    js: &dyn UriSubExtractor,
    context: &str,
) -> Option<Uri> {
    if let Some(m) = JAVASCRIPT_PREFIX.find(raw) {
        if config.extract_javascript {
            let code = &raw[m.end()..];
            dispatch_sub_extraction(due, config, base, code, js, context);
        }
        return None;
    }
    resolve_or_record(due, base, raw)
}

fn dispatch_sub_extraction(
    due: &mut Due,
    config: &ExtractorConfig,
    base: &Uri,
    text: &str,
    sub: &dyn UriSubExtractor,
    context: &str,
) {
    for implied in sub.extract_uris(text) {
        if let Some(uri) = resolve_or_record(due, base, &implied.uri) {
            emit(due, config, uri, Hop::Speculative, context.to_string());
        }
    }
}

fn consider_if_likely_uri(
    due: &mut Due,
    config: &ExtractorConfig,
    base: &Uri,
    value: &str,
    hop: Hop,
    context: &str,
) {
    if crate::heuristics::looks_like_uri(value) {
        if let Some(uri) = resolve_or_record(due, base, value) {
            emit(due, config, uri, hop, context.to_string());
        }
    }
}

/// §4.F bucket 12 `flashvars`: query-string-like `key=value` pairs,
/// URL-decoded, each value considered as a speculative URI.
fn handle_flashvars(due: &mut Due, config: &ExtractorConfig, base: &Uri, value: &str) {
    for (_, decoded_value) in form_urlencoded::parse(value.as_bytes()) {
        consider_if_likely_uri(due, config, base, &decoded_value, Hop::Speculative, "param/@flashvars");
    }
}
