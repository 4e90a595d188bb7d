//! Replaceable JS/CSS sub-extractor seam (`SPEC_FULL.md` `[SUPPLEMENT-2]`).
//!
//! §1 treats the JavaScript and CSS extractors as "replaceable capabilities
//! the core invokes"; §2's Non-goals explicitly scope full JS/CSS semantic
//! extraction out. This module defines the seam as a trait so the
//! tag-handler's bucket-10 (`style`) and inline-script/style handling
//! (§4.F.3) have something concrete to call without pulling in a JS AST
//! parser or CSS tokenizer. Grounded in `link_rewriter::LinkRewriter`'s
//! injectable-policy shape: the rewriting behavior is supplied as data
//! (a trait object), not hardcoded into the tag handler.

use std::sync::LazyLock;

use regex::Regex;

/// One URI-like string recovered from inline script/style/handler text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpliedUri {
    pub uri: String,
}

/// A collaborator that pulls candidate URIs out of arbitrary script/CSS
/// text. The core never evaluates or parses the text as a language; it
/// only asks the sub-extractor for whatever it can find.
pub trait UriSubExtractor: Send + Sync {
    fn extract_uris(&self, text: &str) -> Vec<ImpliedUri>;
}

static QUOTED_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"\\]{1,2048})"|'([^'\\]{1,2048})'"#).expect("static pattern"));

/// Default sub-extractor: scans quoted string literals (the overwhelming
/// majority of URIs embedded in real-world inline script and CSS) and
/// keeps the ones that pass [`crate::heuristics::looks_like_uri`]. No JS
/// AST or CSS tokenizer is built — this is exactly the "extract
/// references" layer the teacher's own CSS/JS handling amounts to once the
/// out-of-scope rendering/download machinery is stripped away.
#[derive(Debug, Clone, Default)]
pub struct RegexSubExtractor;

impl UriSubExtractor for RegexSubExtractor {
    fn extract_uris(&self, text: &str) -> Vec<ImpliedUri> {
        QUOTED_TOKEN
            .captures_iter(text)
            .filter_map(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str())
            .filter(|candidate| crate::heuristics::looks_like_uri(candidate))
            .map(|candidate| ImpliedUri { uri: candidate.to_string() })
            .collect()
    }
}
