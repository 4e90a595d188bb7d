//! Top-level orchestration (§6): `extract(&mut Due, &ExtractorConfig) ->
//! bool`, composing the charset sniffer, tag scanner, tag-handler, and
//! implied-URI pass. New module — it is the seam where all the others
//! meet, per §2's data-flow diagram.

use crate::charset;
use crate::config::ExtractorConfig;
use crate::due::{Due, NonFatalFailure};
use crate::handler::{self, HandlerSignal, TagHandler};
use crate::implied;
use crate::scan::TagScanner;
use crate::subextract::{RegexSubExtractor, UriSubExtractor};

/// Cooperative cancellation (§5): checked between tag matches. A worker
/// pool embedding this crate supplies its own flag (typically an
/// `AtomicBool` read); the default never trips.
pub trait CancellationFlag {
    fn is_cancelled(&self) -> bool;
}

/// No-op cancellation flag for callers that don't need mid-extraction
/// interruption.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancellationFlag for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Run the extractor over `due` with the default (regex-based) JS/CSS
/// sub-extractors and no cancellation flag. Returns whether extraction
/// completed normally (`true`) or was skipped/aborted (`false`), per §6.
pub fn extract(due: &mut Due, config: &ExtractorConfig) -> bool {
    let js = RegexSubExtractor;
    let css = RegexSubExtractor;
    extract_with(due, config, &NeverCancel, &js, &css)
}

/// Full-control entry point: caller supplies the cancellation flag and the
/// JS/CSS sub-extractor collaborators (§1, `SPEC_FULL.md` `[SUPPLEMENT-2]`).
pub fn extract_with(
    due: &mut Due,
    config: &ExtractorConfig,
    cancel: &dyn CancellationFlag,
    js: &dyn UriSubExtractor,
    css: &dyn UriSubExtractor,
) -> bool {
    match handler::should_extract(due, config) {
        Ok(false) => return true,
        Ok(true) => {}
        Err(e) => {
            tracing::warn!(error = %e, "read error deciding whether to extract; stopping");
            due.add_non_fatal_failure(NonFatalFailure::ReadError { detail: e.to_string() });
            return false;
        }
    }

    if let Err(e) = sniff_and_adopt_charset(due, config) {
        due.add_non_fatal_failure(NonFatalFailure::DecodeAnomaly { detail: e.to_string() });
    }

    let text = match due.content_sequence() {
        Ok(text) => text.into_owned(),
        Err(e) => {
            tracing::warn!(error = %e, "read error on content replay; stopping");
            due.add_non_fatal_failure(NonFatalFailure::ReadError { detail: e.to_string() });
            return false;
        }
    };

    let scanner = match TagScanner::new(config) {
        Ok(scanner) => scanner,
        Err(e) => {
            tracing::warn!(error = %e, "failed to compile tag scanner; stopping");
            due.add_non_fatal_failure(NonFatalFailure::ReadError { detail: e.to_string() });
            return false;
        }
    };

    let tag_handler = TagHandler::new(config, js, css);
    let mut aborted = false;
    let mut cancelled = false;
    let scan_result = scanner.scan(&text, |token| {
        if cancel.is_cancelled() {
            cancelled = true;
            tracing::warn!("extraction interrupted by worker cancellation");
            return false;
        }
        match tag_handler.handle(due, token) {
            Ok(HandlerSignal::Continue) => true,
            Ok(HandlerSignal::Abort) => {
                aborted = true;
                false
            }
            Err(e) => {
                due.add_non_fatal_failure(NonFatalFailure::DecodeAnomaly { detail: e.to_string() });
                true
            }
        }
    });

    if scan_result.is_err() {
        return false;
    }
    if aborted || cancelled {
        return false;
    }

    implied::apply(due, config);
    true
}

/// §4.B: sniff a charset from the first `sniff_window_bytes` characters
/// and, if it differs from the current decoding, apply the reflexive check
/// before adopting it.
fn sniff_and_adopt_charset(due: &mut Due, config: &ExtractorConfig) -> anyhow::Result<()> {
    let original = due.content_charset().to_string();
    let prefix = due.content_prefix(config.sniff_window_bytes)?;
    let sniff = charset::sniff(&prefix);
    for annotation in &sniff.annotations {
        due.add_annotation(annotation.clone());
    }

    let candidate = match sniff.charset {
        Some(c) if c == "none" => config.default_charset_fallback.clone(),
        Some(c) => c,
        None => return Ok(()),
    };

    if candidate.eq_ignore_ascii_case(&original) {
        return Ok(());
    }

    due.set_content_charset(candidate.clone());
    let re_sniffed_prefix = due.content_prefix(config.sniff_window_bytes)?;
    let (adopted, annotation) = charset::reflexive_check(&candidate, &re_sniffed_prefix);
    due.add_annotation(annotation);
    if !adopted {
        due.set_content_charset(original);
    }
    Ok(())
}
