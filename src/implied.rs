//! Implied-URI extractor (§4.G): a post-pass over already-emitted outlinks.
//! For each configured `(trigger, format, remove_trigger)` rule, a link
//! whose target matches `trigger` gets a second, rewritten link emitted
//! with hop `Inferred`. New module — grounded in the same
//! pattern-list-over-data shape as `ExtractorConfig::compile_glob_pattern`.

use crate::config::ExtractorConfig;
use crate::due::{DiscoveredLink, Due, Hop};
use crate::uri::Uri;

/// Apply every configured implied-URI rule to `due`'s current outlinks.
/// Per §4.G: the first matching pattern for a given link wins, new links
/// are appended (subject to the outlink cap), and `remove_trigger` rules
/// remove their trigger link after the whole scan (not mid-iteration, so
/// removing one link never skips evaluating the next).
pub fn apply(due: &mut Due, config: &ExtractorConfig) {
    if config.implied_uri_patterns.is_empty() {
        return;
    }

    let mut additions: Vec<DiscoveredLink> = Vec::new();
    let mut removals: Vec<usize> = Vec::new();

    for (index, link) in due.outlinks().iter().enumerate() {
        for pattern in &config.implied_uri_patterns {
            if !pattern.trigger.is_match(link.target.as_str()) {
                continue;
            }
            let rewritten = pattern
                .trigger
                .replace(link.target.as_str(), pattern.format.as_str());
            if let Ok(uri) = Uri::parse(&rewritten) {
                additions.push(DiscoveredLink::new(uri, Hop::Inferred, "inferred-misc"));
            }
            if pattern.remove_trigger {
                removals.push(index);
            }
            break;
        }
    }

    removals.sort_unstable();
    removals.dedup();
    for index in removals.into_iter().rev() {
        due.remove_outlink(index);
    }

    for link in additions {
        due.append_outlink(link, config.max_outlinks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::due::Due;
    use crate::replay::ContentSequence;

    fn due_with_links(links: &[&str]) -> Due {
        let request = Uri::parse("http://h/").unwrap();
        let mut due = Due::new(request, ContentSequence::from_bytes(Vec::new()), "text/html");
        for link in links {
            due.append_outlink(
                DiscoveredLink::new(Uri::parse(link).unwrap(), Hop::NavLink, "a/@href"),
                100,
            );
        }
        due
    }

    #[test]
    fn emits_inferred_link_on_trigger_match() {
        let config = ExtractorConfig::builder()
            .with_implied_uri_pattern(r"^http://h/summary/(\d+)$", "http://h/full/$1", false)
            .build()
            .unwrap();
        let mut due = due_with_links(&["http://h/summary/42"]);
        apply(&mut due, &config);
        assert_eq!(due.outlinks().len(), 2);
        let inferred = due.outlinks().iter().find(|l| l.hop == Hop::Inferred).unwrap();
        assert_eq!(inferred.target.as_str(), "http://h/full/42");
        assert_eq!(inferred.context, "inferred-misc");
    }

    #[test]
    fn remove_trigger_drops_original_link() {
        let config = ExtractorConfig::builder()
            .with_implied_uri_pattern(r"^http://h/summary/(\d+)$", "http://h/full/$1", true)
            .build()
            .unwrap();
        let mut due = due_with_links(&["http://h/summary/42", "http://h/other"]);
        apply(&mut due, &config);
        assert_eq!(due.outlinks().len(), 2);
        assert!(due.outlinks().iter().all(|l| l.target.as_str() != "http://h/summary/42"));
        assert!(due.outlinks().iter().any(|l| l.target.as_str() == "http://h/full/42"));
        assert!(due.outlinks().iter().any(|l| l.target.as_str() == "http://h/other"));
    }

    #[test]
    fn no_patterns_configured_is_a_no_op() {
        let config = ExtractorConfig::default();
        let mut due = due_with_links(&["http://h/x"]);
        apply(&mut due, &config);
        assert_eq!(due.outlinks().len(), 1);
    }

    #[test]
    fn invalid_rewritten_uri_is_dropped_silently() {
        let config = ExtractorConfig::builder()
            .with_implied_uri_pattern(r"^http://h/summary/(\d+)$", "not a uri at all", false)
            .build()
            .unwrap();
        let mut due = due_with_links(&["http://h/summary/42"]);
        apply(&mut due, &config);
        assert_eq!(due.outlinks().len(), 1);
    }
}
