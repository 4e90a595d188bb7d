//! Bounded-time assertions against pathological script/style input (§9
//! Design Notes: the scanner "must be non-greedy and bounded to avoid
//! catastrophic backtracking"). Carried forward in spirit from the
//! teacher's own `test_redos_resistance.rs`, retargeted at the tag
//! scanner's actual regex rather than markdown-conversion cleanup.

use std::time::Instant;

use html_link_extractor::config::ExtractorConfig;
use html_link_extractor::scan::TagScanner;

fn assert_bounded(label: &str, html: &str) {
    let scanner = TagScanner::new(&ExtractorConfig::default()).unwrap();
    let start = Instant::now();
    let mut count = 0usize;
    scanner
        .scan(html, |_| {
            count += 1;
            true
        })
        .unwrap();
    let elapsed = start.elapsed();
    println!("{label}: {elapsed:?} ({count} matches)");
    assert!(
        elapsed.as_millis() < 500,
        "potential ReDoS in {label}: took {elapsed:?}"
    );
}

#[test]
fn unterminated_script_block_is_bounded() {
    let html = format!("<script>{}", "a".repeat(50_000));
    assert_bounded("unterminated_script", &html);
}

#[test]
fn unterminated_style_block_is_bounded() {
    let html = format!("<style>{}", ".x{{}}".repeat(10_000));
    assert_bounded("unterminated_style", &html);
}

#[test]
fn many_repeated_equals_and_quotes_in_attribute_is_bounded() {
    let html = format!(r#"<a href="{}">"#, "=\"'".repeat(10_000));
    assert_bounded("pathological_attribute_quoting", &html);
}

#[test]
fn deeply_nested_angle_brackets_is_bounded() {
    let html = "<".repeat(20_000);
    assert_bounded("deeply_nested_angle_brackets", &html);
}

#[test]
fn long_run_of_open_tags_is_bounded() {
    let html: String = (0..5_000).map(|i| format!(r#"<a href="/p{i}">"#)).collect();
    assert_bounded("long_run_of_open_tags", &html);
}
