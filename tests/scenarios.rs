//! End-to-end scenario tests (§8 "Scenarios (literal)", S1-S6), exercised
//! through the public `extract()` entry point rather than any internal
//! module. Flat top-level `tests/*.rs` layout, matching the teacher's
//! `link_rewriter_test.rs` convention.

use html_link_extractor::{extract, ContentSequence, Due, ExtractorConfig, Hop, Uri};

fn due_for(html: &str, request_uri: &str) -> Due {
    let uri = Uri::parse(request_uri).expect("valid request uri");
    Due::new(uri, ContentSequence::from_bytes(html.as_bytes().to_vec()), "text/html")
}

#[test]
fn s1_anchor_resolves_against_request_uri() {
    let mut due = due_for(r#"<a href="/x">hi</a>"#, "http://h/p/q");
    let config = ExtractorConfig::default();
    assert!(extract(&mut due, &config));

    assert_eq!(due.outlinks().len(), 1);
    let link = &due.outlinks()[0];
    assert_eq!(link.target.as_str(), "http://h/x");
    assert_eq!(link.hop, Hop::NavLink);
    assert_eq!(link.context, "a/@href");
}

#[test]
fn s2_base_tag_changes_resolution_base_once() {
    let mut due = due_for(
        r#"<base href="http://b/"><img src="a.png"><base href="http://c/">"#,
        "http://h/p/q",
    );
    let config = ExtractorConfig::default();
    assert!(extract(&mut due, &config));

    assert_eq!(due.outlinks().len(), 1);
    let link = &due.outlinks()[0];
    assert_eq!(link.target.as_str(), "http://b/a.png");
    assert_eq!(link.hop, Hop::Embed);
    assert_eq!(link.context, "img/@src");
    assert_eq!(due.base_uri().as_str(), "http://b/");
}

#[test]
fn s3_meta_robots_nofollow_aborts_extraction() {
    let mut due = due_for(r#"<meta name="robots" content="NoFollow">"#, "http://h/");
    let config = ExtractorConfig::default();

    let completed = extract(&mut due, &config);

    assert!(!completed, "meta-robots nofollow should abort extraction");
    assert!(due.outlinks().is_empty());
}

#[test]
fn s4_srcset_emits_each_candidate_in_order() {
    let mut due = due_for(r#"<img srcset="a.png 1x, b.png 2x">"#, "http://h/");
    let config = ExtractorConfig::default();
    assert!(extract(&mut due, &config));

    let targets: Vec<&str> = due.outlinks().iter().map(|l| l.target.as_str()).collect();
    assert_eq!(targets, vec!["http://h/a.png", "http://h/b.png"]);
    assert!(due.outlinks().iter().all(|l| l.hop == Hop::Embed));
}

#[test]
fn s5_link_rel_keyword_priority() {
    let mut due = due_for(r#"<link rel="stylesheet icon" href="s.css">"#, "http://h/");
    let config = ExtractorConfig::default();
    assert!(extract(&mut due, &config));

    assert_eq!(due.outlinks().len(), 1);
    let link = &due.outlinks()[0];
    assert_eq!(link.target.as_str(), "http://h/s.css");
    assert_eq!(link.hop, Hop::Embed);
    assert_eq!(link.context, "link[rel='stylesheet']/@href");
}

#[test]
fn s6_form_action_gates_on_method_and_config() {
    let html = r#"<form action="/go" method="POST"></form>"#;

    let mut due_strict = due_for(html, "http://h/");
    let strict = ExtractorConfig::default();
    assert!(extract(&mut due_strict, &strict));
    assert!(due_strict.outlinks().is_empty());

    let mut due_relaxed = due_for(html, "http://h/");
    let relaxed = ExtractorConfig::builder().extract_only_form_gets(false).build().unwrap();
    assert!(extract(&mut due_relaxed, &relaxed));
    assert_eq!(due_relaxed.outlinks().len(), 1);
    assert_eq!(due_relaxed.outlinks()[0].target.as_str(), "http://h/go");
    assert_eq!(due_relaxed.outlinks()[0].hop, Hop::NavLink);
}

#[test]
fn universal_property_outlink_cap_is_enforced() {
    let html = (0..50)
        .map(|i| format!(r#"<a href="/p{i}">x</a>"#))
        .collect::<String>();
    let mut due = due_for(&html, "http://h/");
    let config = ExtractorConfig::builder().max_outlinks(10).build().unwrap();
    assert!(extract(&mut due, &config));
    assert!(due.outlinks().len() <= 10);
}

#[test]
fn universal_property_every_target_is_absolute() {
    let html = r#"<a href="/rel"><img src="rel.png"><link rel="icon" href="//cdn.example.com/favicon.ico">"#;
    let mut due = due_for(html, "http://h/p/");
    let config = ExtractorConfig::default();
    assert!(extract(&mut due, &config));
    for link in due.outlinks() {
        let parsed = url::Url::parse(link.target.as_str());
        assert!(parsed.is_ok(), "target {} is not an absolute URI", link.target);
    }
}

#[test]
fn universal_property_determinism_across_runs() {
    let html = r#"<a href="/1">x</a><img src="/2.png"><form action="/go"></form>"#;
    let config = ExtractorConfig::default();

    let mut first = due_for(html, "http://h/");
    extract(&mut first, &config);

    let mut second = due_for(html, "http://h/");
    extract(&mut second, &config);

    assert_eq!(first.outlinks(), second.outlinks());
}
