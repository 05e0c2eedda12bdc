#![allow(missing_docs)]

use palimpsest::config::Config;
use palimpsest::model::PageIndex;
use palimpsest::render::{estimate_tokens, render};
use palimpsest::turn::{Summarizer, TurnBuffer};
use palimpsest::{bootstrap, StoreError};

struct EchoSummarizer;

impl Summarizer for EchoSummarizer {
    fn summarize(&self, messages: &[String]) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Ok(messages.join("\n"))
    }
}

struct FailingSummarizer;

impl Summarizer for FailingSummarizer {
    fn summarize(&self, _messages: &[String]) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Err("summarizer unavailable".into())
    }
}

#[test]
fn bootstrap_seeds_fixed_segments_with_expanded_roots() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let ids: Vec<String> = store.segments.list_segments().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["sys", "usr", "self", "teach", "topic", "interact"]);

    for segment in store.segments.list_segments() {
        let root = segment.root_index.expect("root seeded");
        let page = store.pages.get_page(&root).unwrap();
        assert!(page.is_contents());
    }
}

#[test]
fn detail_page_defaults_hidden_and_round_trips_visibility() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let usr_root = store.segments.get_segment("usr").unwrap().root_index.unwrap();

    let index = store
        .auth
        .create_detail_page("note".into(), String::new(), "full content".into(), &usr_root)
        .unwrap();

    let page = store.auth.get_page(&index).unwrap();
    assert!(matches!(page.header().visibility, palimpsest::Visibility::Hidden));

    store.auth.expand_details(&index).unwrap();
    let page = store.auth.get_page(&index).unwrap();
    assert!(matches!(page.header().visibility, palimpsest::Visibility::Expanded));

    store.auth.hide_details(&index).unwrap();
    let page = store.auth.get_page(&index).unwrap();
    assert!(matches!(page.header().visibility, palimpsest::Visibility::Hidden));
}

#[test]
fn auto_collapse_reduces_tokens_in_segment_insertion_order() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let usr_root = store.segments.get_segment("usr").unwrap().root_index.unwrap();

    let mut created = Vec::new();
    for i in 0..3 {
        let detail = "x".repeat(300);
        let index = store
            .auth
            .create_detail_page(format!("note-{i}"), String::new(), detail, &usr_root)
            .unwrap();
        store.auth.expand_details(&index).unwrap();
        created.push(index);
    }

    let before = estimate_tokens(&render(&store.pages, &store.segments));
    let report = palimpsest::collapse::auto_collapse(&store.pages, &store.segments, before / 2);

    assert_eq!(report.tokens_before, before);
    assert!(report.tokens_after <= before);
    assert_eq!(report.collapsed.as_slice(), &created[..report.collapsed.len()]);
}

#[test]
fn system_segment_root_cannot_be_hidden() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let sys_root = store.segments.get_segment("sys").unwrap().root_index.unwrap();

    let err = store.auth.hide_details(&sys_root).unwrap_err();
    assert!(matches!(err, StoreError::SystemRootProtected { .. }));
}

#[test]
fn move_across_segments_is_rejected() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let usr_root = store.segments.get_segment("usr").unwrap().root_index.unwrap();
    let topic_root = store.segments.get_segment("topic").unwrap().root_index.unwrap();

    let index = store
        .auth
        .create_detail_page("note".into(), String::new(), "body".into(), &usr_root)
        .unwrap();

    let err = store.auth.move_page(&index, &topic_root).unwrap_err();
    assert!(matches!(err, StoreError::InvariantViolation { .. }));
}

#[test]
fn turn_commit_creates_page_and_clears_buffer_only_on_success() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let interact_root = store.segments.get_segment("interact").unwrap().root_index.unwrap();

    let mut buffer = TurnBuffer::new();
    buffer.push("user: what's the weather?");
    buffer.push("assistant: checking now.");

    let failing = FailingSummarizer;
    let err = buffer
        .commit(&store.auth, &failing, &interact_root, "turn".into(), String::new())
        .unwrap_err();
    assert!(matches!(err, palimpsest::turn::TurnError::Summarizer(_)));
    assert!(!buffer.is_empty());

    let echo = EchoSummarizer;
    let index: PageIndex = buffer
        .commit(&store.auth, &echo, &interact_root, "turn".into(), String::new())
        .unwrap();
    assert!(buffer.is_empty());

    let page = store.auth.get_page(&index).unwrap();
    assert!(!page.is_contents());
}
