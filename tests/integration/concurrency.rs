#![allow(missing_docs)]

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use palimpsest::config::Config;
use palimpsest::{bootstrap, AuthorizedStore};

#[test]
fn concurrent_create_detail_page_never_collides() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let usr_root = store.segments.get_segment("usr").unwrap().root_index.unwrap();
    let auth: Arc<AuthorizedStore> = store.auth.clone();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let auth = auth.clone();
            let root = usr_root.clone();
            thread::spawn(move || {
                auth.create_detail_page(format!("w{i}"), String::new(), "body".into(), &root)
                    .unwrap()
            })
        })
        .collect();

    let indices: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let unique: HashSet<_> = indices.iter().collect();
    assert_eq!(unique.len(), indices.len());

    let children = auth.get_children(&usr_root).unwrap();
    assert_eq!(children.len(), indices.len());
}

#[test]
fn concurrent_reads_during_writes_never_panic() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let usr_root = store.segments.get_segment("usr").unwrap().root_index.unwrap();
    let auth: Arc<AuthorizedStore> = store.auth.clone();

    let writer_root = usr_root.clone();
    let writer_auth = auth.clone();
    let writer = thread::spawn(move || {
        for i in 0..50 {
            writer_auth
                .create_detail_page(format!("r{i}"), String::new(), "body".into(), &writer_root)
                .unwrap();
        }
    });

    let reader_root = usr_root.clone();
    let reader_auth = auth.clone();
    let reader = thread::spawn(move || {
        for _ in 0..50 {
            let _ = reader_auth.get_children(&reader_root);
            let _ = reader_auth.find_page("r");
        }
    });

    writer.join().unwrap();
    reader.join().unwrap();

    let children = auth.get_children(&usr_root).unwrap();
    assert_eq!(children.len(), 50);
}

#[test]
fn concurrent_hide_and_expand_on_the_same_page_stays_in_one_state() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let usr_root = store.segments.get_segment("usr").unwrap().root_index.unwrap();
    let auth: Arc<AuthorizedStore> = store.auth.clone();

    let index = auth
        .create_detail_page("flip".into(), String::new(), "body".into(), &usr_root)
        .unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let auth = auth.clone();
            let index = index.clone();
            thread::spawn(move || {
                if i % 2 == 0 {
                    auth.expand_details(&index).unwrap();
                } else {
                    auth.hide_details(&index).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let page = auth.get_page(&index).unwrap();
    assert!(matches!(
        page.header().visibility,
        palimpsest::Visibility::Expanded | palimpsest::Visibility::Hidden
    ));
}
