#![allow(missing_docs)]

use palimpsest::config::Config;
use palimpsest::{bootstrap, StoreError};

#[test]
fn every_page_has_a_unique_index() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let usr_root = store.segments.get_segment("usr").unwrap().root_index.unwrap();

    let first = store
        .auth
        .create_detail_page("a".into(), String::new(), "x".into(), &usr_root)
        .unwrap();
    let second = store
        .auth
        .create_detail_page("b".into(), String::new(), "y".into(), &usr_root)
        .unwrap();
    assert_ne!(first, second);
}

#[test]
fn every_segment_is_a_rooted_tree() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    for segment in store.segments.list_segments() {
        let root = segment.root_index.expect("segment has a root");
        let root_page = store.pages.get_page(&root).unwrap();
        assert!(root_page.header().parent.is_none());
    }
}

#[test]
fn children_and_parent_pointers_stay_consistent_after_move() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let usr_root = store.segments.get_segment("usr").unwrap().root_index.unwrap();

    let folder = store
        .auth
        .create_contents_page("folder".into(), String::new(), &usr_root, Vec::new())
        .unwrap();
    let leaf = store
        .auth
        .create_detail_page("leaf".into(), String::new(), "body".into(), &usr_root)
        .unwrap();

    store.auth.move_page(&leaf, &folder).unwrap();

    let leaf_page = store.auth.get_page(&leaf).unwrap();
    assert_eq!(leaf_page.header().parent.as_ref(), Some(&folder));

    let folder_children = store.auth.get_children(&folder).unwrap();
    assert_eq!(folder_children.len(), 1);
    assert_eq!(folder_children[0].index(), &leaf);

    let root_children = store.auth.get_children(&usr_root).unwrap();
    assert!(!root_children.iter().any(|p| p.index() == &leaf));
}

#[test]
fn move_into_own_descendant_rejected_as_cycle() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let usr_root = store.segments.get_segment("usr").unwrap().root_index.unwrap();

    let parent = store
        .auth
        .create_contents_page("parent".into(), String::new(), &usr_root, Vec::new())
        .unwrap();
    let child = store
        .auth
        .create_contents_page("child".into(), String::new(), &parent, Vec::new())
        .unwrap();

    let err = store.auth.move_page(&parent, &child).unwrap_err();
    assert!(matches!(err, StoreError::InvariantViolation { .. }));
}

#[test]
fn page_index_suffixes_never_reused_within_a_segment() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let usr_root = store.segments.get_segment("usr").unwrap().root_index.unwrap();

    let a = store
        .auth
        .create_detail_page("a".into(), String::new(), "x".into(), &usr_root)
        .unwrap();
    store.auth.remove_page(&a).unwrap();
    let b = store
        .auth
        .create_detail_page("b".into(), String::new(), "y".into(), &usr_root)
        .unwrap();

    assert_ne!(a.suffix(), b.suffix());
    assert!(b.suffix().unwrap() > a.suffix().unwrap());
}

#[test]
fn non_active_pages_render_as_empty() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let usr_root = store.segments.get_segment("usr").unwrap().root_index.unwrap();

    let index = store
        .auth
        .create_detail_page("note".into(), String::new(), "body".into(), &usr_root)
        .unwrap();
    store.auth.expand_details(&index).unwrap();
    store
        .pages
        .set_lifecycle(&index, palimpsest::Lifecycle::ColdArchived)
        .unwrap();

    let messages = palimpsest::render::render(&store.pages, &store.segments);
    let usr_message = messages
        .iter()
        .find(|m| matches!(m.role, palimpsest::render::Role::User))
        .expect("usr segment still renders its own heading");
    assert!(!usr_message.content.contains("note"));
}

#[test]
fn system_root_stays_protected_even_through_authorized_store() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let sys_root = store.segments.get_segment("sys").unwrap().root_index.unwrap();
    assert!(matches!(
        store.auth.hide_details(&sys_root).unwrap_err(),
        StoreError::SystemRootProtected { .. }
    ));
    let page = store.auth.get_page(&sys_root).unwrap();
    assert!(matches!(page.header().visibility, palimpsest::Visibility::Expanded));
}
