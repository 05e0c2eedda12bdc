#![allow(missing_docs)]

use palimpsest::config::{Backend, Config};
use palimpsest::{bootstrap, Visibility};
use tempfile::TempDir;

fn file_config(dir: &TempDir, compress: bool) -> Config {
    let mut config = Config::ephemeral();
    config.backend = Backend::File {
        dir: dir.path().to_path_buf(),
        compress,
    };
    config
}

#[test]
fn segments_and_pages_survive_a_reopen() {
    let dir = TempDir::new().unwrap();

    let first = bootstrap::open(&file_config(&dir, false)).unwrap();
    let usr_root = first.segments.get_segment("usr").unwrap().root_index.unwrap();
    let index = first
        .auth
        .create_detail_page("note".into(), "summary".into(), "full body".into(), &usr_root)
        .unwrap();
    first.auth.expand_details(&index).unwrap();
    first.save_segments().unwrap();
    drop(first);

    let second = bootstrap::open(&file_config(&dir, false)).unwrap();
    let ids: Vec<String> = second.segments.list_segments().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["sys", "usr", "self", "teach", "topic", "interact"]);

    let page = second.auth.get_page(&index).unwrap();
    assert_eq!(page.header().name, "note");
    assert_eq!(page.header().description, "summary");
    assert!(matches!(page.header().visibility, Visibility::Expanded));

    let children = second.auth.get_children(&usr_root).unwrap();
    assert_eq!(children.len(), 1);
}

#[test]
fn gzip_backend_round_trips_identically_to_plain() {
    let dir = TempDir::new().unwrap();

    let first = bootstrap::open(&file_config(&dir, true)).unwrap();
    let usr_root = first.segments.get_segment("usr").unwrap().root_index.unwrap();
    let index = first
        .auth
        .create_detail_page("compressed".into(), String::new(), "x".repeat(4096), &usr_root)
        .unwrap();
    first.save_segments().unwrap();
    drop(first);

    let second = bootstrap::open(&file_config(&dir, true)).unwrap();
    let page = second.auth.get_page(&index).unwrap();
    assert_eq!(page.header().name, "compressed");
}

#[test]
fn reopen_does_not_reseed_segments_or_recreate_roots() {
    let dir = TempDir::new().unwrap();

    let first = bootstrap::open(&file_config(&dir, false)).unwrap();
    let first_root = first.segments.get_segment("usr").unwrap().root_index.unwrap();
    drop(first);

    let second = bootstrap::open(&file_config(&dir, false)).unwrap();
    let second_root = second.segments.get_segment("usr").unwrap().root_index.unwrap();
    assert_eq!(first_root, second_root);
    assert_eq!(second.segments.list_segments().len(), 6);
}
