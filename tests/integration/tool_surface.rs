#![allow(missing_docs)]

use palimpsest::config::Config;
use palimpsest::tools::ToolSurface;
use palimpsest::{bootstrap, StoreError};

#[test]
fn create_and_read_back_through_the_tool_surface() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let tools = ToolSurface::new(store.auth.clone());

    let usr = tools.get_segment("usr").unwrap();
    assert_eq!(usr.permission, "read_write");
    let usr_root = usr.root_index.unwrap();

    let index = tools
        .create_detail_page("note".into(), "desc".into(), "body".into(), &usr_root)
        .unwrap();

    let record = tools.get_page(&index).unwrap();
    assert_eq!(record.name, "note");
    assert_eq!(record.kind, "detail");
    assert_eq!(record.visibility, "hidden");

    tools.expand_details(&index).unwrap();
    let record = tools.get_page(&index).unwrap();
    assert_eq!(record.visibility, "expanded");
}

#[test]
fn list_segments_and_find_page_cover_every_segment() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let tools = ToolSurface::new(store.auth.clone());

    let segments = tools.list_segments();
    assert_eq!(segments.len(), 6);

    let usr_root = tools.get_segment("usr").unwrap().root_index.unwrap();
    tools
        .create_detail_page("weather report".into(), String::new(), "sunny".into(), &usr_root)
        .unwrap();

    let found = tools.find_page("weather");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "weather report");
}

#[test]
fn hiding_a_system_root_surfaces_as_a_script_error() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let tools = ToolSurface::new(store.auth.clone());
    let sys_root = tools.get_segment("sys").unwrap().root_index.unwrap();

    let err = tools.hide_details(&sys_root).unwrap_err();
    match err {
        StoreError::ScriptError { target, reason } => {
            assert!(target.contains("hide_details"));
            assert!(reason.contains("cannot be hidden"));
        }
        other => panic!("expected ScriptError, got {other:?}"),
    }
}

#[test]
fn create_contents_page_adopts_existing_children_via_move() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let tools = ToolSurface::new(store.auth.clone());
    let usr_root = tools.get_segment("usr").unwrap().root_index.unwrap();

    let leaf = tools
        .create_detail_page("leaf".into(), String::new(), "body".into(), &usr_root)
        .unwrap();
    let folder = tools
        .create_contents_page("folder".into(), String::new(), &usr_root, vec![leaf.clone()])
        .unwrap();

    let folder_children = tools.get_children(&folder).unwrap();
    assert_eq!(folder_children.len(), 1);
    assert_eq!(folder_children[0].index, leaf);

    let root_children = tools.get_children(&usr_root).unwrap();
    assert!(!root_children.iter().any(|p| p.index == leaf));
}

#[test]
fn remove_and_move_errors_carry_the_call_target() {
    let store = bootstrap::open(&Config::ephemeral()).unwrap();
    let tools = ToolSurface::new(store.auth.clone());
    let usr_root = tools.get_segment("usr").unwrap().root_index.unwrap();

    let err = tools.remove_page(&usr_root).unwrap_err();
    match err {
        StoreError::ScriptError { target, .. } => assert!(target.contains("remove_page")),
        other => panic!("expected ScriptError, got {other:?}"),
    }
}
