//! Named callables exposed to the sandboxed script runner (§4.6). Each
//! method is a thin adapter over one [`AuthorizedStore`] operation: it
//! unpacks arguments, performs the authorized call, and converts the
//! result into a sandbox-facing record. The sandbox evaluator itself is an
//! external collaborator; this module specifies only the callable surface
//! it must expose and the `ScriptError` contract errors cross through.

use crate::auth::AuthorizedStore;
use crate::error::{Result, StoreError};
use crate::model::{Page, PageIndex, Segment};
use std::sync::Arc;

/// Sandbox-facing view of a [`Page`], flattened across both variants so a
/// script never needs to branch on the Rust enum.
#[derive(Debug, Clone)]
pub struct PageRecord {
    /// Stable identity.
    pub index: PageIndex,
    /// Label.
    pub name: String,
    /// Summary.
    pub description: String,
    /// `"active"`, `"hot_archived"`, or `"cold_archived"`.
    pub lifecycle: &'static str,
    /// `"expanded"` or `"hidden"`.
    pub visibility: &'static str,
    /// `"detail"` or `"contents"`.
    pub kind: &'static str,
}

impl From<Page> for PageRecord {
    fn from(page: Page) -> Self {
        let header = page.header();
        PageRecord {
            index: header.index.clone(),
            name: header.name.clone(),
            description: header.description.clone(),
            lifecycle: match header.lifecycle {
                crate::model::Lifecycle::Active => "active",
                crate::model::Lifecycle::HotArchived => "hot_archived",
                crate::model::Lifecycle::ColdArchived => "cold_archived",
            },
            visibility: match header.visibility {
                crate::model::Visibility::Expanded => "expanded",
                crate::model::Visibility::Hidden => "hidden",
            },
            kind: if page.is_contents() { "contents" } else { "detail" },
        }
    }
}

/// Sandbox-facing view of a [`Segment`].
#[derive(Debug, Clone)]
pub struct SegmentRecord {
    /// Segment id.
    pub id: String,
    /// `"system"`, `"user"`, `"tool"`, or `"custom"`.
    pub kind: &'static str,
    /// `"read_only"`, `"read_write"`, or `"system_managed"`.
    pub permission: &'static str,
    /// The segment's root page, if it has been set up.
    pub root_index: Option<PageIndex>,
}

impl From<Segment> for SegmentRecord {
    fn from(segment: Segment) -> Self {
        SegmentRecord {
            id: segment.id,
            kind: match segment.kind {
                crate::model::SegmentType::System => "system",
                crate::model::SegmentType::User => "user",
                crate::model::SegmentType::Tool => "tool",
                crate::model::SegmentType::Custom => "custom",
            },
            permission: match segment.permission {
                crate::model::Permission::ReadOnly => "read_only",
                crate::model::Permission::ReadWrite => "read_write",
                crate::model::Permission::SystemManaged => "system_managed",
            },
            root_index: segment.root_index,
        }
    }
}

/// The fifteen named callables of §4.6, wrapping an [`AuthorizedStore`].
pub struct ToolSurface {
    store: Arc<AuthorizedStore>,
}

impl ToolSurface {
    /// Exposes `store` to the sandbox.
    pub fn new(store: Arc<AuthorizedStore>) -> Self {
        Self { store }
    }

    /// Wraps a failed call as a script-aborting [`StoreError::ScriptError`],
    /// carrying the call's target name per §7.
    fn script_err(target: &str, e: StoreError) -> StoreError {
        StoreError::ScriptError {
            target: target.to_string(),
            reason: e.to_string(),
        }
    }

    /// `get_segment(id)`.
    pub fn get_segment(&self, id: &str) -> Result<SegmentRecord> {
        self.store
            .get_segment(id)
            .map(SegmentRecord::from)
            .map_err(|e| Self::script_err(&format!("get_segment({id})"), e))
    }

    /// `list_segments()`.
    pub fn list_segments(&self) -> Vec<SegmentRecord> {
        self.store.list_segments().into_iter().map(SegmentRecord::from).collect()
    }

    /// `get_page(i)`.
    pub fn get_page(&self, index: &PageIndex) -> Result<PageRecord> {
        self.store
            .get_page(index)
            .map(PageRecord::from)
            .map_err(|e| Self::script_err(&format!("get_page({index})"), e))
    }

    /// `get_children(i)`.
    pub fn get_children(&self, index: &PageIndex) -> Result<Vec<PageRecord>> {
        self.store
            .get_children(index)
            .map(|pages| pages.into_iter().map(PageRecord::from).collect())
            .map_err(|e| Self::script_err(&format!("get_children({index})"), e))
    }

    /// `get_parent(i)`.
    pub fn get_parent(&self, index: &PageIndex) -> Result<Option<PageRecord>> {
        self.store
            .get_parent(index)
            .map(|p| p.map(PageRecord::from))
            .map_err(|e| Self::script_err(&format!("get_parent({index})"), e))
    }

    /// `get_ancestors(i)`.
    pub fn get_ancestors(&self, index: &PageIndex) -> Result<Vec<PageRecord>> {
        self.store
            .get_ancestors(index)
            .map(|pages| pages.into_iter().map(PageRecord::from).collect())
            .map_err(|e| Self::script_err(&format!("get_ancestors({index})"), e))
    }

    /// `find_page(query)`.
    pub fn find_page(&self, query: &str) -> Vec<PageRecord> {
        self.store.find_page(query).into_iter().map(PageRecord::from).collect()
    }

    /// `update_page(i, name, description)`.
    pub fn update_page(&self, index: &PageIndex, name: String, description: String) -> Result<()> {
        self.store
            .update_page(index, Some(name), Some(description))
            .map_err(|e| Self::script_err(&format!("update_page({index})"), e))
    }

    /// `expand_details(i)`.
    pub fn expand_details(&self, index: &PageIndex) -> Result<()> {
        self.store
            .expand_details(index)
            .map_err(|e| Self::script_err(&format!("expand_details({index})"), e))
    }

    /// `hide_details(i)`.
    pub fn hide_details(&self, index: &PageIndex) -> Result<()> {
        self.store
            .hide_details(index)
            .map_err(|e| Self::script_err(&format!("hide_details({index})"), e))
    }

    /// `remove_page(i)`.
    pub fn remove_page(&self, index: &PageIndex) -> Result<()> {
        self.store
            .remove_page(index)
            .map_err(|e| Self::script_err(&format!("remove_page({index})"), e))
    }

    /// `move_page(src, dst)`.
    pub fn move_page(&self, src: &PageIndex, dst: &PageIndex) -> Result<()> {
        self.store
            .move_page(src, dst)
            .map_err(|e| Self::script_err(&format!("move_page({src}, {dst})"), e))
    }

    /// `create_detail_page(name, description, detail, parent)`.
    pub fn create_detail_page(
        &self,
        name: String,
        description: String,
        detail: String,
        parent: &PageIndex,
    ) -> Result<PageIndex> {
        self.store
            .create_detail_page(name, description, detail, parent)
            .map_err(|e| Self::script_err(&format!("create_detail_page(parent={parent})"), e))
    }

    /// `create_contents_page(name, description, parent, children)`.
    pub fn create_contents_page(
        &self,
        name: String,
        description: String,
        parent: &PageIndex,
        children: Vec<PageIndex>,
    ) -> Result<PageIndex> {
        self.store
            .create_contents_page(name, description, parent, children)
            .map_err(|e| Self::script_err(&format!("create_contents_page(parent={parent})"), e))
    }
}
