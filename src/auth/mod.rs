//! Read/write/create/move/delete gating on top of [`PageStore`] and
//! [`SegmentRegistry`] (§4.3), keyed by the owning segment's permission.

use crate::model::{Lifecycle, Page, PageHeader, PageIndex, Permission, SegmentType, Visibility};
use crate::store::{PageStore, SegmentRegistry};
use crate::error::{Result, StoreError};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::warn;

/// The three classes every store mutation is bucketed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationClass {
    Read,
    Write,
    System,
}

fn allows(permission: Permission, class: OperationClass) -> bool {
    match (permission, class) {
        (_, OperationClass::Read) => true,
        (Permission::ReadOnly, OperationClass::Write | OperationClass::System) => false,
        (Permission::ReadWrite, OperationClass::Write) => true,
        (Permission::ReadWrite, OperationClass::System) => false,
        (Permission::SystemManaged, OperationClass::Write | OperationClass::System) => true,
    }
}

/// Wraps [`PageStore`] + [`SegmentRegistry`] with the permission gate of
/// §4.3. This is the surface every caller outside bootstrap code should go
/// through; the Tool Surface (§4.6) is a thin adapter over exactly these
/// methods.
pub struct AuthorizedStore {
    pages: Arc<PageStore>,
    segments: Arc<SegmentRegistry>,
}

impl AuthorizedStore {
    /// Wraps the given store and registry.
    pub fn new(pages: Arc<PageStore>, segments: Arc<SegmentRegistry>) -> Self {
        Self { pages, segments }
    }

    /// Direct access to the wrapped `PageStore`, for components (the
    /// renderer, auto-collapse) that are themselves trusted and operate
    /// below the authorization boundary.
    pub fn pages(&self) -> &Arc<PageStore> {
        &self.pages
    }

    /// Direct access to the wrapped `SegmentRegistry`.
    pub fn segments(&self) -> &Arc<SegmentRegistry> {
        &self.segments
    }

    fn check(&self, op: &'static str, segment_id: &str, class: OperationClass) -> Result<()> {
        let permission = self.segments.permission_of(segment_id)?;
        if allows(permission, class) {
            Ok(())
        } else {
            warn!(op, segment = segment_id, ?class, "authorization denied");
            Err(StoreError::PermissionDenied {
                op,
                target: segment_id.to_string(),
            })
        }
    }

    // ---- Read operations: always allowed, but still routed through the
    // same segment-lookup path so a missing segment reports consistently. ----

    /// §4.6 `get_segment`.
    pub fn get_segment(&self, id: &str) -> Result<crate::model::Segment> {
        self.segments.get_segment(id)
    }

    /// §4.6 `list_segments`.
    pub fn list_segments(&self) -> Vec<crate::model::Segment> {
        self.segments.list_segments()
    }

    /// §4.6 `get_page`.
    pub fn get_page(&self, index: &PageIndex) -> Result<Page> {
        self.check("get_page", index.segment_id(), OperationClass::Read)?;
        self.pages.get_page(index)
    }

    /// §4.6 `get_children`.
    pub fn get_children(&self, index: &PageIndex) -> Result<Vec<Page>> {
        self.check("get_children", index.segment_id(), OperationClass::Read)?;
        self.pages.get_children(index)
    }

    /// §4.6 `get_parent`.
    pub fn get_parent(&self, index: &PageIndex) -> Result<Option<Page>> {
        self.check("get_parent", index.segment_id(), OperationClass::Read)?;
        self.pages.get_parent(index)
    }

    /// §4.6 `get_ancestors`.
    pub fn get_ancestors(&self, index: &PageIndex) -> Result<Vec<Page>> {
        self.check("get_ancestors", index.segment_id(), OperationClass::Read)?;
        self.pages.get_ancestors(index)
    }

    /// §4.6 `find_page`.
    pub fn find_page(&self, query: &str) -> Vec<Page> {
        self.pages.find_by_query(query)
    }

    // ---- Write operations ----

    /// §4.6 `update_page`.
    pub fn update_page(
        &self,
        index: &PageIndex,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<()> {
        self.check("update_page", index.segment_id(), OperationClass::Write)?;
        self.pages.update_page(index, name, description)
    }

    /// §4.6 `expand_details`. Always allowed once the Write check passes,
    /// including on a System segment's root (invariant 8 restricts `hide`
    /// only).
    pub fn expand_details(&self, index: &PageIndex) -> Result<()> {
        self.check("expand_details", index.segment_id(), OperationClass::Write)?;
        self.pages.set_visibility(index, Visibility::Expanded)
    }

    /// §4.6 `hide_details`. Rejected with `SystemRootProtected` when `index`
    /// is a System segment's root, regardless of permission (invariant 8).
    pub fn hide_details(&self, index: &PageIndex) -> Result<()> {
        self.check("hide_details", index.segment_id(), OperationClass::Write)?;
        let segment = self.segments.segment_of(index)?;
        if segment.kind == SegmentType::System && segment.root_index.as_ref() == Some(index) {
            return Err(StoreError::SystemRootProtected {
                op: "hide_details",
                target: index.to_string(),
            });
        }
        self.pages.set_visibility(index, Visibility::Hidden)
    }

    /// §4.6 `remove_page`.
    pub fn remove_page(&self, index: &PageIndex) -> Result<()> {
        self.check("remove_page", index.segment_id(), OperationClass::Write)?;
        self.pages.remove_page(index)
    }

    /// §4.6 `move_page`. Both endpoints' segments are checked even though
    /// a successful move never crosses a segment boundary (the `PageStore`
    /// enforces that structurally); the redundancy matches the contract's
    /// "both endpoints checked" wording and protects a future relaxation of
    /// the cross-segment rule.
    pub fn move_page(&self, src: &PageIndex, dst: &PageIndex) -> Result<()> {
        self.check("move_page", src.segment_id(), OperationClass::Write)?;
        self.check("move_page", dst.segment_id(), OperationClass::Write)?;
        self.pages.move_page(src, dst)
    }

    /// §4.6 `create_detail_page`. Returns the newly allocated index.
    pub fn create_detail_page(
        &self,
        name: String,
        description: String,
        detail: String,
        parent: &PageIndex,
    ) -> Result<PageIndex> {
        self.check("create_detail_page", parent.segment_id(), OperationClass::Write)?;
        if name.is_empty() {
            return Err(StoreError::InvariantViolation {
                op: "create_detail_page",
                target: parent.to_string(),
                reason: "name must not be empty".to_string(),
            });
        }
        let index = self.segments.allocate_index(parent.segment_id())?;
        let now = OffsetDateTime::now_utc();
        let page = Page::Detail {
            header: PageHeader {
                index: index.clone(),
                name,
                description,
                parent: Some(parent.clone()),
                lifecycle: Lifecycle::Active,
                visibility: Visibility::Hidden,
                created_at: now,
                updated_at: now,
            },
            detail,
        };
        self.pages.add_page(page)?;
        Ok(index)
    }

    /// §4.6 `create_contents_page`. `children` must already exist in the
    /// same segment; each is re-parented onto the new page via
    /// [`PageStore::move_page`], so every bidirectional-consistency and
    /// cycle check a bare move would apply still applies here.
    pub fn create_contents_page(
        &self,
        name: String,
        description: String,
        parent: &PageIndex,
        children: Vec<PageIndex>,
    ) -> Result<PageIndex> {
        self.check(
            "create_contents_page",
            parent.segment_id(),
            OperationClass::Write,
        )?;
        for child in &children {
            self.check("create_contents_page", child.segment_id(), OperationClass::Write)?;
        }
        if name.is_empty() {
            return Err(StoreError::InvariantViolation {
                op: "create_contents_page",
                target: parent.to_string(),
                reason: "name must not be empty".to_string(),
            });
        }
        let index = self.segments.allocate_index(parent.segment_id())?;
        let now = OffsetDateTime::now_utc();
        let page = Page::Contents {
            header: PageHeader {
                index: index.clone(),
                name,
                description,
                parent: Some(parent.clone()),
                lifecycle: Lifecycle::Active,
                visibility: Visibility::Expanded,
                created_at: now,
                updated_at: now,
            },
            children: Vec::new(),
        };
        self.pages.add_page(page)?;
        for child in children {
            self.pages.move_page(&child, &index)?;
        }
        Ok(index)
    }

    /// Bootstrap-only entry point (§4.3's "system" bypass): creates a
    /// segment's root `ContentsPage`, which has no parent and so cannot be
    /// produced through `create_contents_page`. Never routed through the
    /// Tool Surface.
    pub fn system_create_root(&self, segment_id: &str, name: String, description: String) -> Result<PageIndex> {
        let index = self.segments.allocate_index(segment_id)?;
        let now = OffsetDateTime::now_utc();
        let page = Page::Contents {
            header: PageHeader {
                index: index.clone(),
                name,
                description,
                parent: None,
                lifecycle: Lifecycle::Active,
                visibility: Visibility::Expanded,
                created_at: now,
                updated_at: now,
            },
            children: Vec::new(),
        };
        self.pages.add_page(page)?;
        self.segments.set_root(segment_id, index.clone())?;
        Ok(index)
    }
}
