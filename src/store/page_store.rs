//! The typed page tree, its structural invariants, and its persisted
//! mirror (§4.1). `PageStore` performs no permission checks; that is the
//! Authorization Layer's job, one layer up.

use crate::error::{Result, StoreError};
use crate::model::{Lifecycle, Page, PageIndex, Visibility};
use crate::persist::PageStorage;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, warn};

/// Typed tree of pages plus its durable mirror. One `RwLock` guards the
/// whole in-memory map and the linkage between pages (§5): every mutation
/// takes the write lock, every read takes the read lock, and no I/O is
/// performed while either lock is held.
pub struct PageStore {
    pages: RwLock<HashMap<PageIndex, Page>>,
    storage: Arc<dyn PageStorage>,
}

impl PageStore {
    /// Opens a store backed by `storage`, with nothing loaded into memory
    /// yet. Use [`PageStore::reload`] to eagerly warm the cache from a
    /// populated backend.
    pub fn new(storage: Arc<dyn PageStorage>) -> Self {
        Self {
            pages: RwLock::new(HashMap::new()),
            storage,
        }
    }

    /// Eagerly loads every page the storage backend lists into memory.
    /// Used for persistence round-trip scenarios and cold starts.
    pub fn reload(&self) -> Result<()> {
        let indices = self.storage.list_indices()?;
        let mut loaded = Vec::with_capacity(indices.len());
        for index in indices {
            loaded.push(self.storage.load(&index)?);
        }
        let mut pages = self.pages.write();
        for page in loaded {
            pages.insert(page.index().clone(), page);
        }
        Ok(())
    }

    /// Inserts `page`. `page.parent` must be `None` (a segment root being
    /// created) or reference an existing `Contents` page in the same
    /// segment.
    pub fn add_page(&self, page: Page) -> Result<()> {
        let index = page.index().clone();
        let parent_snapshot = {
            let mut pages = self.pages.write();
            if pages.contains_key(&index) {
                return Err(StoreError::Duplicate {
                    op: "add_page",
                    target: index.to_string(),
                });
            }

            match &page.header().parent {
                None => {
                    // A root: allowed unconditionally here; the Authorization
                    // Layer is responsible for ensuring only segment setup
                    // creates parentless pages.
                }
                Some(parent_idx) => {
                    if parent_idx.segment_id() != index.segment_id() {
                        return Err(StoreError::InvariantViolation {
                            op: "add_page",
                            target: index.to_string(),
                            reason: format!(
                                "parent {parent_idx} is in a different segment than {index}"
                            ),
                        });
                    }
                    let parent = pages.get(parent_idx).ok_or_else(|| StoreError::NotFound {
                        op: "add_page",
                        target: parent_idx.to_string(),
                    })?;
                    if !parent.is_contents() {
                        return Err(StoreError::InvariantViolation {
                            op: "add_page",
                            target: index.to_string(),
                            reason: format!("parent {parent_idx} is not a ContentsPage"),
                        });
                    }
                }
            }

            // Commit to storage before linking into memory, so a storage
            // failure rolls back cleanly (nothing was inserted yet).
            self.storage.save(&page)?;

            let parent_snapshot = if let Some(parent_idx) = &page.header().parent {
                if let Some(Page::Contents { children, header, .. }) = pages.get_mut(parent_idx) {
                    children.push(index.clone());
                    header.updated_at = now();
                }
                pages.get(parent_idx).cloned()
            } else {
                None
            };

            pages.insert(index.clone(), page);
            parent_snapshot
        };

        // The parent's children list changed; persist it too; otherwise a
        // reload would show the child as unreachable from the tree.
        if let Some(parent) = parent_snapshot {
            self.storage.save(&parent)?;
        }

        debug!(index = %index, "add_page");
        Ok(())
    }

    /// Returns a snapshot of the page at `index`, loading from storage on a
    /// cache miss.
    pub fn get_page(&self, index: &PageIndex) -> Result<Page> {
        if let Some(page) = self.pages.read().get(index) {
            return Ok(page.clone());
        }
        let page = self.storage.load(index)?;
        self.pages.write().insert(index.clone(), page.clone());
        Ok(page)
    }

    /// Removes the page at `index` and every descendant, atomically from
    /// the caller's point of view. Performs a post-order traversal:
    /// storage deletes first, then in-memory unlinking, then detaches from
    /// the parent. A segment root may not be removed this way (callers
    /// remove segments through the registry, which does not cascade).
    pub fn remove_page(&self, index: &PageIndex) -> Result<()> {
        let parent_idx = {
            let pages = self.pages.read();
            let page = pages.get(index).ok_or_else(|| StoreError::NotFound {
                op: "remove_page",
                target: index.to_string(),
            })?;
            page.header().parent.clone().ok_or_else(|| StoreError::InvariantViolation {
                op: "remove_page",
                target: index.to_string(),
                reason: "cannot remove a segment root".to_string(),
            })?
        };

        let subtree = self.collect_subtree(index)?;
        // Post-order: children before parents, so a partial failure still
        // leaves every successfully-deleted page consistent in both tiers.
        let mut first_error = None;
        for idx in subtree.iter().rev() {
            if let Err(e) = self.storage.delete(idx) {
                warn!(index = %idx, error = %e, "remove_page: storage delete failed");
                first_error.get_or_insert(e);
                continue;
            }
            self.pages.write().remove(idx);
        }

        let parent_snapshot = {
            let mut pages = self.pages.write();
            if let Some(Page::Contents { children, header, .. }) = pages.get_mut(&parent_idx) {
                children.retain(|c| c != index);
                header.updated_at = now();
            }
            pages.get(&parent_idx).cloned()
        };
        if let Some(parent) = parent_snapshot {
            if let Err(e) = self.storage.save(&parent) {
                warn!(index = %parent_idx, error = %e, "remove_page: parent persist failed");
                first_error.get_or_insert(e);
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }
        debug!(index = %index, removed = subtree.len(), "remove_page");
        Ok(())
    }

    /// Post-order list of `index` and every descendant (children before
    /// parents is achieved by reversing a pre-order DFS).
    fn collect_subtree(&self, index: &PageIndex) -> Result<Vec<PageIndex>> {
        let mut out = vec![index.clone()];
        let mut stack = vec![index.clone()];
        let pages = self.pages.read();
        while let Some(cur) = stack.pop() {
            if let Some(page) = pages.get(&cur) {
                if let Some(children) = page.children() {
                    for child in children {
                        out.push(child.clone());
                        stack.push(child.clone());
                    }
                }
            }
        }
        Ok(out)
    }

    /// Detaches `src` from its current parent and appends it to `dst`'s
    /// children. Rejects a move that would create a cycle, move a segment
    /// root, retarget onto a non-`Contents` page, or cross a segment
    /// boundary.
    pub fn move_page(&self, src: &PageIndex, dst: &PageIndex) -> Result<()> {
        if src.segment_id() != dst.segment_id() {
            return Err(StoreError::InvariantViolation {
                op: "move_page",
                target: src.to_string(),
                reason: format!("cannot move {src} across segments to {dst}"),
            });
        }

        let mut pages = self.pages.write();

        let src_parent = {
            let src_page = pages.get(src).ok_or_else(|| StoreError::NotFound {
                op: "move_page",
                target: src.to_string(),
            })?;
            if src_page.header().parent.is_none() {
                return Err(StoreError::InvariantViolation {
                    op: "move_page",
                    target: src.to_string(),
                    reason: "cannot move a segment root".to_string(),
                });
            }
            src_page.header().parent.clone().unwrap()
        };

        {
            let dst_page = pages.get(dst).ok_or_else(|| StoreError::NotFound {
                op: "move_page",
                target: dst.to_string(),
            })?;
            if !dst_page.is_contents() {
                return Err(StoreError::InvariantViolation {
                    op: "move_page",
                    target: dst.to_string(),
                    reason: "destination is not a ContentsPage".to_string(),
                });
            }
        }

        // Cycle check: walk dst's ancestors; abort if src is among them.
        let mut cursor = Some(dst.clone());
        while let Some(cur) = cursor {
            if cur == *src {
                return Err(StoreError::InvariantViolation {
                    op: "move_page",
                    target: src.to_string(),
                    reason: format!("moving {src} under {dst} would create a cycle"),
                });
            }
            cursor = pages.get(&cur).and_then(|p| p.header().parent.clone());
        }

        if let Some(Page::Contents { children, header, .. }) = pages.get_mut(&src_parent) {
            children.retain(|c| c != src);
            header.updated_at = now();
        }
        if let Some(Page::Contents { children, header, .. }) = pages.get_mut(dst) {
            children.push(src.clone());
            header.updated_at = now();
        }
        if let Some(page) = pages.get_mut(src) {
            page.header_mut().parent = Some(dst.clone());
            page.header_mut().updated_at = now();
        }

        let src_snapshot = pages.get(src).cloned();
        let dst_snapshot = pages.get(dst).cloned();
        let parent_snapshot = pages.get(&src_parent).cloned();
        drop(pages);

        if let Some(p) = src_snapshot {
            self.storage.save(&p)?;
        }
        if let Some(p) = dst_snapshot {
            self.storage.save(&p)?;
        }
        if let Some(p) = parent_snapshot {
            self.storage.save(&p)?;
        }
        debug!(src = %src, dst = %dst, "move_page");
        Ok(())
    }

    /// Updates `name` and/or `description` in place. `name`, if given, must
    /// be non-empty.
    pub fn update_page(
        &self,
        index: &PageIndex,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<()> {
        if let Some(n) = &name {
            if n.is_empty() {
                return Err(StoreError::InvariantViolation {
                    op: "update_page",
                    target: index.to_string(),
                    reason: "name must not be empty".to_string(),
                });
            }
        }
        self.mutate_and_save(index, "update_page", |page| {
            let header = page.header_mut();
            if let Some(n) = name {
                header.name = n;
            }
            if let Some(d) = description {
                header.description = d;
            }
            header.updated_at = now();
            Ok(())
        })
    }

    /// Sets `visibility` on the page at `index`.
    pub fn set_visibility(&self, index: &PageIndex, visibility: Visibility) -> Result<()> {
        self.mutate_and_save(index, "set_visibility", |page| {
            let header = page.header_mut();
            header.visibility = visibility;
            header.updated_at = now();
            Ok(())
        })
    }

    /// Sets `lifecycle` on the page at `index`.
    pub fn set_lifecycle(&self, index: &PageIndex, lifecycle: Lifecycle) -> Result<()> {
        self.mutate_and_save(index, "set_lifecycle", |page| {
            let header = page.header_mut();
            header.lifecycle = lifecycle;
            header.updated_at = now();
            Ok(())
        })
    }

    fn mutate_and_save(
        &self,
        index: &PageIndex,
        op: &'static str,
        f: impl FnOnce(&mut Page) -> Result<()>,
    ) -> Result<()> {
        let snapshot = {
            let mut pages = self.pages.write();
            let page = pages.get_mut(index).ok_or_else(|| StoreError::NotFound {
                op,
                target: index.to_string(),
            })?;
            f(page)?;
            page.clone()
        };
        if let Err(e) = self.storage.save(&snapshot) {
            warn!(index = %index, op, error = %e, "mutate_and_save: storage write failed, memory stands");
            return Err(e);
        }
        debug!(index = %index, op, "mutate_and_save");
        Ok(())
    }

    /// The direct children of `index`, in order.
    pub fn get_children(&self, index: &PageIndex) -> Result<Vec<Page>> {
        let page = self.get_page(index)?;
        match page.children() {
            Some(children) => children.iter().map(|c| self.get_page(c)).collect(),
            None => Ok(Vec::new()),
        }
    }

    /// The parent of `index`, or `None` if it is a segment root.
    pub fn get_parent(&self, index: &PageIndex) -> Result<Option<Page>> {
        let page = self.get_page(index)?;
        match &page.header().parent {
            Some(p) => Ok(Some(self.get_page(p)?)),
            None => Ok(None),
        }
    }

    /// The chain of ancestors from `index`'s parent up to (and including)
    /// the segment root.
    pub fn get_ancestors(&self, index: &PageIndex) -> Result<Vec<Page>> {
        let mut out = Vec::new();
        let mut cursor = self.get_page(index)?.header().parent.clone();
        while let Some(idx) = cursor {
            let page = self.get_page(&idx)?;
            cursor = page.header().parent.clone();
            out.push(page);
        }
        Ok(out)
    }

    /// Case-insensitive substring search over `name`/`description` across
    /// every page currently cached in memory.
    pub fn find_by_query(&self, query: &str) -> Vec<Page> {
        let needle = query.to_lowercase();
        self.pages
            .read()
            .values()
            .filter(|p| {
                let h = p.header();
                h.name.to_lowercase().contains(&needle) || h.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Whether `index` is currently known (in memory or storage).
    pub fn contains(&self, index: &PageIndex) -> Result<bool> {
        if self.pages.read().contains_key(index) {
            return Ok(true);
        }
        self.storage.exists(index)
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}
