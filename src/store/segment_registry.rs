//! Named top-level partitions of the page tree (§4.2): each owns a
//! permission class and a monotonic `PageIndex` allocator.

use crate::error::{Result, StoreError};
use crate::model::{PageIndex, Permission, Segment, SegmentType};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Owns every [`Segment`] record. `PageStore` never allocates indices
/// itself; callers request one from here, keeping the monotonic counter
/// co-located with the authoritative segment record.
#[derive(Default)]
pub struct SegmentRegistry {
    // `order` preserves insertion order for `list_segments`; `segments`
    // gives O(1) lookup by id. Both are guarded by one lock so the pair
    // never drifts out of sync.
    inner: RwLock<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    segments: HashMap<String, Segment>,
    order: Vec<String>,
}

impl SegmentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `segment`. Fails if its id is already taken.
    pub fn add_segment(&self, segment: Segment) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.segments.contains_key(&segment.id) {
            return Err(StoreError::Duplicate {
                op: "add_segment",
                target: segment.id.clone(),
            });
        }
        inner.order.push(segment.id.clone());
        inner.segments.insert(segment.id.clone(), segment);
        Ok(())
    }

    /// Removes the segment record `id`. Does not cascade-delete its pages;
    /// that is the caller's responsibility (typically: remove the root
    /// page through `PageStore` first, which is itself forbidden, so in
    /// practice segment removal is reserved for administrative teardown).
    pub fn remove_segment(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.segments.remove(id).is_none() {
            return Err(StoreError::NotFound {
                op: "remove_segment",
                target: id.to_string(),
            });
        }
        inner.order.retain(|s| s != id);
        Ok(())
    }

    /// Returns a snapshot of the segment `id`.
    pub fn get_segment(&self, id: &str) -> Result<Segment> {
        self.inner
            .read()
            .segments
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                op: "get_segment",
                target: id.to_string(),
            })
    }

    /// Every segment, in insertion order.
    pub fn list_segments(&self) -> Vec<Segment> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.segments.get(id).cloned())
            .collect()
    }

    /// The segment owning `index`, found by prefix match.
    pub fn segment_of(&self, index: &PageIndex) -> Result<Segment> {
        self.get_segment(index.segment_id())
    }

    /// Atomically allocates and returns the next `PageIndex` for `segment_id`.
    pub fn allocate_index(&self, segment_id: &str) -> Result<PageIndex> {
        let mut inner = self.inner.write();
        let segment = inner
            .segments
            .get_mut(segment_id)
            .ok_or_else(|| StoreError::NotFound {
                op: "allocate_index",
                target: segment_id.to_string(),
            })?;
        Ok(segment.allocate_index())
    }

    /// Records that `root` is the root `ContentsPage` of `segment_id`.
    pub fn set_root(&self, segment_id: &str, root: PageIndex) -> Result<()> {
        let mut inner = self.inner.write();
        let segment = inner
            .segments
            .get_mut(segment_id)
            .ok_or_else(|| StoreError::NotFound {
                op: "set_root",
                target: segment_id.to_string(),
            })?;
        segment.root_index = Some(root);
        Ok(())
    }

    /// Seeds `segment_id`'s counter so newly allocated suffixes exceed
    /// every suffix already observed in storage (§9's reload tolerance for
    /// legacy, non-per-segment counters).
    pub fn reseed_from_storage(&self, segment_id: &str, max_seen_suffix: u64) -> Result<()> {
        let mut inner = self.inner.write();
        let segment = inner
            .segments
            .get_mut(segment_id)
            .ok_or_else(|| StoreError::NotFound {
                op: "reseed_from_storage",
                target: segment_id.to_string(),
            })?;
        segment.reseed_counter(max_seen_suffix);
        Ok(())
    }

    /// Permission of `segment_id`, used by the Authorization Layer.
    pub fn permission_of(&self, segment_id: &str) -> Result<Permission> {
        Ok(self.get_segment(segment_id)?.permission)
    }

    /// Type classification of `segment_id`.
    pub fn type_of(&self, segment_id: &str) -> Result<SegmentType> {
        Ok(self.get_segment(segment_id)?.kind)
    }
}
