//! The typed page tree ([`PageStore`]) and its segment partitions
//! ([`SegmentRegistry`]), components 1 and 2 of §2.

mod page_store;
mod segment_registry;


pub use page_store::PageStore;
pub use segment_registry::SegmentRegistry;

use crate::error::{Result, StoreError};
use crate::model::Segment;
use std::fs;
use std::path::Path;

const SEGMENTS_FILE: &str = "segments.json";

/// Writes every segment record to `<dir>/segments.json`, the sidecar
/// metadata file §6 calls out as not itself a page.
pub fn save_segments(dir: &Path, registry: &SegmentRegistry) -> Result<()> {
    let segments = registry.list_segments();
    let bytes = serde_json::to_vec_pretty(&segments)
        .map_err(|e| StoreError::serde("save_segments", dir.display().to_string(), e))?;
    fs::write(dir.join(SEGMENTS_FILE), bytes)
        .map_err(|e| StoreError::storage("save_segments", dir.display().to_string(), e))
}

/// Loads segment records from `<dir>/segments.json` into a fresh registry.
/// Returns an empty registry if the sidecar does not exist yet (a brand
/// new store).
pub fn load_segments(dir: &Path) -> Result<SegmentRegistry> {
    let path = dir.join(SEGMENTS_FILE);
    let registry = SegmentRegistry::new();
    if !path.exists() {
        return Ok(registry);
    }
    let bytes =
        fs::read(&path).map_err(|e| StoreError::storage("load_segments", dir.display().to_string(), e))?;
    let segments: Vec<Segment> = serde_json::from_slice(&bytes)
        .map_err(|e| StoreError::serde("load_segments", dir.display().to_string(), e))?;
    for segment in segments {
        registry.add_segment(segment)?;
    }
    Ok(registry)
}
