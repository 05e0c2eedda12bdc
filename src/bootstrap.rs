//! Opens a store from a [`Config`], loading or seeding the fixed segment
//! list of §6 as needed. This is the crate's single entry point: the CLI
//! binary and integration tests both go through [`open`].

use crate::auth::AuthorizedStore;
use crate::config::{Backend, Config};
use crate::error::Result;
use crate::model::Segment;
use crate::persist::{FileStorage, MemoryStorage, PageStorage};
use crate::store::{self, PageStore, SegmentRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// A fully wired store: the typed tree, its segment partitions, and the
/// authorization layer in front of both.
pub struct Store {
    /// Typed page tree and its durable mirror.
    pub pages: Arc<PageStore>,
    /// Segment partitions and their index allocators.
    pub segments: Arc<SegmentRegistry>,
    /// Permission-gated entry point; the surface every caller outside this
    /// module should use.
    pub auth: Arc<AuthorizedStore>,
    storage_dir: Option<PathBuf>,
}

impl Store {
    /// Writes `segments.json` if this store has a file-backed directory.
    /// A no-op for an in-memory store (nothing to persist).
    pub fn save_segments(&self) -> Result<()> {
        if let Some(dir) = &self.storage_dir {
            store::save_segments(dir, &self.segments)?;
        }
        Ok(())
    }
}

/// Opens a store per `config`: constructs the storage backend, loads (or
/// seeds, on first run) the segment registry, and warms the page cache.
pub fn open(config: &Config) -> Result<Store> {
    let (storage, storage_dir): (Arc<dyn PageStorage>, Option<PathBuf>) = match &config.backend {
        Backend::Memory => (Arc::new(MemoryStorage::new()), None),
        Backend::File { dir, compress } => (
            Arc::new(FileStorage::open(dir.clone(), *compress)?),
            Some(dir.clone()),
        ),
    };

    let registry = match &storage_dir {
        Some(dir) => store::load_segments(dir)?,
        None => SegmentRegistry::new(),
    };

    let pages = Arc::new(PageStore::new(storage));
    pages.reload()?;

    let first_run = registry.list_segments().is_empty();
    let segments = Arc::new(registry);
    let auth = Arc::new(AuthorizedStore::new(pages.clone(), segments.clone()));

    if first_run {
        info!(count = config.segments.len(), "seeding fixed segment list");
        for seed in &config.segments {
            seed_segment(&segments, &auth, seed)?;
        }
        if let Some(dir) = &storage_dir {
            store::save_segments(dir, &segments)?;
        }
    }

    Ok(Store {
        pages,
        segments,
        auth,
        storage_dir,
    })
}

fn seed_segment(
    segments: &Arc<SegmentRegistry>,
    auth: &Arc<AuthorizedStore>,
    seed: &crate::config::SegmentSeed,
) -> Result<()> {
    segments.add_segment(Segment {
        id: seed.id.to_string(),
        name: seed.name.to_string(),
        description: seed.description.to_string(),
        kind: seed.kind,
        permission: seed.permission,
        root_index: None,
        next_index: 0,
    })?;
    auth.system_create_root(seed.id, seed.name.to_string(), seed.description.to_string())?;
    Ok(())
}
