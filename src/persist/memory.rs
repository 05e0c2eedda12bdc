//! In-memory [`PageStorage`], used by tests and ephemeral (non-durable) runs.

use super::PageStorage;
use crate::error::{Result, StoreError};
use crate::model::{Page, PageIndex};
use parking_lot::RwLock;
use std::collections::HashMap;

/// A `PageStorage` backed by a plain map. Nothing survives process exit.
#[derive(Default)]
pub struct MemoryStorage {
    pages: RwLock<HashMap<PageIndex, Page>>,
}

impl MemoryStorage {
    /// Creates an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageStorage for MemoryStorage {
    fn save(&self, page: &Page) -> Result<()> {
        self.pages
            .write()
            .insert(page.index().clone(), page.clone());
        Ok(())
    }

    fn load(&self, index: &PageIndex) -> Result<Page> {
        self.pages
            .read()
            .get(index)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                op: "load",
                target: index.to_string(),
            })
    }

    fn delete(&self, index: &PageIndex) -> Result<()> {
        self.pages.write().remove(index);
        Ok(())
    }

    fn exists(&self, index: &PageIndex) -> Result<bool> {
        Ok(self.pages.read().contains_key(index))
    }

    fn list_indices(&self) -> Result<Vec<PageIndex>> {
        Ok(self.pages.read().keys().cloned().collect())
    }
}
