//! The `PageStorage` collaborator (§6): the durable mirror of the in-memory
//! page tree. Two reference implementations are provided: [`MemoryStorage`]
//! for tests and ephemeral runs, and [`FileStorage`], one file per page.

mod file;
mod memory;
mod wire;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use wire::{decode, encode};

use crate::error::Result;
use crate::model::{Page, PageIndex};

/// Durable mirror of the page tree. `PageStore` writes every mutation
/// through to this collaborator before returning success to its caller
/// (§4.1's persistence contract); reads consult the in-memory map first and
/// fall back to `load` on a cache miss.
pub trait PageStorage: Send + Sync {
    /// Upserts `page` by its index.
    fn save(&self, page: &Page) -> Result<()>;

    /// Loads the page at `index`. Fails with `NotFound` if absent.
    fn load(&self, index: &PageIndex) -> Result<Page>;

    /// Removes the page at `index`. Idempotent: removing an absent page is
    /// not an error.
    fn delete(&self, index: &PageIndex) -> Result<()>;

    /// Reports whether `index` currently has a stored page.
    fn exists(&self, index: &PageIndex) -> Result<bool>;

    /// Lists every index currently stored, for cold-start reloads. Order is
    /// unspecified; `PageStore::reload` sorts by segment and suffix itself.
    fn list_indices(&self) -> Result<Vec<PageIndex>>;
}
