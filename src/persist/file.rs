//! File-backed [`PageStorage`]: one file per page, named `<index>.json` or,
//! when compression is enabled, `<index>.json.gz`.

use super::{wire, PageStorage};
use crate::error::{Result, StoreError};
use crate::model::{Page, PageIndex};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Persists pages as individual JSON files under a directory. An auxiliary
/// `segments.json` sibling (written by [`crate::store::SegmentRegistry`]) is
/// metadata, not a page, and is never touched by this backend.
pub struct FileStorage {
    dir: PathBuf,
    compress: bool,
}

impl FileStorage {
    /// Opens (creating if absent) a file-backed store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>, compress: bool) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::storage("open", dir.display().to_string(), e))?;
        Ok(Self { dir, compress })
    }

    fn path_for(&self, index: &PageIndex) -> PathBuf {
        let ext = if self.compress { "json.gz" } else { "json" };
        self.dir.join(format!("{}.{ext}", index.as_str()))
    }

    /// Directory this backend is rooted at.
    pub fn root(&self) -> &Path {
        &self.dir
    }
}

impl PageStorage for FileStorage {
    fn save(&self, page: &Page) -> Result<()> {
        let index = page.index();
        let bytes = wire::encode(page)?;
        let path = self.path_for(index);
        if self.compress {
            let file = fs::File::create(&path)
                .map_err(|e| StoreError::storage("save", index.to_string(), e))?;
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder
                .write_all(&bytes)
                .map_err(|e| StoreError::storage("save", index.to_string(), e))?;
            encoder
                .finish()
                .map_err(|e| StoreError::storage("save", index.to_string(), e))?;
        } else {
            fs::write(&path, bytes).map_err(|e| StoreError::storage("save", index.to_string(), e))?;
        }
        Ok(())
    }

    fn load(&self, index: &PageIndex) -> Result<Page> {
        let path = self.path_for(index);
        let bytes = if self.compress {
            let file = fs::File::open(&path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StoreError::NotFound {
                        op: "load",
                        target: index.to_string(),
                    }
                } else {
                    StoreError::storage("load", index.to_string(), e)
                }
            })?;
            let mut decoder = GzDecoder::new(file);
            let mut buf = Vec::new();
            decoder
                .read_to_end(&mut buf)
                .map_err(|e| StoreError::storage("load", index.to_string(), e))?;
            buf
        } else {
            fs::read(&path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StoreError::NotFound {
                        op: "load",
                        target: index.to_string(),
                    }
                } else {
                    StoreError::storage("load", index.to_string(), e)
                }
            })?
        };
        wire::decode(&bytes)
    }

    fn delete(&self, index: &PageIndex) -> Result<()> {
        let path = self.path_for(index);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::storage("delete", index.to_string(), e)),
        }
    }

    fn exists(&self, index: &PageIndex) -> Result<bool> {
        Ok(self.path_for(index).exists())
    }

    fn list_indices(&self) -> Result<Vec<PageIndex>> {
        let mut out = Vec::new();
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| StoreError::storage("list_indices", self.dir.display().to_string(), e))?;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::storage("list_indices", self.dir.display().to_string(), e))?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if name == "segments.json" {
                continue;
            }
            let stem = name
                .strip_suffix(".json.gz")
                .or_else(|| name.strip_suffix(".json"));
            if let Some(stem) = stem {
                out.push(PageIndex::from(stem.to_string()));
            }
        }
        Ok(out)
    }
}
