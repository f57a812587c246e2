//! Per-issue page cache.
//!
//! Each page file is read once and tokenized at most once while its issue is
//! being processed. The cache is owned by the issue's processing scope and
//! dropped with it; nothing is shared across issues.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::locate::RegionIndex;
use crate::types::Region;

#[derive(Debug)]
struct CachedPage {
    bytes: Vec<u8>,
    regions: Option<RegionIndex>,
}

/// Page bytes keyed by corpus-relative path.
#[derive(Debug)]
pub struct PageCache {
    root: PathBuf,
    pages: HashMap<String, CachedPage>,
}

impl PageCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), pages: HashMap::new() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Raw bytes of the page at `rel` (relative to the corpus root).
    pub fn bytes(&mut self, rel: &str) -> Result<&[u8]> {
        Ok(&self.load(rel)?.bytes)
    }

    /// Region of the element with `identifier` inside the page at `rel`.
    pub fn region(&mut self, rel: &str, identifier: &str) -> Result<Region> {
        let CachedPage { bytes, regions } = self.load(rel)?;
        let index = regions.get_or_insert_with(|| RegionIndex::build(bytes));
        index.get(identifier).map_err(|miss| Error::RegionNotFound {
            file: rel.to_string(),
            identifier: identifier.to_string(),
            miss,
        })
    }

    /// Number of distinct pages loaded so far.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn load(&mut self, rel: &str) -> Result<&mut CachedPage> {
        match self.pages.entry(rel.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let path = self.root.join(rel);
                let bytes = fs::read(&path).map_err(|e| Error::io(&path, e))?;
                tracing::debug!(page = %rel, bytes = bytes.len(), "loaded page");
                Ok(entry.insert(CachedPage { bytes, regions: None }))
            }
        }
    }
}
