//! Region aggregation and the pointer format.
//!
//! A pointer addresses every fragment of one logical unit:
//! `path1[s1:e1,s2:e2]+path2[s3:e3]`. Files keep the order in which the
//! structural map first mentions them; regions inside a file are sorted by
//! start offset. The string is consumed byte-for-byte by the highlighter, so
//! encoding the same inputs always yields the same text.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::cache::PageCache;
use crate::error::{Error, Result};
use crate::files::{self, FileGroup};
use crate::types::{Locator, Region};

const PART_SEPARATOR: char = '+';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerPart {
    pub path: String,
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointer {
    pub parts: Vec<PointerPart>,
}

impl Pointer {
    /// Read every addressed fragment, in pointer order. `prefix` is removed
    /// from each path before it is joined onto `root`.
    pub fn read_fragments(&self, root: &Path, prefix: &str) -> Result<Vec<Vec<u8>>> {
        let mut fragments = Vec::new();
        for part in &self.parts {
            let rel = part.path.strip_prefix(prefix).unwrap_or(part.path.as_str());
            let path = root.join(rel);
            let bytes = fs::read(&path).map_err(|e| Error::io(&path, e))?;
            for region in &part.regions {
                let fragment = bytes.get(region.start..region.end).ok_or_else(|| {
                    Error::InvalidPointer(format!(
                        "{}:{} is outside {} ({} bytes)",
                        region.start,
                        region.end,
                        part.path,
                        bytes.len()
                    ))
                })?;
                fragments.push(fragment.to_vec());
            }
        }
        Ok(fragments)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", PART_SEPARATOR)?;
            }
            write!(f, "{}[", part.path)?;
            for (j, region) in part.regions.iter().enumerate() {
                if j > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}:{}", region.start, region.end)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

impl FromStr for Pointer {
    type Err = Error;

    /// Paths may contain `[`; the region list starts at the last one.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |why: &str| Error::InvalidPointer(format!("{why} in '{s}'"));
        let mut parts = Vec::new();
        for raw in s.split(PART_SEPARATOR) {
            let body = raw.strip_suffix(']').ok_or_else(|| invalid("missing ']'"))?;
            let open = body.rfind('[').ok_or_else(|| invalid("missing '['"))?;
            let (path, list) = (&body[..open], &body[open + 1..]);
            if path.is_empty() {
                return Err(invalid("empty path"));
            }
            let regions = list
                .split(',')
                .map(|pair| {
                    let (start, end) = pair.split_once(':').ok_or_else(|| invalid("region without ':'"))?;
                    let start: usize = start.parse().map_err(|_| invalid("bad start offset"))?;
                    let end: usize = end.parse().map_err(|_| invalid("bad end offset"))?;
                    if end < start {
                        return Err(invalid("region ends before it starts"));
                    }
                    Ok(Region::new(start, end))
                })
                .collect::<Result<Vec<_>>>()?;
            parts.push(PointerPart { path: path.to_string(), regions });
        }
        Ok(Self { parts })
    }
}

/// Resolves the locators of one issue's units against its file group and
/// page cache.
pub struct PointerEncoder<'a> {
    files: &'a FileGroup,
    pages: &'a mut PageCache,
    /// Issue directory name, relative to the corpus root.
    issue_dir: &'a str,
    uri_schemes: &'a [String],
    prefix: &'a str,
}

impl<'a> PointerEncoder<'a> {
    pub fn new(
        files: &'a FileGroup,
        pages: &'a mut PageCache,
        issue_dir: &'a str,
        uri_schemes: &'a [String],
        prefix: &'a str,
    ) -> Self {
        Self { files, pages, issue_dir, uri_schemes, prefix }
    }

    /// Locators are grouped by the page they resolve to, so two file ids
    /// linking the same page share one part.
    pub fn encode(&mut self, locators: &[Locator]) -> Result<Pointer> {
        let mut groups: Vec<(String, Vec<&str>)> = Vec::new();
        for locator in locators {
            let fragment = files::resolve(&locator.file_id, self.files, self.uri_schemes)?;
            let rel = self.page_path(fragment);
            match groups.iter_mut().find(|(path, _)| *path == rel) {
                Some((_, blocks)) => blocks.push(locator.begin.as_str()),
                None => groups.push((rel, vec![locator.begin.as_str()])),
            }
        }

        let mut parts = Vec::with_capacity(groups.len());
        for (rel, blocks) in groups {
            let mut regions = blocks
                .into_iter()
                .map(|block| self.pages.region(&rel, block))
                .collect::<Result<Vec<_>>>()?;
            regions.sort_unstable();
            regions.dedup();
            parts.push(PointerPart { path: format!("{}{}", self.prefix, rel), regions });
        }
        Ok(Pointer { parts })
    }

    fn page_path(&self, fragment: &str) -> String {
        if self.issue_dir.is_empty() {
            fragment.to_string()
        } else {
            format!("{}/{}", self.issue_dir, fragment)
        }
    }
}
