//! Domain types shared by the structural reader, the pointer encoder and the
//! record sinks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::files::FileGroup;

/// A half-open byte range `[start, end)` inside one page file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One `(BEGIN, FILEID)` pair of the structural map: the identifier of a
/// block inside the page file referenced by `file_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub begin: String,
    pub file_id: String,
}

impl Locator {
    pub fn new(begin: impl Into<String>, file_id: impl Into<String>) -> Self {
        Self { begin: begin.into(), file_id: file_id.into() }
    }
}

/// One addressable content item of an issue, usually an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalUnit {
    pub id: String,
    pub dmd_id: Option<String>,
    pub locators: Vec<Locator>,
}

impl LogicalUnit {
    /// Number used in the record id: the descriptive id minus `dmd_prefix`,
    /// or the unit id when the unit has no descriptive reference.
    pub fn unit_no<'a>(&'a self, dmd_prefix: &str) -> &'a str {
        match &self.dmd_id {
            Some(dmd) => dmd.strip_prefix(dmd_prefix).unwrap_or(dmd.as_str()),
            None => &self.id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptiveRecord {
    pub author: Vec<String>,
    pub title: Vec<String>,
    pub subtitle: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueMetadata {
    pub newspaper_title: Option<String>,
    pub newspaper_part: Option<String>,
    /// Normalized to `YYYY-MM-DDT00:00:00Z`.
    pub date: String,
}

/// A parsed structural (METS) document for one issue.
#[derive(Debug, Clone)]
pub struct StructuralDocument {
    pub units: Vec<LogicalUnit>,
    pub descriptive: HashMap<String, DescriptiveRecord>,
    pub files: FileGroup,
    pub issue: IssueMetadata,
}

impl StructuralDocument {
    /// Descriptive fields of `unit`; empty when the unit has no reference or
    /// the referenced section does not exist.
    pub fn descriptive_for(&self, unit: &LogicalUnit) -> DescriptiveRecord {
        unit.dmd_id
            .as_ref()
            .and_then(|id| self.descriptive.get(id))
            .cloned()
            .unwrap_or_default()
    }
}

/// The flat, index-ready record emitted per logical unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<String>,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newspaper_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newspaper_part: Option<String>,
    #[serde(default)]
    pub author: Vec<String>,
    #[serde(default)]
    pub title: Vec<String>,
    #[serde(default)]
    pub subtitle: Vec<String>,
    pub ocr_text: String,
}
