//! Corpus enumeration and per-issue record production.
//!
//! The corpus root holds one directory per issue. Each issue directory holds a
//! structural (METS) file and a page subfolder with the ALTO files it links
//! to. Issues are processed independently; every issue gets a fresh
//! [`PageCache`] that is dropped once its records are built.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::{DirEntry, WalkDir};

use crate::cache::PageCache;
use crate::config::IngestConfig;
use crate::error::{Error, Result};
use crate::mets;
use crate::pointer::PointerEncoder;
use crate::types::ArticleRecord;

/// A corpus child recognised as an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDir {
    /// Directory name, relative to the corpus root.
    pub dir_name: String,
    pub issue_id: String,
    pub path: PathBuf,
    /// `None` when a prefix-matched directory has no structural file.
    pub structural_file: Option<PathBuf>,
}

/// Result of processing one issue in [`CorpusWalker::process_parallel`].
#[derive(Debug)]
pub struct IssueOutcome {
    pub issue: IssueDir,
    pub records: Result<Vec<ArticleRecord>>,
}

pub struct CorpusWalker {
    config: IngestConfig,
}

impl CorpusWalker {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Lazily yields the records of every issue. Each call starts a fresh
    /// enumeration. An issue that fails yields one error and the walk moves
    /// on to the next issue.
    pub fn walk(&self) -> Walk<'_> {
        Walk { walker: self, entries: self.entries(), pending: VecDeque::new() }
    }

    /// All issue directories, in enumeration order.
    pub fn issue_dirs(&self) -> Result<Vec<IssueDir>> {
        let mut issues = Vec::new();
        for entry in self.entries() {
            if let Some(issue) = self.match_issue(entry?)? {
                issues.push(issue);
            }
        }
        Ok(issues)
    }

    /// Build the records of one issue. Errors carry the issue id, and the
    /// unit id when a unit could not be resolved.
    pub fn process_issue(&self, issue: &IssueDir) -> Result<Vec<ArticleRecord>> {
        self.build_records(issue).map_err(|e| e.in_issue(&issue.issue_id))
    }

    /// Process every issue on the rayon pool. Outcomes keep enumeration order.
    pub fn process_parallel(&self) -> Result<Vec<IssueOutcome>> {
        let issues = self.issue_dirs()?;
        let outcomes = issues
            .into_par_iter()
            .map(|issue| {
                let records = self.process_issue(&issue);
                if let Err(err) = &records {
                    tracing::warn!(issue = %issue.issue_id, error = %err, "issue failed");
                }
                IssueOutcome { issue, records }
            })
            .collect();
        Ok(outcomes)
    }

    fn entries(&self) -> walkdir::IntoIter {
        let walk = WalkDir::new(&self.config.corpus_root).min_depth(1).max_depth(1);
        if self.config.sort_issues { walk.sort_by_file_name().into_iter() } else { walk.into_iter() }
    }

    /// With an issue prefix configured, every matching directory is an issue
    /// and a missing structural file fails that issue later. Without one, only
    /// directories holding a structural file count.
    fn match_issue(&self, entry: DirEntry) -> Result<Option<IssueDir>> {
        let Some(dir_name) = entry.file_name().to_str() else {
            tracing::debug!(path = %entry.path().display(), "skipping non UTF-8 entry");
            return Ok(None);
        };
        // follows symlinked issue directories
        if !entry.path().is_dir() || !dir_name.starts_with(&self.config.issue_dir_prefix) {
            tracing::debug!(entry = %dir_name, "skipping entry");
            return Ok(None);
        }

        self.issue_at(dir_name, entry.path().to_path_buf())
    }

    fn issue_at(&self, dir_name: &str, path: PathBuf) -> Result<Option<IssueDir>> {
        let issue_id = dir_name.replace(&self.config.issue_id_strip, "");
        let structural = self.find_structural(&path).map_err(|e| e.in_issue(&issue_id))?;
        if structural.is_none() && self.config.issue_dir_prefix.is_empty() {
            tracing::debug!(entry = %dir_name, "no structural file, skipping");
            return Ok(None);
        }

        Ok(Some(IssueDir {
            dir_name: dir_name.to_string(),
            issue_id,
            structural_file: structural.map(|name| path.join(name)),
            path,
        }))
    }

    /// Lexicographically first file in `dir` ending with the structural suffix.
    fn find_structural(&self, dir: &Path) -> Result<Option<String>> {
        let mut structural: Option<String> = None;
        for child in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
            let child = child.map_err(|e| Error::io(dir, e))?;
            let Ok(name) = child.file_name().into_string() else { continue };
            if name.ends_with(&self.config.structural_suffix)
                && structural.as_ref().map_or(true, |current| name < *current)
                && child.path().is_file()
            {
                structural = Some(name);
            }
        }
        Ok(structural)
    }

    fn build_records(&self, issue: &IssueDir) -> Result<Vec<ArticleRecord>> {
        let page_dir = issue.path.join(&self.config.page_dir);
        if !page_dir.is_dir() {
            let missing = io::Error::new(io::ErrorKind::NotFound, "page folder missing");
            return Err(Error::io(page_dir, missing));
        }

        let Some(structural_file) = &issue.structural_file else {
            let reason = format!("no file ending in '{}'", self.config.structural_suffix);
            return Err(Error::io(&issue.path, io::Error::new(io::ErrorKind::NotFound, reason)));
        };

        let doc = mets::parse(structural_file, &self.config.mets)?;
        let mut pages = PageCache::new(&self.config.corpus_root);
        let mut records = Vec::with_capacity(doc.units.len());
        {
            let mut encoder = PointerEncoder::new(
                &doc.files,
                &mut pages,
                &issue.dir_name,
                &self.config.uri_schemes,
                &self.config.pointer_prefix,
            );
            for unit in &doc.units {
                let pointer = encoder.encode(&unit.locators).map_err(|e| e.in_unit(&unit.id))?;
                let descriptive = doc.descriptive_for(unit);
                records.push(ArticleRecord {
                    id: format!("{}-{}", issue.issue_id, unit.unit_no(&self.config.mets.unit_dmd_prefix)),
                    source: self.config.source.clone(),
                    issue_id: Some(issue.issue_id.clone()),
                    date: doc.issue.date.clone(),
                    newspaper_title: doc.issue.newspaper_title.clone(),
                    newspaper_part: doc.issue.newspaper_part.clone(),
                    author: descriptive.author,
                    title: descriptive.title,
                    subtitle: descriptive.subtitle,
                    ocr_text: pointer.to_string(),
                });
            }
        }
        tracing::info!(issue = %issue.issue_id, records = records.len(), pages = pages.len(), "processed issue");
        Ok(records)
    }
}

/// Iterator returned by [`CorpusWalker::walk`].
pub struct Walk<'a> {
    walker: &'a CorpusWalker,
    entries: walkdir::IntoIter,
    pending: VecDeque<ArticleRecord>,
}

impl Iterator for Walk<'_> {
    type Item = Result<ArticleRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(Ok(record));
            }
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(err.into())),
            };
            let issue = match self.walker.match_issue(entry) {
                Ok(Some(issue)) => issue,
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            };
            match self.walker.process_issue(&issue) {
                Ok(records) => self.pending.extend(records),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walker(root: &std::path::Path) -> CorpusWalker {
        CorpusWalker::new(IngestConfig {
            corpus_root: root.to_path_buf(),
            issue_dir_prefix: "newspaper_".into(),
            sort_issues: true,
            ..IngestConfig::default()
        })
    }

    #[test]
    fn prefix_decides_what_is_an_issue() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root = tmp.path();
        for dir in ["newspaper_lunion_1861-01-02", "newspaper_lunion_1861-01-01", "other", "newspaper_empty"] {
            fs::create_dir_all(root.join(dir)).expect("mkdir");
        }
        fs::write(root.join("newspaper_lunion_1861-01-01/b-mets.xml"), "").expect("write");
        fs::write(root.join("newspaper_lunion_1861-01-01/a-mets.xml"), "").expect("write");
        fs::write(root.join("newspaper_lunion_1861-01-02/x-mets.xml"), "").expect("write");
        fs::write(root.join("other/x-mets.xml"), "").expect("write");
        fs::write(root.join("newspaper_file-mets.xml"), "").expect("write");

        let issues = walker(root).issue_dirs().expect("issues");
        let ids: Vec<&str> = issues.iter().map(|i| i.issue_id.as_str()).collect();
        assert_eq!(ids, ["newspaper_empty", "1861-01-01", "1861-01-02"]);
        assert_eq!(issues[0].structural_file, None);
        assert_eq!(issues[1].structural_file, Some(root.join("newspaper_lunion_1861-01-01/a-mets.xml")));
        assert_eq!(issues[1].dir_name, "newspaper_lunion_1861-01-01");
    }

    #[test]
    fn prefixed_dir_without_structural_file_fails_its_issue() {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(tmp.path().join("newspaper_lunion_1861-01-09/text")).expect("mkdir");

        let results: Vec<_> = walker(tmp.path()).walk().collect();
        assert_eq!(results.len(), 1);
        let err = results.into_iter().next().expect("one").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Io);
        assert_eq!(err.context().and_then(|c| c.issue_id.as_deref()), Some("1861-01-09"));
    }

    #[test]
    fn without_prefix_dirs_lacking_structural_file_are_skipped() {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(tmp.path().join("newspaper_lunion_1861-01-09/text")).expect("mkdir");
        let walker = CorpusWalker::new(IngestConfig { corpus_root: tmp.path().to_path_buf(), ..IngestConfig::default() });
        assert_eq!(walker.walk().count(), 0);
        assert!(walker.issue_dirs().expect("issues").is_empty());
    }

    #[test]
    fn unreadable_issue_dir_carries_issue_id() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let walker = walker(tmp.path());
        let err = walker
            .issue_at("newspaper_lunion_1861-01-07", tmp.path().join("newspaper_lunion_1861-01-07"))
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Io);
        assert_eq!(err.context().and_then(|c| c.issue_id.as_deref()), Some("1861-01-07"));
    }

    #[test]
    fn missing_page_folder_is_an_io_error_for_the_issue() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = tmp.path().join("newspaper_lunion_1");
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(dir.join("1-mets.xml"), "<mets/>").expect("write");

        let walker = walker(tmp.path());
        let results: Vec<_> = walker.walk().collect();
        assert_eq!(results.len(), 1);
        let err = results.into_iter().next().expect("one").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Io);
        assert_eq!(err.context().and_then(|c| c.issue_id.as_deref()), Some("1"));
    }
}
