//! File reference resolution: structural file ids to corpus-relative paths.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// The text file group of a structural document: file id -> stored link
/// (e.g. `file://./text/1534425_newspaper_lunion_1861-01-01_001-alto.xml`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileGroup {
    links: HashMap<String, String>,
}

impl FileGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file_id: impl Into<String>, link: impl Into<String>) {
        self.links.insert(file_id.into(), link.into());
    }

    pub fn link(&self, file_id: &str) -> Option<&str> {
        self.links.get(file_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Resolve `file_id` to a path fragment relative to its issue directory.
pub fn resolve<'a>(file_id: &str, group: &'a FileGroup, uri_schemes: &[String]) -> Result<&'a str> {
    let link = group
        .link(file_id)
        .ok_or_else(|| Error::UnknownFileId { file_id: file_id.to_string() })?;
    Ok(strip_scheme(link, uri_schemes))
}

/// Remove the longest matching scheme prefix, then any leading `./`.
pub fn strip_scheme<'a>(link: &'a str, uri_schemes: &[String]) -> &'a str {
    let rest = uri_schemes
        .iter()
        .filter_map(|scheme| link.strip_prefix(scheme.as_str()))
        .min_by_key(|rest| rest.len())
        .unwrap_or(link);
    rest.trim_start_matches("./")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schemes() -> Vec<String> {
        vec!["file://".to_string(), "file://./".to_string()]
    }

    #[test]
    fn strips_longest_scheme() {
        let mut group = FileGroup::new();
        group.insert("ALTO1", "file://./text/p1.xml");
        group.insert("ALTO2", "file://text/p2.xml");
        group.insert("ALTO3", "text/p3.xml");
        assert_eq!(resolve("ALTO1", &group, &schemes()).expect("alto1"), "text/p1.xml");
        assert_eq!(resolve("ALTO2", &group, &schemes()).expect("alto2"), "text/p2.xml");
        assert_eq!(resolve("ALTO3", &group, &schemes()).expect("alto3"), "text/p3.xml");
    }

    #[test]
    fn unknown_id_is_an_error() {
        let group = FileGroup::new();
        let err = resolve("ALTO404", &group, &schemes()).unwrap_err();
        assert!(matches!(err, Error::UnknownFileId { ref file_id } if file_id == "ALTO404"));
    }
}
