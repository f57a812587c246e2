//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` +
//! `config.<env>.toml` + `APP_*` env vars (nested keys separated by `__`,
//! e.g. `APP_INGEST__CORPUS_ROOT`). Provides helpers to expand `~` and
//! `${VAR}` and to resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Everything the binaries need, with documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ingest: IngestConfig,
    pub solr: SolrConfig,
    pub text_index: TextIndexConfig,
}

/// Corpus layout conventions and structural-metadata vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Directory holding one subdirectory per issue.
    pub corpus_root: PathBuf,
    /// Value of the `source` field of every record.
    pub source: String,
    /// Issue directories must start with this (empty accepts all).
    pub issue_dir_prefix: String,
    /// Removed from the directory name to form the issue id.
    pub issue_id_strip: String,
    /// File name suffix of the structural document inside an issue directory.
    pub structural_suffix: String,
    /// Page-file subfolder that must exist inside every issue directory.
    pub page_dir: String,
    /// Prepended to every path written into a pointer.
    pub pointer_prefix: String,
    /// Link prefixes stripped when resolving file references.
    pub uri_schemes: Vec<String>,
    /// Enumerate issue directories sorted by name instead of directory order.
    pub sort_issues: bool,
    pub mets: MetsProfile,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            corpus_root: PathBuf::from("./data/bnl_lunion"),
            source: "bnl_lunion".to_string(),
            issue_dir_prefix: String::new(),
            issue_id_strip: "newspaper_lunion_".to_string(),
            structural_suffix: "-mets.xml".to_string(),
            page_dir: "text".to_string(),
            pointer_prefix: String::new(),
            uri_schemes: vec!["file://./".to_string(), "file://".to_string()],
            sort_issues: false,
            mets: MetsProfile::default(),
        }
    }
}

/// Which METS/MODS sections carry what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetsProfile {
    /// `TYPE` of the logical `structMap`.
    pub logical_struct_type: String,
    /// `TYPE`s of the logical `div`s emitted as records.
    pub unit_types: Vec<String>,
    /// `USE` of the `fileGrp` holding the page text files.
    pub text_file_group: String,
    /// `ID` of the issue-level `dmdSec` (newspaper title, part, date).
    pub issue_dmd_id: String,
    /// Stripped from a unit's `DMDID` to form its record number.
    pub unit_dmd_prefix: String,
    /// `roleTerm` marking a `name` as an author.
    pub author_role: String,
}

impl Default for MetsProfile {
    fn default() -> Self {
        Self {
            logical_struct_type: "LOGICAL".to_string(),
            unit_types: vec!["ARTICLE".to_string()],
            text_file_group: "Text".to_string(),
            issue_dmd_id: "MODSMD_PRINT".to_string(),
            unit_dmd_prefix: "MODSMD_ARTICLE".to_string(),
            author_role: "aut".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolrConfig {
    /// `host:port` of the Solr server.
    pub host: String,
    pub core: String,
    pub soft_commit: bool,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for SolrConfig {
    fn default() -> Self {
        Self {
            host: "localhost:8983".to_string(),
            core: "ocr".to_string(),
            soft_commit: true,
            batch_size: 500,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextIndexConfig {
    pub index_dir: PathBuf,
}

impl Default for TextIndexConfig {
    fn default() -> Self {
        Self { index_dir: PathBuf::from("./data/indexes/tantivy") }
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self::from_figment(figment);
        config.settings()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    /// Typed settings with the corpus root expanded and validated.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.ingest.corpus_root = expand_path(settings.ingest.corpus_root.to_string_lossy());
        settings.text_index.index_dir = expand_path(settings.text_index.index_dir.to_string_lossy());
        settings.validate()?;
        Ok(settings)
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.ingest.structural_suffix.is_empty() {
            return Err(Error::InvalidConfig("ingest.structural_suffix must not be empty".into()));
        }
        if self.ingest.mets.unit_types.is_empty() {
            return Err(Error::InvalidConfig("ingest.mets.unit_types must name at least one div TYPE".into()));
        }
        if self.solr.batch_size == 0 {
            return Err(Error::InvalidConfig("solr.batch_size must be positive".into()));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
