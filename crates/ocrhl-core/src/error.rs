use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::locate::RegionMiss;

/// Coarse classification of [`Error`], stable across context wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedStructure,
    UnknownFileId,
    RegionNotFound,
    IndexSubmission,
    Transport,
    LocalIndex,
    Io,
    InvalidPointer,
    InvalidConfig,
}

/// Where in the corpus a failure happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    pub issue_id: Option<String>,
    pub unit_id: Option<String>,
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.issue_id, &self.unit_id) {
            (Some(issue), Some(unit)) => write!(f, "issue {issue}, unit {unit}"),
            (Some(issue), None) => write!(f, "issue {issue}"),
            (None, Some(unit)) => write!(f, "unit {unit}"),
            (None, None) => f.write_str("corpus"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed structure in {}: {reason}", .path.display())]
    MalformedStructure { path: PathBuf, reason: String },

    #[error("Unknown file id '{file_id}'")]
    UnknownFileId { file_id: String },

    #[error("Region '{identifier}' not found in {file}: {miss}")]
    RegionNotFound {
        file: String,
        identifier: String,
        miss: RegionMiss,
    },

    /// The index rejected a batch. Carries the decoded response and the
    /// rejected payload so the caller can retry or inspect it.
    #[error("Index submission rejected with status {status}")]
    IndexSubmission {
        status: u16,
        response: serde_json::Value,
        payload: serde_json::Value,
    },

    #[error("Index endpoint {endpoint} unreachable: {message}")]
    Transport { endpoint: String, message: String },

    #[error("Local index at {} failed: {message}", .path.display())]
    LocalIndex { path: PathBuf, message: String },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pointer: {0}")]
    InvalidPointer(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{context}: {source}")]
    Context {
        context: ErrorContext,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedStructure { .. } => ErrorKind::MalformedStructure,
            Error::UnknownFileId { .. } => ErrorKind::UnknownFileId,
            Error::RegionNotFound { .. } => ErrorKind::RegionNotFound,
            Error::IndexSubmission { .. } => ErrorKind::IndexSubmission,
            Error::Transport { .. } => ErrorKind::Transport,
            Error::LocalIndex { .. } => ErrorKind::LocalIndex,
            Error::Io { .. } => ErrorKind::Io,
            Error::InvalidPointer(_) => ErrorKind::InvalidPointer,
            Error::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Error::Context { source, .. } => source.kind(),
        }
    }

    /// The innermost error, with all context layers removed.
    pub fn root(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Context { context, .. } => Some(context),
            _ => None,
        }
    }

    pub fn in_issue(self, issue_id: &str) -> Self {
        self.with_context(|ctx| {
            ctx.issue_id.get_or_insert_with(|| issue_id.to_string());
        })
    }

    pub fn in_unit(self, unit_id: &str) -> Self {
        self.with_context(|ctx| {
            ctx.unit_id.get_or_insert_with(|| unit_id.to_string());
        })
    }

    fn with_context(self, fill: impl FnOnce(&mut ErrorContext)) -> Self {
        match self {
            Error::Context { mut context, source } => {
                fill(&mut context);
                Error::Context { context, source }
            }
            other => {
                let mut context = ErrorContext::default();
                fill(&mut context);
                Error::Context { context, source: Box::new(other) }
            }
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::MalformedStructure { path: path.into(), reason: reason.into() }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop while walking corpus"));
        Error::Io { path, source }
    }
}
