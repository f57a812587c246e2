#![deny(dead_code)]
#![deny(unused_imports)]

pub mod cache;
pub mod config;
pub mod error;
pub mod files;
pub mod locate;
pub mod mets;
pub mod pointer;
pub mod traits;
pub mod types;
pub mod walker;
pub mod xml;

pub use error::{Error, ErrorKind, Result};
pub use pointer::Pointer;
pub use types::{ArticleRecord, Region};
pub use walker::CorpusWalker;
