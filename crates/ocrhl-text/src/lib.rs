//! ocrhl-text
//!
//! Local tantivy index of article records. `index` writes records (it is a
//! `RecordSink`), `search` queries the descriptive fields and hands back the
//! stored pointers.
pub mod tantivy_utils;
pub mod index;
pub mod search;

pub use index::TantivyRecordIndex;
pub use search::{RecordHit, RecordSearchEngine};
