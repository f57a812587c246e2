use crate::error::Result;
use crate::types::ArticleRecord;

/// Something that accepts batches of records, e.g. a Solr core or a local
/// full-text index.
pub trait RecordSink: Send + Sync {
    fn submit(&self, records: &[ArticleRecord]) -> Result<()>;
}

/// Submit `records` in batches of `batch_size`. On an upstream error the
/// records collected so far are submitted first, then the error is returned.
/// Returns the number of records submitted.
pub fn submit_in_batches<S, I>(sink: &S, records: I, batch_size: usize) -> Result<usize>
where
    S: RecordSink + ?Sized,
    I: IntoIterator<Item = Result<ArticleRecord>>,
{
    let batch_size = batch_size.max(1);
    let mut batch = Vec::with_capacity(batch_size);
    let mut submitted = 0usize;
    for record in records {
        match record {
            Ok(record) => batch.push(record),
            Err(err) => {
                if !batch.is_empty() {
                    sink.submit(&batch)?;
                    submitted += batch.len();
                }
                tracing::warn!(submitted, error = %err, "stopping submission");
                return Err(err);
            }
        }
        if batch.len() == batch_size {
            sink.submit(&batch)?;
            submitted += batch.len();
            batch.clear();
        }
    }
    if !batch.is_empty() {
        sink.submit(&batch)?;
        submitted += batch.len();
    }
    Ok(submitted)
}
