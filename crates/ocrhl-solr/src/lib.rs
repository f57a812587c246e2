//! ocrhl-solr
//!
//! Posts article records to a Solr core's JSON update handler.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use ocrhl_core::config::SolrConfig;
use ocrhl_core::traits::RecordSink;
use ocrhl_core::{ArticleRecord, Error, Result};

pub struct SolrClient {
    client: Client,
    update_url: String,
}

impl SolrClient {
    pub fn new(config: &SolrConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, update_url: update_url(config) })
    }

    pub fn update_url(&self) -> &str {
        &self.update_url
    }

    fn transport(&self, message: impl ToString) -> Error {
        Error::Transport { endpoint: self.update_url.clone(), message: message.to_string() }
    }
}

/// `http://<host>/solr/<core>/update`, with `softCommit=true` when enabled.
/// A host that already carries a scheme is used as is.
pub fn update_url(config: &SolrConfig) -> String {
    let host = config.host.trim_end_matches('/');
    let base = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };
    let mut url = format!("{}/solr/{}/update", base, config.core);
    if config.soft_commit {
        url.push_str("?softCommit=true");
    }
    url
}

impl RecordSink for SolrClient {
    fn submit(&self, records: &[ArticleRecord]) -> Result<()> {
        let payload = serde_json::to_value(records).map_err(|e| self.transport(format!("encoding batch: {}", e)))?;
        let response = self
            .client
            .post(&self.update_url)
            .json(&payload)
            .send()
            .map_err(|e| self.transport(e))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().map_err(|e| self.transport(e))?;
            let response = serde_json::from_str(&body).unwrap_or(Value::String(body));
            return Err(Error::IndexSubmission { status: status.as_u16(), response, payload });
        }
        tracing::debug!(records = records.len(), status = status.as_u16(), "batch accepted");
        Ok(())
    }
}
