//! HTTP client for the remote collector
//!
//! One POST per snapshot to `http://<address>/<snapshot>/<source>` with a
//! JSON body. Any non-success status is an error; the body is never read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use perfstat_core::{PerfstatError, Result, Snapshot};
use reqwest::Url;
use serde::Serialize;
use std::time::Duration;

/// Destination for forwarded snapshots
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Deliver one snapshot, with no retry
    async fn store(&self, snapshot: &Snapshot) -> Result<()>;
}

/// Request body sent to the collector
#[derive(Debug, Serialize)]
pub struct StorePayload<'a> {
    pub snapshot: &'a str,
    pub source: &'a str,
    pub timestamp: DateTime<Utc>,
    pub columns: &'a [String],
    pub values: &'a [f64],
}

/// reqwest-backed sink for a perfkeeper-style collector
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    url: Url,
    snapshot: String,
    source: String,
}

impl HttpSink {
    /// Create a sink for `address` (host:port, optionally with a scheme)
    pub fn new(address: &str, snapshot: &str, source: &str, timeout: Duration) -> Result<Self> {
        let url = store_url(address, snapshot, source)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PerfstatError::Forward(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            snapshot: snapshot.to_string(),
            source: source.to_string(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl SnapshotSink for HttpSink {
    async fn store(&self, snapshot: &Snapshot) -> Result<()> {
        let payload = StorePayload {
            snapshot: &self.snapshot,
            source: &self.source,
            timestamp: snapshot.timestamp,
            columns: &snapshot.header,
            values: &snapshot.values,
        };

        tracing::debug!("Sending {} values to {}", payload.values.len(), self.url);

        let response = self
            .client
            .post(self.url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| PerfstatError::Forward(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PerfstatError::RemoteStatus(status.as_u16()));
        }
        Ok(())
    }
}

/// Build `<base>/<snapshot>/<source>` with percent-encoded labels
fn store_url(address: &str, snapshot: &str, source: &str) -> Result<Url> {
    let base = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    };

    let mut url = Url::parse(&base)
        .map_err(|e| PerfstatError::Config(format!("Invalid keeper address {}: {}", address, e)))?;
    url.path_segments_mut()
        .map_err(|_| PerfstatError::Config(format!("Keeper address {} cannot be a base", address)))?
        .pop_if_empty()
        .push(snapshot)
        .push(source);
    Ok(url)
}
