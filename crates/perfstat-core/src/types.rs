//! Header, row and snapshot types shared by the sampler and the keeper

use crate::{PerfstatError, Plugin, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Header and row buffer for the current tick.
///
/// The header is fixed when the context is built and never changes. The row
/// is filled plugin by plugin during a tick and cleared before the next one.
#[derive(Debug, Clone)]
pub struct SampleContext {
    header: Arc<[String]>,
    row: Vec<f64>,
}

impl SampleContext {
    /// Build the header from plugins in registration order
    pub fn from_plugins(plugins: &[Box<dyn Plugin>]) -> Self {
        let header: Vec<String> = plugins
            .iter()
            .flat_map(|p| p.columns().iter().cloned())
            .collect();
        let row = Vec::with_capacity(header.len());
        Self {
            header: header.into(),
            row,
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn row(&self) -> &[f64] {
        &self.row
    }

    /// Append one plugin's output, enforcing the column count contract
    pub fn append(&mut self, plugin: &str, expected: usize, values: &[f64]) -> Result<()> {
        if values.len() != expected {
            return Err(PerfstatError::PluginContract {
                plugin: plugin.to_string(),
                expected,
                actual: values.len(),
            });
        }
        self.row.extend_from_slice(values);
        Ok(())
    }

    /// True once the row holds a value for every header column
    pub fn is_complete(&self) -> bool {
        self.row.len() == self.header.len()
    }

    /// Copy the finalized row into an owned snapshot
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(Arc::clone(&self.header), self.row.clone())
    }

    pub fn clear(&mut self) {
        self.row.clear();
    }
}

/// One (header, row) pair handed to the remote sink.
///
/// Owns its values so the sampler can reuse its row buffer immediately.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub header: Arc<[String]>,
    pub values: Vec<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Snapshot {
    /// Stamp `values` with the current time
    pub fn new(header: impl Into<Arc<[String]>>, values: Vec<f64>) -> Self {
        Self {
            header: header.into(),
            values,
            timestamp: Utc::now(),
        }
    }
}
