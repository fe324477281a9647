//! Configuration management for perfstat
//!
//! Settings can come from an optional TOML file; every field has a default so
//! an empty or missing file is valid. The CLI layers its flags on top.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{PerfstatError, Result};

/// Most decimals `f64` can carry meaningfully
pub const MAX_PRECISION: usize = 17;

/// Top-level perfstat configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerfstatConfig {
    /// Tick cadence and rendering
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Plugin families to enable
    #[serde(default)]
    pub plugins: PluginSelection,

    /// Remote collector settings
    #[serde(default)]
    pub keeper: KeeperConfig,
}

/// Sampling loop parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Seconds between ticks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Disable terminal rendering
    #[serde(default)]
    pub quiet: bool,

    /// Fixed number of decimals for rendered values
    #[serde(default)]
    pub precision: Option<usize>,

    /// Stop after this many ticks
    #[serde(default)]
    pub count: Option<u64>,
}

/// Enabled plugin families
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSelection {
    #[serde(default)]
    pub cpu: bool,

    #[serde(default)]
    pub mem: bool,
}

/// Remote collector ("keeper") configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeeperConfig {
    /// host:port of the collector
    #[serde(default = "default_address")]
    pub address: String,

    /// Data series label on the collector
    #[serde(default)]
    pub snapshot: Option<String>,

    /// Originating host/process label
    #[serde(default)]
    pub source: Option<String>,

    /// Delivery workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Snapshots waiting for a worker before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Default value providers
fn default_interval_secs() -> u64 {
    1
}

fn default_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_workers() -> usize {
    2
}

fn default_queue_capacity() -> usize {
    16
}

fn default_timeout_secs() -> u64 {
    5
}

impl PerfstatConfig {
    /// Load configuration from `path`, which must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            PerfstatError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load configuration from `path` or use defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values the sampler cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.sampling.interval_secs == 0 {
            return Err(PerfstatError::Config(
                "sampling interval must be at least 1 second".to_string(),
            ));
        }
        if self
            .sampling
            .precision
            .is_some_and(|digits| digits > MAX_PRECISION)
        {
            return Err(PerfstatError::Config(format!(
                "sampling.precision must be at most {}",
                MAX_PRECISION
            )));
        }
        if self.keeper.workers == 0 {
            return Err(PerfstatError::Config(
                "keeper.workers must be at least 1".to_string(),
            ));
        }
        if self.keeper.queue_capacity == 0 {
            return Err(PerfstatError::Config(
                "keeper.queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.keeper.timeout_secs == 0 {
            return Err(PerfstatError::Config(
                "keeper.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl KeeperConfig {
    /// Snapshot and source names, only when both are set
    pub fn forwarding(&self) -> Option<(&str, &str)> {
        let snapshot = self.snapshot.as_deref().map(str::trim)?;
        let source = self.source.as_deref().map(str::trim)?;
        if snapshot.is_empty() || source.is_empty() {
            return None;
        }
        Some((snapshot, source))
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            quiet: false,
            precision: None,
            count: None,
        }
    }
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            snapshot: None,
            source: None,
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
