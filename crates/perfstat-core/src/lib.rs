//! # perfstat-core
//!
//! Core types for the perfstat periodic metrics sampler.
//!
//! perfstat samples a fixed, ordered set of plugins at a fixed interval,
//! renders each sample as a row of an aligned table and optionally forwards
//! it to a remote collector.
//!
//! ## Core Paradigm
//!
//! - The header is the concatenation of every active plugin's columns
//! - A row holds exactly one value per header column, in header order
//! - A snapshot is an owned copy of (header, row) for a single tick

pub mod config;
mod error;
pub mod fail_open;
mod plugin;
mod types;

pub use config::{KeeperConfig, PerfstatConfig, PluginSelection, SamplingConfig};
pub use error::{PerfstatError, Result};
pub use plugin::Plugin;
pub use types::{SampleContext, Snapshot};
