//! # perfstat-plugins
//!
//! Metric plugins backed by `sysinfo`:
//! - `cpu`: total and per-core utilisation in percent
//! - `mem`: RAM and swap usage in MiB

mod cpu;
mod mem;
mod registry;

pub use cpu::CpuPlugin;
pub use mem::MemPlugin;
pub use registry::{active_plugins, PluginKind};
