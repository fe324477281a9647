//! Unified error types for perfstat

use thiserror::Error;

/// Unified error type for all perfstat operations
#[derive(Error, Debug)]
pub enum PerfstatError {
    // Startup errors
    #[error("Please specify at least one plugin")]
    NoPlugins,

    #[error("Terminal size unavailable: {0}")]
    TerminalSize(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // Plugin errors
    #[error("Plugin {plugin} returned {actual} values for {expected} columns")]
    PluginContract {
        plugin: String,
        expected: usize,
        actual: usize,
    },

    // Forwarding errors
    #[error("Forwarding failed: {0}")]
    Forward(String),

    #[error("Remote sink responded with status {0}")]
    RemoteStatus(u16),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using PerfstatError
pub type Result<T> = std::result::Result<T, PerfstatError>;
