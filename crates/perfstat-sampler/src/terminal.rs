//! Terminal size probe
//!
//! The header repaint cadence depends on the terminal height, so failing to
//! resolve it is a startup error.

use crossterm::terminal;
use perfstat_core::{PerfstatError, Result};

/// Current height of the controlling terminal in rows
pub fn height() -> Result<u16> {
    let (_, rows) = terminal::size().map_err(|e| PerfstatError::TerminalSize(e.to_string()))?;
    if rows == 0 {
        return Err(PerfstatError::TerminalSize(
            "terminal reported zero rows".to_string(),
        ));
    }
    Ok(rows)
}
