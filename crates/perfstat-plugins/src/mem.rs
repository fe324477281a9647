//! Memory usage plugin

use perfstat_core::Plugin;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

const MIB: u64 = 1024 * 1024;

const COLUMNS: [&str; 5] = ["mem_total", "mem_used", "mem_free", "mem_avail", "swap_used"];

/// Reports RAM and swap usage in MiB.
pub struct MemPlugin {
    sys: System,
    columns: Vec<String>,
}

impl MemPlugin {
    pub fn new() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::new().with_memory(MemoryRefreshKind::everything()),
        );
        Self {
            sys,
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Default for MemPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for MemPlugin {
    fn name(&self) -> &str {
        "mem"
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn sample(&mut self) -> Vec<f64> {
        self.sys.refresh_memory();

        vec![
            to_mib(self.sys.total_memory()),
            to_mib(self.sys.used_memory()),
            to_mib(self.sys.free_memory()),
            to_mib(self.sys.available_memory()),
            to_mib(self.sys.used_swap()),
        ]
    }
}

fn to_mib(bytes: u64) -> f64 {
    (bytes / MIB) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_matches_columns() {
        let mut plugin = MemPlugin::new();
        assert_eq!(plugin.columns(), COLUMNS);

        let values = plugin.sample();
        assert_eq!(values.len(), COLUMNS.len());
        assert!(values.iter().all(|v| *v >= 0.0));
        // used never exceeds total
        assert!(values[1] <= values[0]);
    }

    #[test]
    fn test_to_mib_truncates() {
        assert_eq!(to_mib(0), 0.0);
        assert_eq!(to_mib(3 * MIB + 17), 3.0);
    }
}
