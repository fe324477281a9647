//! CPU utilisation plugin

use perfstat_core::Plugin;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

/// Reports `cpu_total` followed by one `cpu_<n>` column per logical core.
///
/// The core list is captured at construction so the column set stays fixed
/// for the lifetime of the plugin.
pub struct CpuPlugin {
    sys: System,
    columns: Vec<String>,
}

impl CpuPlugin {
    pub fn new() -> Self {
        let mut sys =
            System::new_with_specifics(RefreshKind::new().with_cpu(CpuRefreshKind::everything()));
        // Usage is a delta between refreshes; prime the baseline.
        sys.refresh_cpu_usage();

        let mut columns = vec!["cpu_total".to_string()];
        columns.extend((0..sys.cpus().len()).map(|n| format!("cpu_{}", n)));

        Self { sys, columns }
    }
}

impl Default for CpuPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for CpuPlugin {
    fn name(&self) -> &str {
        "cpu"
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn sample(&mut self) -> Vec<f64> {
        self.sys.refresh_cpu_usage();

        let cores = self.columns.len() - 1;
        let mut values = Vec::with_capacity(self.columns.len());
        values.push(round1(self.sys.global_cpu_usage()));
        // A core that disappeared reports NaN instead of shifting the columns.
        values.extend((0..cores).map(|n| {
            self.sys
                .cpus()
                .get(n)
                .map(|cpu| round1(cpu.cpu_usage()))
                .unwrap_or(f64::NAN)
        }));
        values
    }
}

fn round1(percent: f32) -> f64 {
    (f64::from(percent) * 10.0).round() / 10.0
}
