//! Builds the active plugin set from the configured selection

use crate::{CpuPlugin, MemPlugin};
use perfstat_core::{Plugin, PluginSelection};
use tracing::debug;

/// Known plugin families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    Cpu,
    Mem,
}

impl PluginKind {
    /// Every family in registration order
    pub const ALL: [PluginKind; 2] = [PluginKind::Cpu, PluginKind::Mem];

    pub fn is_selected(self, selection: &PluginSelection) -> bool {
        match self {
            PluginKind::Cpu => selection.cpu,
            PluginKind::Mem => selection.mem,
        }
    }

    pub fn build(self) -> Box<dyn Plugin> {
        match self {
            PluginKind::Cpu => Box::new(CpuPlugin::new()),
            PluginKind::Mem => Box::new(MemPlugin::new()),
        }
    }
}

/// Instantiate the selected plugins, cpu before mem
pub fn active_plugins(selection: &PluginSelection) -> Vec<Box<dyn Plugin>> {
    PluginKind::ALL
        .into_iter()
        .filter(|kind| kind.is_selected(selection))
        .map(|kind| {
            let plugin = kind.build();
            debug!(
                "Registered plugin {} with {} columns",
                plugin.name(),
                plugin.columns().len()
            );
            plugin
        })
        .collect()
}
