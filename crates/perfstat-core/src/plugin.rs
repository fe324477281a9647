//! Capability contract for metric sources

/// A family of metrics sampled once per tick.
///
/// Implementations must keep `columns()` stable for their whole lifetime and
/// return exactly one value per column from `sample()`, in column order.
/// Sampling failures are resolved inside the plugin, typically by reporting
/// a sentinel value.
pub trait Plugin: Send {
    /// Short name used in diagnostics
    fn name(&self) -> &str;

    /// Ordered metric names reported by this plugin
    fn columns(&self) -> &[String];

    /// Take one instantaneous measurement per column
    fn sample(&mut self) -> Vec<f64>;
}
