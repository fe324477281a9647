//! # perfstat-sampler
//!
//! The sampling engine of perfstat.
//!
//! ```text
//! Scheduler ──tick──▶ Plugin::sample() × N ──▶ SampleContext row
//!                                               ├──▶ Reporter (stdout)
//!                                               └──▶ Forwarder (background)
//! ```

mod reporter;
mod scheduler;
pub mod terminal;

pub use reporter::{format_value, Reporter};
pub use scheduler::{Scheduler, SchedulerConfig};
