//! Fixed-interval sampling loop
//!
//! Each tick samples every plugin in registration order, hands an owned
//! snapshot to the forwarder, renders the row and reprints the header once
//! per screenful. The sleep runs after the tick's work, so slow plugins
//! stretch the effective period; there is no drift correction.

use crate::Reporter;
use perfstat_core::{PerfstatError, Plugin, Result, SampleContext};
use perfstat_keeper::Forwarder;
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

/// Loop parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Sleep between ticks
    pub interval: Duration,
    /// Terminal height in rows
    pub terminal_height: u16,
    /// Stop after this many ticks
    pub count: Option<u64>,
}

/// Drives plugins, reporter and forwarder
pub struct Scheduler<W: Write> {
    plugins: Vec<Box<dyn Plugin>>,
    context: SampleContext,
    reporter: Option<Reporter<W>>,
    forwarder: Option<Forwarder>,
    config: SchedulerConfig,
    /// Header repaint period; 0 disables repaint
    repaint_every: usize,
    /// Lines printed under the current header, starting at 1
    lines: usize,
    ticks: u64,
}

impl<W: Write> Scheduler<W> {
    /// Build a scheduler over a fixed plugin set.
    ///
    /// `reporter` is `None` in quiet mode, `forwarder` is `None` unless
    /// forwarding is configured.
    pub fn new(
        plugins: Vec<Box<dyn Plugin>>,
        config: SchedulerConfig,
        reporter: Option<Reporter<W>>,
        forwarder: Option<Forwarder>,
    ) -> Result<Self> {
        if plugins.is_empty() {
            return Err(PerfstatError::NoPlugins);
        }

        let context = SampleContext::from_plugins(&plugins);
        // With fewer than two rows there is no room for a repaint cycle.
        let period = usize::from(config.terminal_height.saturating_sub(1));
        let repaint_every = if period >= 2 { period } else { 0 };

        Ok(Self {
            plugins,
            context,
            reporter,
            forwarder,
            config,
            repaint_every,
            lines: 1,
            ticks: 0,
        })
    }

    pub fn header(&self) -> &[String] {
        self.context.header()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn reporter(&self) -> Option<&Reporter<W>> {
        self.reporter.as_ref()
    }

    pub fn forwarder(&self) -> Option<&Forwarder> {
        self.forwarder.as_ref()
    }

    /// Detach the forwarder, e.g. to drain it with `Forwarder::shutdown`
    pub fn take_forwarder(&mut self) -> Option<Forwarder> {
        self.forwarder.take()
    }

    /// Run until the process is terminated, or `count` ticks
    pub async fn run(&mut self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run until `stop` resolves, or `count` ticks
    pub async fn run_until<F>(&mut self, stop: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!(
            "Sampling {} columns every {:?}",
            self.context.header().len(),
            self.config.interval
        );
        tokio::pin!(stop);

        self.render_header()?;
        loop {
            self.tick()?;

            if self.config.count.is_some_and(|count| self.ticks >= count) {
                debug!("Reached {} ticks, stopping", self.ticks);
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = &mut stop => {
                    debug!("Stop requested after {} ticks", self.ticks);
                    break;
                }
            }
        }
        Ok(())
    }

    /// Execute one sampling cycle
    pub fn tick(&mut self) -> Result<()> {
        self.context.clear();
        for plugin in &mut self.plugins {
            let values = plugin.sample();
            self.context
                .append(plugin.name(), plugin.columns().len(), &values)?;
        }

        if let Some(forwarder) = &self.forwarder {
            forwarder.dispatch(self.context.snapshot());
        }

        if let Some(reporter) = &mut self.reporter {
            reporter.render_row(self.context.header(), self.context.row())?;
        }
        self.context.clear();
        self.ticks += 1;

        self.lines += 1;
        if self.repaint_every > 0 && self.lines >= self.repaint_every {
            self.render_header()?;
            self.lines = 1;
        }

        debug!("Tick {} complete", self.ticks);
        Ok(())
    }

    fn render_header(&mut self) -> Result<()> {
        if let Some(reporter) = &mut self.reporter {
            reporter.render_header(self.context.header())?;
        }
        Ok(())
    }
}
