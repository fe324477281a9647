//! perfstat CLI - periodic metrics sampler
//!
//! Usage:
//!   perfstat --cpu --mem                      Print CPU and memory stats every second
//!   perfstat --cpu --interval 5 --count 12    Sample every 5s, one minute total
//!   perfstat --mem --quiet --snapshot run-1 --source host-a
//!                                             Forward samples without printing

use anyhow::{Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use perfstat_core::config::MAX_PRECISION;
use perfstat_core::{PerfstatConfig, PerfstatError};
use perfstat_keeper::Forwarder;
use perfstat_plugins::active_plugins;
use perfstat_sampler::{terminal, Reporter, Scheduler, SchedulerConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "perfstat")]
#[command(author, version, about = "Periodic CPU and memory sampler")]
struct Cli {
    /// Enable CPU stats
    #[arg(long)]
    cpu: bool,

    /// Enable memory stats
    #[arg(long)]
    mem: bool,

    /// Sampling interval in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Disable reporting to stdout
    #[arg(long)]
    quiet: bool,

    /// perfkeeper host:port
    #[arg(long, value_name = "HOST:PORT")]
    perfkeeper: Option<String>,

    /// Name of the perfkeeper snapshot
    #[arg(long)]
    snapshot: Option<String>,

    /// Name of the perfkeeper source
    #[arg(long)]
    source: Option<String>,

    /// Stop after this many samples
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    count: Option<u64>,

    /// Print values with a fixed number of decimals (at most 17)
    #[arg(long, value_parser = precision_parser())]
    precision: Option<usize>,

    /// Load settings from a TOML file (flags take precedence)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn precision_parser() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::new().range(0..=MAX_PRECISION as u64)
}

impl Cli {
    /// Layer flags over file settings
    fn apply(self, mut config: PerfstatConfig) -> PerfstatConfig {
        config.plugins.cpu |= self.cpu;
        config.plugins.mem |= self.mem;
        config.sampling.quiet |= self.quiet;

        if let Some(interval) = self.interval {
            config.sampling.interval_secs = interval;
        }
        if self.count.is_some() {
            config.sampling.count = self.count;
        }
        if self.precision.is_some() {
            config.sampling.precision = self.precision;
        }
        if let Some(address) = self.perfkeeper {
            config.keeper.address = address;
        }
        if self.snapshot.is_some() {
            config.keeper.snapshot = self.snapshot;
        }
        if self.source.is_some() {
            config.keeper.source = self.source;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the table
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli)?;
    run(config).await
}

fn load_config(cli: Cli) -> Result<PerfstatConfig> {
    let file_config = match &cli.config {
        Some(path) => PerfstatConfig::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => PerfstatConfig::default(),
    };

    let config = cli.apply(file_config);
    config.validate()?;
    Ok(config)
}

async fn run(config: PerfstatConfig) -> Result<()> {
    let plugins = active_plugins(&config.plugins);
    if plugins.is_empty() {
        return Err(PerfstatError::NoPlugins.into());
    }

    let terminal_height = terminal::height()?;
    info!("Terminal height is {} rows", terminal_height);

    let forwarder = Forwarder::from_config(&config.keeper)?;

    let reporter = if config.sampling.quiet {
        None
    } else {
        Some(Reporter::stdout(config.sampling.precision))
    };

    let mut scheduler = Scheduler::new(
        plugins,
        SchedulerConfig {
            interval: Duration::from_secs(config.sampling.interval_secs),
            terminal_height,
            count: config.sampling.count,
        },
        reporter,
        forwarder,
    )?;

    scheduler.run().await?;

    // Only a bounded run gets here; give the last snapshots a chance to land.
    if let Some(forwarder) = scheduler.take_forwarder() {
        let grace = Duration::from_secs(config.keeper.timeout_secs);
        let stats = forwarder.shutdown(grace).await;
        info!(
            "Forwarded {} snapshots ({} failed, {} dropped)",
            stats.sent, stats.failed, stats.dropped
        );
    }
    Ok(())
}
