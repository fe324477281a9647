//! Integration tests for the sampling loop.
//!
//! These drive the scheduler for a bounded number of ticks with scripted
//! plugins and in-memory sinks, then inspect the rendered table and the
//! forwarded snapshots.

use async_trait::async_trait;
use perfstat_core::{Plugin, Result, Snapshot};
use perfstat_keeper::{Forwarder, ForwarderConfig, SnapshotSink};
use perfstat_sampler::{Reporter, Scheduler, SchedulerConfig};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

struct Scripted {
    name: String,
    columns: Vec<String>,
    values: Vec<f64>,
    delay: Duration,
}

impl Scripted {
    fn boxed(name: &str, columns: &[&str], values: &[f64]) -> Box<dyn Plugin> {
        Self::slow(name, columns, values, Duration::ZERO)
    }

    fn slow(name: &str, columns: &[&str], values: &[f64], delay: Duration) -> Box<dyn Plugin> {
        Box::new(Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values: values.to_vec(),
            delay,
        })
    }
}

impl Plugin for Scripted {
    fn name(&self) -> &str {
        &self.name
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn sample(&mut self) -> Vec<f64> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.values.clone()
    }
}

#[derive(Default)]
struct RecordingSink {
    snapshots: Mutex<Vec<Snapshot>>,
}

impl RecordingSink {
    fn count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }
}

#[async_trait]
impl SnapshotSink for RecordingSink {
    async fn store(&self, snapshot: &Snapshot) -> Result<()> {
        self.snapshots.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

/// Refuses every delivery after a long stall
struct StallingSink;

#[async_trait]
impl SnapshotSink for StallingSink {
    async fn store(&self, _snapshot: &Snapshot) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Err(perfstat_core::PerfstatError::Forward(
            "connection refused".to_string(),
        ))
    }
}

fn config(height: u16, count: u64) -> SchedulerConfig {
    SchedulerConfig {
        interval: Duration::from_millis(1),
        terminal_height: height,
        count: Some(count),
    }
}

fn output(scheduler: &Scheduler<Vec<u8>>) -> String {
    String::from_utf8(scheduler.reporter().unwrap().get_ref().clone()).unwrap()
}

async fn wait_for_count(sink: &RecordingSink, expected: usize) {
    for _ in 0..400 {
        if sink.count() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("expected {} snapshots, got {}", expected, sink.count());
}

#[tokio::test]
async fn test_single_plugin_repaints_header_per_screenful() {
    let plugins = vec![Scripted::boxed("cpu", &["cpu"], &[42.0])];
    let reporter = Reporter::new(Vec::new(), None);
    let mut scheduler = Scheduler::new(plugins, config(5, 4), Some(reporter), None).unwrap();

    scheduler.run().await.unwrap();

    assert_eq!(scheduler.ticks(), 4);
    assert_eq!(
        output(&scheduler),
        "cpu \n---\n 42 \n 42 \n 42 \ncpu \n---\n 42 \n"
    );
}

#[tokio::test]
async fn test_header_and_rows_follow_registration_order() {
    let plugins = vec![
        Scripted::slow("cpu", &["cpu"], &[12.5], Duration::from_millis(5)),
        Scripted::boxed("mem", &["mem", "swap_used"], &[2048.0, 0.0]),
    ];
    let reporter = Reporter::new(Vec::new(), None);
    let mut scheduler = Scheduler::new(plugins, config(24, 3), Some(reporter), None).unwrap();

    assert_eq!(scheduler.header(), ["cpu", "mem", "swap_used"]);
    scheduler.run().await.unwrap();

    let text = output(&scheduler);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2 + 3);
    assert_eq!(lines[0], "cpu mem swap_used ");
    assert_eq!(lines[1], "-".repeat(17));
    for row in &lines[2..] {
        assert_eq!(*row, "12.5 2048         0 ");
        assert_eq!(row.split_whitespace().count(), 3);
    }
    assert_eq!(scheduler.header(), ["cpu", "mem", "swap_used"]);
}

#[tokio::test]
async fn test_row_fields_are_at_least_label_width() {
    let header = ["cpu_total", "m", "load"];
    let plugins = vec![Scripted::boxed("mixed", &header, &[1.0, 123.25, 0.5])];
    let reporter = Reporter::new(Vec::new(), None);
    let mut scheduler = Scheduler::new(plugins, config(24, 1), Some(reporter), None).unwrap();

    scheduler.run().await.unwrap();

    let text = output(&scheduler);
    let row = text.lines().nth(2).unwrap();
    let fields: Vec<&str> = row.trim_end().split(' ').filter(|f| !f.is_empty()).collect();
    assert_eq!(fields, vec!["1", "123.25", "0.5"]);
    assert_eq!(row, "        1 123.25  0.5 ");
    for (label, field) in header.iter().zip(&fields) {
        assert!(row.contains(&format!("{:>width$} ", field, width = label.len())));
    }
}

#[tokio::test]
async fn test_quiet_mode_still_forwards_every_tick() {
    let sink = Arc::new(RecordingSink::default());
    let forwarder = Forwarder::spawn(sink.clone(), ForwarderConfig::default());
    let plugins = vec![Scripted::boxed("cpu", &["cpu"], &[42.0])];
    let mut scheduler =
        Scheduler::<Vec<u8>>::new(plugins, config(24, 5), None, Some(forwarder)).unwrap();

    scheduler.run().await.unwrap();
    assert!(scheduler.reporter().is_none());

    wait_for_count(&sink, 5).await;
    let snapshots = sink.snapshots.lock().unwrap();
    assert_eq!(snapshots.len(), 5);
    for snapshot in snapshots.iter() {
        assert_eq!(&*snapshot.header, ["cpu"]);
        assert_eq!(snapshot.values, vec![42.0]);
    }
}

#[tokio::test]
async fn test_snapshots_are_copies_of_each_row() {
    let sink = Arc::new(RecordingSink::default());
    let forwarder = Forwarder::spawn(sink.clone(), ForwarderConfig::default());
    let plugins = vec![
        Scripted::boxed("cpu", &["cpu"], &[1.0]),
        Scripted::boxed("mem", &["mem"], &[2.0]),
    ];
    let reporter = Reporter::new(Vec::new(), None);
    let mut scheduler =
        Scheduler::new(plugins, config(24, 3), Some(reporter), Some(forwarder)).unwrap();

    scheduler.run().await.unwrap();
    wait_for_count(&sink, 3).await;

    for snapshot in sink.snapshots.lock().unwrap().iter() {
        assert_eq!(snapshot.values, vec![1.0, 2.0]);
    }
    assert_eq!(output(&scheduler).lines().count(), 2 + 3);
}

#[tokio::test]
async fn test_failing_sink_does_not_disturb_sampling() {
    let forwarder = Forwarder::spawn(
        Arc::new(StallingSink),
        ForwarderConfig {
            workers: 1,
            queue_capacity: 1,
        },
    );
    let plugins = vec![Scripted::boxed("cpu", &["cpu"], &[7.0])];
    let reporter = Reporter::new(Vec::new(), None);
    let mut scheduler = Scheduler::new(
        plugins,
        SchedulerConfig {
            interval: Duration::from_millis(10),
            terminal_height: 24,
            count: Some(6),
        },
        Some(reporter),
        Some(forwarder),
    )
    .unwrap();

    let started = Instant::now();
    scheduler.run().await.unwrap();

    // Six ticks with five 10ms sleeps, nowhere near the sink's stall.
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(scheduler.ticks(), 6);
    assert_eq!(output(&scheduler).lines().filter(|l| *l == "  7 ").count(), 6);

    let stats = scheduler.forwarder().unwrap().stats();
    assert_eq!(stats.sent, 0);
    assert_eq!(stats.dropped, 4);
}

/// Takes a fixed time per delivery
#[derive(Default)]
struct SlowSink {
    stored: Mutex<Vec<Snapshot>>,
}

#[async_trait]
impl SnapshotSink for SlowSink {
    async fn store(&self, snapshot: &Snapshot) -> Result<()> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.stored.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

#[tokio::test]
async fn test_bounded_run_delivers_every_snapshot() {
    let sink = Arc::new(SlowSink::default());
    let forwarder = Forwarder::spawn(
        sink.clone(),
        ForwarderConfig {
            workers: 1,
            queue_capacity: 8,
        },
    );
    let plugins = vec![Scripted::boxed("cpu", &["cpu"], &[42.0])];
    let mut scheduler =
        Scheduler::<Vec<u8>>::new(plugins, config(24, 3), None, Some(forwarder)).unwrap();

    scheduler.run().await.unwrap();
    let stats = scheduler
        .take_forwarder()
        .unwrap()
        .shutdown(Duration::from_secs(5))
        .await;
    drop(scheduler);

    assert_eq!(stats.sent, 3);
    assert_eq!(stats.dropped, 0);
    assert_eq!(sink.stored.lock().unwrap().len(), 3);
}
