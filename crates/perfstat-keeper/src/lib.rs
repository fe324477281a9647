//! # perfstat-keeper
//!
//! Fire-and-forget delivery of samples to a remote collector.
//!
//! This crate provides:
//! - The `SnapshotSink` seam and its HTTP implementation
//! - A bounded `Forwarder` worker pool that never blocks the sampler

mod client;
mod forwarder;

pub use client::{HttpSink, SnapshotSink, StorePayload};
pub use forwarder::{Forwarder, ForwarderConfig, ForwarderStats};
