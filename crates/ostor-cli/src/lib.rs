//! Command-line interface for administering an ostor cluster.
//!
//! This crate provides the command handlers used by the `ostor-admin`
//! binary, organized into command groups with clap's derive macros.
//!
//! # Architecture
//!
//! - **[`commands::AdminCommands`]** -- Top-level command enum dispatching
//!   to subgroups.
//! - **[`commands::group`]** -- Group status management (enable/disable).
//! - **[`commands::perf`]** -- Benchmark dispatcher: runs the requested
//!   kind(s) sequentially and collects each result through a single-slot
//!   handoff channel.
//!
//! Supporting modules:
//!
//! - **[`report`]** -- Normalized performance report: converters for the
//!   raw per-kind results and the aggregator producing one
//!   [`report::PerfTestOutput`].
//! - **[`archive`]** -- Zip archive builder (report + registration info).
//! - **[`portal`]** -- Support portal upload and the delivery router with
//!   its airgapped / upload-failure local-save fallback.
//! - **[`connection`]** -- Connection options and admin environment
//!   ([`AdminEnv`]).
//! - **[`output`]** -- Status-line / JSON output formatting ([`Printer`]).
//! - **[`progress`]** -- Stderr status lines for long-running benchmarks.

pub mod archive;
pub mod commands;
pub mod connection;
pub mod output;
pub mod portal;
pub mod progress;
pub mod report;

// Re-export the main types for convenience.
pub use commands::AdminCommands;
pub use connection::{AdminEnv, ConnectionOptions};
pub use output::{OutputFormat, Printer};
