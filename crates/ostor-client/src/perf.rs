//! Raw speed-test request and result structures.
//!
//! These are the wire shapes returned by the cluster's admin API for the
//! three benchmark kinds (object PUT/GET, drive, network). The CLI converts
//! them into its normalized report format; nothing here is interpreted
//! beyond JSON decoding.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request options
// ---------------------------------------------------------------------------

/// Options for the object PUT/GET speed test.
#[derive(Debug, Clone)]
pub struct SpeedTestOpts {
    /// Size of each test object in bytes.
    pub size: u64,

    /// Number of concurrent requests per server.
    pub concurrent: u32,

    /// How long the test runs.
    pub duration: Duration,

    /// Pre-created bucket to run against instead of a scratch bucket.
    pub bucket: Option<String>,
}

/// Options for the drive speed test.
#[derive(Debug, Clone)]
pub struct DriveTestOpts {
    /// Total amount of data read/written to each drive, in bytes.
    pub filesize: u64,

    /// Read/write block size in bytes.
    pub blocksize: u64,

    /// Run drives one-by-one instead of in parallel.
    pub serial: bool,
}

/// Options for the network speed test.
#[derive(Debug, Clone)]
pub struct NetTestOpts {
    /// How long the test runs.
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// Object test results
// ---------------------------------------------------------------------------

/// Response-time quantiles in nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    pub avg: u64,
    pub p50: u64,
    pub p99: u64,
    pub max: u64,
}

/// Per-server stats for one direction (PUT or GET) of the object test.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedTestStatServer {
    pub endpoint: String,

    /// Bytes per second.
    pub throughput_per_sec: u64,

    pub objects_per_sec: u64,

    /// Per-node error, empty when the node completed cleanly.
    #[serde(default)]
    pub err: String,
}

/// Aggregated stats for one direction of the object test.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedTestStats {
    /// Bytes per second across the whole cluster.
    pub throughput_per_sec: u64,

    pub objects_per_sec: u64,

    /// Response-time distribution.
    #[serde(default)]
    pub response: Timings,

    /// Time-to-first-byte distribution; only populated for GET.
    #[serde(default)]
    pub ttfb: Timings,

    #[serde(default)]
    pub servers: Vec<SpeedTestStatServer>,
}

/// Raw result of the object PUT/GET speed test.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedTestResult {
    /// Server version string.
    pub version: String,

    /// Number of servers that took part.
    pub servers: u32,

    /// Number of drives behind those servers.
    pub disks: u32,

    /// Object size used for the run, in bytes.
    pub size: u64,

    /// Concurrency per server used for the run.
    pub concurrent: u32,

    #[serde(rename = "PUTStats")]
    pub put_stats: SpeedTestStats,

    #[serde(rename = "GETStats")]
    pub get_stats: SpeedTestStats,
}

// ---------------------------------------------------------------------------
// Drive test results
// ---------------------------------------------------------------------------

/// Measured throughput for a single drive path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrivePerf {
    pub path: String,

    /// Read throughput in bytes per second.
    pub read_throughput: u64,

    /// Write throughput in bytes per second.
    pub write_throughput: u64,
}

/// Raw drive test result for one endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveSpeedTestResult {
    pub endpoint: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub perf: Vec<DrivePerf>,

    /// Per-node error, empty when the node completed cleanly.
    #[serde(default)]
    pub error: String,
}

// ---------------------------------------------------------------------------
// Network test results
// ---------------------------------------------------------------------------

/// Raw network test result for one node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetperfNodeResult {
    pub endpoint: String,

    /// Transmitted bytes per second.
    pub tx: u64,

    /// Received bytes per second.
    pub rx: u64,

    /// Per-node error, empty when the node completed cleanly.
    #[serde(default)]
    pub error: String,
}

/// Raw result of the network speed test across all nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetperfResult {
    #[serde(default)]
    pub node_results: Vec<NetperfNodeResult>,
}
