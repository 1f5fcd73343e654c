//! Normalized performance report.
//!
//! The admin API returns a differently-shaped raw structure per benchmark
//! kind; this module folds them into the single [`PerfTestOutput`] report
//! that gets archived and uploaded. The converters are pure, total mappings:
//! absent input yields an absent sub-report, numeric fields are copied
//! verbatim, and per-server lists keep their order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use ostor_client::perf::{
    DrivePerf, DriveSpeedTestResult, NetperfResult, SpeedTestResult, SpeedTestStatServer,
    SpeedTestStats, Timings,
};

// ---------------------------------------------------------------------------
// Test kinds and per-test results
// ---------------------------------------------------------------------------

/// One benchmark kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerfTestKind {
    Net,
    Drive,
    Object,
}

impl PerfTestKind {
    /// The fixed order used when no explicit kind is requested.
    pub fn default_order() -> [PerfTestKind; 3] {
        [PerfTestKind::Net, PerfTestKind::Drive, PerfTestKind::Object]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PerfTestKind::Net => "net",
            PerfTestKind::Drive => "drive",
            PerfTestKind::Object => "object",
        }
    }
}

impl fmt::Display for PerfTestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PerfTestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "net" => Ok(PerfTestKind::Net),
            "drive" => Ok(PerfTestKind::Drive),
            "object" => Ok(PerfTestKind::Object),
            other => Err(format!("unknown test kind '{}'", other)),
        }
    }
}

/// The outcome of one benchmark invocation, tagged by kind.
///
/// The kind set is closed, so the aggregator matches exhaustively; an
/// "unrecognized kind" cannot be represented. A `None` payload together with
/// an error string means the invocation failed at the dispatch level (e.g.
/// the admin call itself errored) rather than per node.
#[derive(Debug, Clone)]
pub enum PerfTestResult {
    Object {
        result: Option<SpeedTestResult>,
        error: Option<String>,
    },
    Net {
        result: Option<NetperfResult>,
        error: Option<String>,
    },
    Drive {
        result: Option<Vec<DriveSpeedTestResult>>,
        error: Option<String>,
    },
}

impl PerfTestResult {
    pub fn kind(&self) -> PerfTestKind {
        match self {
            PerfTestResult::Object { .. } => PerfTestKind::Object,
            PerfTestResult::Net { .. } => PerfTestKind::Net,
            PerfTestResult::Drive { .. } => PerfTestKind::Drive,
        }
    }
}

// ---------------------------------------------------------------------------
// Normalized report structures
// ---------------------------------------------------------------------------

/// The final output of the performance test(s).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerfTestOutput {
    #[serde(rename = "object", default, skip_serializing_if = "Option::is_none")]
    pub object_results: Option<ObjTestResults>,

    #[serde(rename = "network", default, skip_serializing_if = "Option::is_none")]
    pub net_results: Option<NetTestResults>,

    #[serde(rename = "drive", default, skip_serializing_if = "Option::is_none")]
    pub drive_results: Option<DriveTestResults>,

    #[serde(rename = "error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Drive test result for one endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriveTestResult {
    pub endpoint: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub perf: Vec<DrivePerf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Drive test results across all endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriveTestResults {
    #[serde(rename = "servers")]
    pub results: Vec<DriveTestResult>,
}

/// Object performance stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjStats {
    pub throughput: u64,
    pub objects_per_sec: u64,
}

/// Server-level object performance stats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjStatServer {
    pub endpoint: String,

    pub perf: ObjStats,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// PUT stats aggregated over all servers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjPutStats {
    pub throughput: u64,
    pub objects_per_sec: u64,
    #[serde(rename = "responseTime")]
    pub response: Timings,
}

/// GET stats extend the PUT stats with a time-to-first-byte metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjGetStats {
    #[serde(flatten)]
    pub put: ObjPutStats,

    pub ttfb: Timings,
}

/// Object PUT performance results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjPutPerfResults {
    pub perf: ObjPutStats,
    pub servers: Vec<ObjStatServer>,
}

/// Object GET performance results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjGetPerfResults {
    pub perf: ObjGetStats,
    pub servers: Vec<ObjStatServer>,
}

/// Result of the object performance test.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjTestResults {
    #[serde(rename = "objectSize")]
    pub object_size: u64,

    pub threads: u32,

    #[serde(rename = "PUT")]
    pub put_results: ObjPutPerfResults,

    #[serde(rename = "GET")]
    pub get_results: ObjGetPerfResults,
}

/// Network performance stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetStats {
    pub tx: u64,
    pub rx: u64,
}

/// Network test result for one endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetTestResult {
    pub endpoint: String,

    pub perf: NetStats,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Network test results across all endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetTestResults {
    #[serde(rename = "servers")]
    pub results: Vec<NetTestResult>,
}

// ---------------------------------------------------------------------------
// Converters
// ---------------------------------------------------------------------------

fn optional_error(err: &str) -> Option<String> {
    if err.is_empty() {
        None
    } else {
        Some(err.to_string())
    }
}

fn convert_drive_result(dr: &DriveSpeedTestResult) -> DriveTestResult {
    DriveTestResult {
        endpoint: dr.endpoint.clone(),
        perf: dr.perf.clone(),
        error: optional_error(&dr.error),
    }
}

/// Convert the raw drive results; absent input yields an absent sub-report.
pub fn convert_drive_results(
    drive_results: Option<&[DriveSpeedTestResult]>,
) -> Option<DriveTestResults> {
    drive_results.map(|results| DriveTestResults {
        results: results.iter().map(convert_drive_result).collect(),
    })
}

/// Convert the raw network result; absent input yields an absent sub-report.
pub fn convert_net_results(net_results: Option<&NetperfResult>) -> Option<NetTestResults> {
    net_results.map(|net| NetTestResults {
        results: net
            .node_results
            .iter()
            .map(|nr| NetTestResult {
                endpoint: nr.endpoint.clone(),
                perf: NetStats { tx: nr.tx, rx: nr.rx },
                error: optional_error(&nr.error),
            })
            .collect(),
    })
}

fn convert_stat_servers(servers: &[SpeedTestStatServer]) -> Vec<ObjStatServer> {
    servers
        .iter()
        .map(|s| ObjStatServer {
            endpoint: s.endpoint.clone(),
            perf: ObjStats {
                throughput: s.throughput_per_sec,
                objects_per_sec: s.objects_per_sec,
            },
            error: optional_error(&s.err),
        })
        .collect()
}

fn convert_put_stats(stats: &SpeedTestStats) -> ObjPutStats {
    ObjPutStats {
        throughput: stats.throughput_per_sec,
        objects_per_sec: stats.objects_per_sec,
        response: stats.response,
    }
}

fn convert_put_results(stats: &SpeedTestStats) -> ObjPutPerfResults {
    ObjPutPerfResults {
        perf: convert_put_stats(stats),
        servers: convert_stat_servers(&stats.servers),
    }
}

/// The GET conversion composes the PUT conversion and appends TTFB.
fn convert_get_results(stats: &SpeedTestStats) -> ObjGetPerfResults {
    ObjGetPerfResults {
        perf: ObjGetStats {
            put: convert_put_stats(stats),
            ttfb: stats.ttfb,
        },
        servers: convert_stat_servers(&stats.servers),
    }
}

/// Convert the raw object result; absent input yields an absent sub-report.
pub fn convert_object_results(obj_result: Option<&SpeedTestResult>) -> Option<ObjTestResults> {
    obj_result.map(|result| ObjTestResults {
        object_size: result.size,
        threads: result.concurrent,
        put_results: convert_put_results(&result.put_stats),
        get_results: convert_get_results(&result.get_stats),
    })
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

impl PerfTestOutput {
    /// Fold one tagged result into the report.
    ///
    /// If the same kind is applied more than once the later occurrence
    /// overwrites the earlier one; the dispatcher never produces duplicates,
    /// but the fold does not defend against them.
    pub fn apply(&mut self, result: &PerfTestResult) {
        match result {
            PerfTestResult::Object { result, error } => {
                self.object_results = convert_object_results(result.as_ref());
                if let Some(error) = error {
                    self.error = Some(error.clone());
                }
            }
            PerfTestResult::Net { result, error } => {
                self.net_results = convert_net_results(result.as_ref());
                if let Some(error) = error {
                    self.error = Some(error.clone());
                }
            }
            PerfTestResult::Drive { result, error } => {
                self.drive_results = convert_drive_results(result.as_deref());
                if let Some(error) = error {
                    self.error = Some(error.clone());
                }
            }
        }
    }

    /// Build the report from a sequence of per-test results.
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a PerfTestResult>) -> Self {
        let mut out = PerfTestOutput::default();
        for result in results {
            out.apply(result);
        }
        out
    }
}

/// Build a single-result report, used by the per-test JSON output mode.
pub fn convert_perf_result(result: &PerfTestResult) -> PerfTestOutput {
    let mut out = PerfTestOutput::default();
    out.apply(result);
    out
}
