//! Performance benchmark command.
//!
//! `perf [drive|object|net] <ALIAS>` runs one benchmark kind, or all three
//! in the fixed order network -> drive -> object when no kind is given.
//! Each benchmark is invoked exactly once, strictly sequentially; the entry
//! point delivers its single result through a single-slot handoff channel
//! the dispatcher blocks on before moving to the next kind. The aggregated
//! report is archived together with the cluster registration info and
//! routed to the support portal or the local working directory.

use std::io::Write;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use tokio::sync::mpsc;

use ostor_client::perf::{DriveTestOpts, NetTestOpts, SpeedTestOpts};
use ostor_client::AdminApi;

use crate::archive::zip_perf_report;
use crate::commands::UsageError;
use crate::connection::AdminEnv;
use crate::output::{format_bytes, parse_bytes, Printer};
use crate::portal::{cluster_reg_info, deliver_report, DeliveryOptions};
use crate::progress::StatusLine;
use crate::report::{convert_perf_result, PerfTestKind, PerfTestOutput, PerfTestResult};

/// Usage line shown on argument-shape violations.
const PERF_USAGE: &str = "ostor-admin perf [drive|object|net] <ALIAS> [FLAGS]";

/// Arguments for `perf`.
#[derive(Debug, Args)]
pub struct PerfArgs {
    /// Benchmark kind (drive, object or net), or the target alias to run
    /// all three kinds against.
    pub target: String,

    /// Target alias when a kind is given.
    pub alias: Option<String>,

    /// Duration each benchmark runs.
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    pub duration: Duration,

    /// Display per-server stats.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Size of the object used for uploads/downloads.
    #[arg(long, default_value = "64MiB", hide = true)]
    pub size: String,

    /// Number of concurrent requests per server.
    #[arg(long, default_value_t = 32, hide = true)]
    pub concurrent: u32,

    /// Custom bucket name to run the object test against (must exist).
    #[arg(long, hide = true)]
    pub bucket: Option<String>,

    /// Total amount of data read/written to each drive.
    #[arg(long, default_value = "1GiB", hide = true)]
    pub filesize: String,

    /// Read/write block size.
    #[arg(long, default_value = "4MiB", hide = true)]
    pub blocksize: String,

    /// Run tests on drive(s) one-by-one.
    #[arg(long, hide = true)]
    pub serial: bool,
}

/// Parsed options for all three benchmark kinds.
#[derive(Debug, Clone)]
pub struct PerfOpts {
    pub object: SpeedTestOpts,
    pub drive: DriveTestOpts,
    pub net: NetTestOpts,
}

impl PerfArgs {
    /// Resolve the positional arguments into a kind selector and an alias.
    ///
    /// With a single argument it is the alias, and the benchmark kind names
    /// are rejected as alias values to keep the two-argument form
    /// unambiguous.
    pub fn resolve(&self) -> Result<(Option<PerfTestKind>, &str), UsageError> {
        match &self.alias {
            Some(alias) => {
                let kind = self.target.parse::<PerfTestKind>().map_err(|message| UsageError {
                    message,
                    usage: PERF_USAGE,
                })?;
                Ok((Some(kind), alias))
            }
            None => {
                if self.target.parse::<PerfTestKind>().is_ok() {
                    return Err(UsageError {
                        message: format!("'{}' cannot be used as an alias name", self.target),
                        usage: PERF_USAGE,
                    });
                }
                Ok((None, &self.target))
            }
        }
    }

    /// Parse the size flags into per-kind benchmark options.
    fn perf_opts(&self) -> Result<PerfOpts> {
        Ok(PerfOpts {
            object: SpeedTestOpts {
                size: parse_bytes(&self.size).map_err(|e| anyhow!("invalid --size: {}", e))?,
                concurrent: self.concurrent,
                duration: self.duration,
                bucket: self.bucket.clone(),
            },
            drive: DriveTestOpts {
                filesize: parse_bytes(&self.filesize)
                    .map_err(|e| anyhow!("invalid --filesize: {}", e))?,
                blocksize: parse_bytes(&self.blocksize)
                    .map_err(|e| anyhow!("invalid --blocksize: {}", e))?,
                serial: self.serial,
            },
            net: NetTestOpts {
                duration: self.duration,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Benchmark entry points
// ---------------------------------------------------------------------------

/// Deliver a finished result: print it in JSON mode, otherwise hand it to
/// the dispatcher through the channel.
async fn finish_test<W: Write>(
    result: PerfTestResult,
    tx: &mpsc::Sender<PerfTestResult>,
    json: bool,
    printer: &mut Printer<W>,
) -> Result<()> {
    if json {
        printer.print_value(&convert_perf_result(&result))?;
        return Ok(());
    }

    tx.send(result)
        .await
        .map_err(|_| anyhow!("result channel closed"))?;
    Ok(())
}

async fn run_net_test<W: Write>(
    client: &dyn AdminApi,
    opts: &NetTestOpts,
    tx: &mpsc::Sender<PerfTestResult>,
    json: bool,
    printer: &mut Printer<W>,
) -> Result<()> {
    let result = match client.net_speedtest(opts).await {
        Ok(r) => PerfTestResult::Net {
            result: Some(r),
            error: None,
        },
        Err(e) => PerfTestResult::Net {
            result: None,
            error: Some(e.to_string()),
        },
    };
    finish_test(result, tx, json, printer).await
}

async fn run_drive_test<W: Write>(
    client: &dyn AdminApi,
    opts: &DriveTestOpts,
    tx: &mpsc::Sender<PerfTestResult>,
    json: bool,
    printer: &mut Printer<W>,
) -> Result<()> {
    let result = match client.drive_speedtest(opts).await {
        Ok(r) => PerfTestResult::Drive {
            result: Some(r),
            error: None,
        },
        Err(e) => PerfTestResult::Drive {
            result: None,
            error: Some(e.to_string()),
        },
    };
    finish_test(result, tx, json, printer).await
}

async fn run_object_test<W: Write>(
    client: &dyn AdminApi,
    opts: &SpeedTestOpts,
    tx: &mpsc::Sender<PerfTestResult>,
    json: bool,
    printer: &mut Printer<W>,
) -> Result<()> {
    let result = match client.object_speedtest(opts).await {
        Ok(r) => PerfTestResult::Object {
            result: Some(r),
            error: None,
        },
        Err(e) => PerfTestResult::Object {
            result: None,
            error: Some(e.to_string()),
        },
    };
    finish_test(result, tx, json, printer).await
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Run the requested benchmark kind(s) strictly one at a time.
///
/// In JSON mode results are not collected; each entry point prints its own
/// single-result report instead and the returned vector is empty.
pub async fn run_perf_tests<W: Write>(
    client: &dyn AdminApi,
    kind: Option<PerfTestKind>,
    opts: &PerfOpts,
    json: bool,
    verbose: bool,
    printer: &mut Printer<W>,
) -> Result<Vec<PerfTestResult>> {
    let (tx, mut rx) = mpsc::channel::<PerfTestResult>(1);

    let kinds: Vec<PerfTestKind> = match kind {
        Some(kind) => vec![kind],
        None => PerfTestKind::default_order().to_vec(),
    };

    let mut results = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let status = StatusLine::start(format!("running {} test", kind), !json);
        match kind {
            PerfTestKind::Net => run_net_test(client, &opts.net, &tx, json, printer).await?,
            PerfTestKind::Drive => run_drive_test(client, &opts.drive, &tx, json, printer).await?,
            PerfTestKind::Object => {
                run_object_test(client, &opts.object, &tx, json, printer).await?
            }
        }

        if json {
            status.clear();
        } else {
            status.finish();
        }

        if !json {
            let result = rx
                .recv()
                .await
                .context("benchmark finished without delivering a result")?;
            print_test_summary(printer, &result, verbose)?;
            results.push(result);
        }
    }

    Ok(results)
}

/// Render a short human summary of one finished test; verbose mode adds
/// per-server lines.
fn print_test_summary<W: Write>(
    printer: &mut Printer<W>,
    result: &PerfTestResult,
    verbose: bool,
) -> Result<()> {
    match result {
        PerfTestResult::Object {
            result: Some(r), ..
        } => {
            printer.print_message(&format!(
                "ostor {}, {} servers, {} drives, {} objects, {} threads",
                r.version,
                r.servers,
                r.disks,
                format_bytes(r.size),
                r.concurrent
            ))?;

            if verbose {
                printer.print_message("PUT:")?;
                for node in &r.put_stats.servers {
                    printer.print_message(&server_stat_line(
                        &node.endpoint,
                        node.throughput_per_sec,
                        node.objects_per_sec,
                        &node.err,
                    ))?;
                }
                printer.print_message("GET:")?;
                for node in &r.get_stats.servers {
                    printer.print_message(&server_stat_line(
                        &node.endpoint,
                        node.throughput_per_sec,
                        node.objects_per_sec,
                        &node.err,
                    ))?;
                }
            }
        }
        PerfTestResult::Net {
            result: Some(r), ..
        } => {
            printer.print_message(&format!("network test on {} node(s)", r.node_results.len()))?;
            if verbose {
                for node in &r.node_results {
                    let mut line = format!(
                        "   * {}: TX {}/s RX {}/s",
                        node.endpoint,
                        format_bytes(node.tx),
                        format_bytes(node.rx)
                    );
                    if !node.error.is_empty() {
                        line.push_str(" err: ");
                        line.push_str(&node.error);
                    }
                    printer.print_message(&line)?;
                }
            }
        }
        PerfTestResult::Drive {
            result: Some(r), ..
        } => {
            printer.print_message(&format!("drive test on {} node(s)", r.len()))?;
            if verbose {
                for node in r {
                    for perf in &node.perf {
                        printer.print_message(&format!(
                            "   * {} {}: read {}/s write {}/s",
                            node.endpoint,
                            perf.path,
                            format_bytes(perf.read_throughput),
                            format_bytes(perf.write_throughput)
                        ))?;
                    }
                    if !node.error.is_empty() {
                        printer
                            .print_message(&format!("   * {} err: {}", node.endpoint, node.error))?;
                    }
                }
            }
        }
        PerfTestResult::Object { error, .. }
        | PerfTestResult::Net { error, .. }
        | PerfTestResult::Drive { error, .. } => {
            printer.print_error(&format!(
                "{} test failed: {}",
                result.kind(),
                error.as_deref().unwrap_or("unknown error")
            ))?;
        }
    }

    Ok(())
}

fn server_stat_line(endpoint: &str, throughput: u64, objects_per_sec: u64, err: &str) -> String {
    let mut line = format!(
        "   * {}: {}/s, {} objs/s",
        endpoint,
        format_bytes(throughput),
        objects_per_sec
    );
    if !err.is_empty() {
        line.push_str(" err: ");
        line.push_str(err);
    }
    line
}

// ---------------------------------------------------------------------------
// Command handler
// ---------------------------------------------------------------------------

/// Execute `perf`: dispatch the benchmarks, aggregate, archive, deliver.
pub async fn execute_perf<W: Write>(
    env: &AdminEnv,
    args: &PerfArgs,
    printer: &mut Printer<W>,
) -> Result<()> {
    let (kind, alias) = args.resolve()?;
    let opts = args.perf_opts()?;

    let client = env.admin_client(alias)?;

    // Resolve the API key up front: discovering it is missing only after
    // minutes of benchmarking would waste the whole run.
    let api_key = if env.airgapped() || env.json() {
        env.api_key()
    } else {
        Some(env.require_api_key()?)
    };

    let results =
        run_perf_tests(&client, kind, &opts, env.json(), args.verbose, printer).await?;

    if env.json() {
        // No file is saved or uploaded in JSON mode.
        return Ok(());
    }

    let prefix = format!(
        "{}-perf_{}",
        alias,
        chrono::Utc::now().format("%Y%m%d%H%M%S")
    );
    let entry_name = format!("{}.json", prefix);

    let info = client
        .server_info()
        .await
        .context("cannot fetch cluster info")?;
    let reg_info = cluster_reg_info(&info, alias);

    let report = PerfTestOutput::from_results(&results);
    let tmp_path = zip_perf_report(&report, &entry_name, &reg_info)
        .context("cannot create archive from perf test results")?;

    let delivery = DeliveryOptions {
        airgapped: env.airgapped(),
        portal_base: env.portal_base(),
        api_key,
        dest_dir: std::env::current_dir().context("cannot determine working directory")?,
    };
    deliver_report(&delivery, printer, &tmp_path, &prefix, alias).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use crate::portal::{deliver_report, Delivery};
    use async_trait::async_trait;
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use ostor_client::perf::{
        DrivePerf, DriveSpeedTestResult, NetperfNodeResult, NetperfResult, SpeedTestResult,
    };
    use ostor_client::{ClientError, ClientResult, GroupStatus, ServerInfo};
    use std::sync::Mutex;

    fn test_args(target: &str, alias: Option<&str>) -> PerfArgs {
        PerfArgs {
            target: target.to_string(),
            alias: alias.map(|a| a.to_string()),
            duration: Duration::from_secs(10),
            verbose: false,
            size: "64MiB".to_string(),
            concurrent: 32,
            bucket: None,
            filesize: "1GiB".to_string(),
            blocksize: "4MiB".to_string(),
            serial: false,
        }
    }

    fn test_opts() -> PerfOpts {
        test_args("myostor", None).perf_opts().unwrap()
    }

    /// Admin API stub that records the order of benchmark invocations.
    #[derive(Default)]
    struct MockAdmin {
        calls: Mutex<Vec<&'static str>>,
        fail_net: bool,
    }

    impl MockAdmin {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AdminApi for MockAdmin {
        async fn set_group_status(&self, _group: &str, _status: GroupStatus) -> ClientResult<()> {
            unimplemented!("not used by the perf dispatcher")
        }

        async fn server_info(&self) -> ClientResult<ServerInfo> {
            self.record("info");
            Ok(ServerInfo {
                deployment_id: "dep-1".to_string(),
                cluster_name: "prod".to_string(),
                version: "2025-07-01T00:00:00Z".to_string(),
                servers: 2,
                drives: 8,
                ..ServerInfo::default()
            })
        }

        async fn object_speedtest(
            &self,
            opts: &SpeedTestOpts,
        ) -> ClientResult<SpeedTestResult> {
            self.record("object");
            Ok(SpeedTestResult {
                size: opts.size,
                concurrent: opts.concurrent,
                servers: 2,
                disks: 8,
                ..SpeedTestResult::default()
            })
        }

        async fn drive_speedtest(
            &self,
            _opts: &DriveTestOpts,
        ) -> ClientResult<Vec<DriveSpeedTestResult>> {
            self.record("drive");
            Ok(vec![DriveSpeedTestResult {
                endpoint: "http://node1:9000".to_string(),
                perf: vec![DrivePerf {
                    path: "/data/1".to_string(),
                    read_throughput: 100,
                    write_throughput: 50,
                }],
                ..DriveSpeedTestResult::default()
            }])
        }

        async fn net_speedtest(&self, _opts: &NetTestOpts) -> ClientResult<NetperfResult> {
            self.record("net");
            if self.fail_net {
                return Err(ClientError::Internal("net benchmark unavailable".to_string()));
            }
            Ok(NetperfResult {
                node_results: vec![NetperfNodeResult {
                    endpoint: "http://node1:9000".to_string(),
                    tx: 10,
                    rx: 20,
                    error: String::new(),
                }],
            })
        }
    }

    #[test]
    fn test_resolve_kind_and_alias() {
        let binding = test_args("drive", Some("myostor"));
        let (kind, alias) = binding.resolve().unwrap();
        assert_eq!(kind, Some(PerfTestKind::Drive));
        assert_eq!(alias, "myostor");
    }

    #[test]
    fn test_resolve_alias_only() {
        let binding = test_args("myostor", None);
        let (kind, alias) = binding.resolve().unwrap();
        assert_eq!(kind, None);
        assert_eq!(alias, "myostor");
    }

    #[test]
    fn test_resolve_reserved_alias_rejected() {
        for reserved in ["drive", "net", "object"] {
            let err = test_args(reserved, None).resolve().unwrap_err();
            assert!(err.message.contains("cannot be used as an alias"));
            assert_eq!(err.usage, PERF_USAGE);
        }
    }

    #[test]
    fn test_resolve_unknown_kind_rejected() {
        let err = test_args("blob", Some("myostor")).resolve().unwrap_err();
        assert!(err.message.contains("unknown test kind"));
    }

    #[test]
    fn test_perf_opts_parses_sizes() {
        let opts = test_opts();
        assert_eq!(opts.object.size, 64 * 1024 * 1024);
        assert_eq!(opts.drive.filesize, 1024 * 1024 * 1024);
        assert_eq!(opts.drive.blocksize, 4 * 1024 * 1024);
        assert_eq!(opts.net.duration, Duration::from_secs(10));
    }

    #[test]
    fn test_perf_opts_invalid_size() {
        let mut args = test_args("myostor", None);
        args.size = "sixty-four".to_string();
        assert!(args.perf_opts().is_err());
    }

    #[tokio::test]
    async fn test_dispatcher_default_order() {
        let mock = MockAdmin::default();
        let mut buf = Vec::new();
        let mut printer = Printer::new(&mut buf, OutputFormat::Text);

        let results = run_perf_tests(&mock, None, &test_opts(), false, false, &mut printer)
            .await
            .unwrap();

        assert_eq!(mock.calls(), vec!["net", "drive", "object"]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].kind(), PerfTestKind::Net);
        assert_eq!(results[1].kind(), PerfTestKind::Drive);
        assert_eq!(results[2].kind(), PerfTestKind::Object);
    }

    #[tokio::test]
    async fn test_dispatcher_single_kind() {
        let mock = MockAdmin::default();
        let mut buf = Vec::new();
        let mut printer = Printer::new(&mut buf, OutputFormat::Text);

        let results = run_perf_tests(
            &mock,
            Some(PerfTestKind::Drive),
            &test_opts(),
            false,
            false,
            &mut printer,
        )
        .await
        .unwrap();

        assert_eq!(mock.calls(), vec!["drive"]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind(), PerfTestKind::Drive);
    }

    #[tokio::test]
    async fn test_dispatcher_captures_benchmark_failure() {
        let mock = MockAdmin {
            fail_net: true,
            ..MockAdmin::default()
        };
        let mut buf = Vec::new();
        let mut printer = Printer::new(&mut buf, OutputFormat::Text);

        let results = run_perf_tests(
            &mock,
            Some(PerfTestKind::Net),
            &test_opts(),
            false,
            false,
            &mut printer,
        )
        .await
        .unwrap();

        // The failure is carried in the result, not raised.
        assert_eq!(results.len(), 1);
        match &results[0] {
            PerfTestResult::Net { result, error } => {
                assert!(result.is_none());
                assert!(error.as_deref().unwrap().contains("net benchmark unavailable"));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let out = PerfTestOutput::from_results(&results);
        assert!(out.net_results.is_none());
        assert!(out.error.is_some());
    }

    #[tokio::test]
    async fn test_dispatcher_json_mode_prints_per_test_reports() {
        let mock = MockAdmin::default();
        let mut buf = Vec::new();
        let mut printer = Printer::new(&mut buf, OutputFormat::Json);

        let results = run_perf_tests(&mock, None, &test_opts(), true, false, &mut printer)
            .await
            .unwrap();

        // Fire-and-forget: nothing collected, all three still invoked.
        assert!(results.is_empty());
        assert_eq!(mock.calls(), vec!["net", "drive", "object"]);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("\"network\""));
        assert!(output.contains("\"drive\""));
        assert!(output.contains("\"object\""));
    }

    #[tokio::test]
    async fn test_verbose_summary_lists_servers() {
        let mock = MockAdmin::default();
        let mut buf = Vec::new();
        let mut printer = Printer::new(&mut buf, OutputFormat::Text);

        run_perf_tests(
            &mock,
            Some(PerfTestKind::Net),
            &test_opts(),
            false,
            true,
            &mut printer,
        )
        .await
        .unwrap();

        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("http://node1:9000"));
        assert!(output.contains("TX"));
    }

    // Scenario: kind=drive, upload succeeds -> only drive results populated,
    // nothing retained locally.
    #[tokio::test]
    async fn test_scenario_drive_only_upload_success() {
        let portal = Server::run();
        portal.expect(
            Expectation::matching(request::method_path("POST", "/api/v1/uploads"))
                .respond_with(status_code(200)),
        );

        let mock = MockAdmin::default();
        let mut buf = Vec::new();
        let mut printer = Printer::new(&mut buf, OutputFormat::Text);

        let results = run_perf_tests(
            &mock,
            Some(PerfTestKind::Drive),
            &test_opts(),
            false,
            false,
            &mut printer,
        )
        .await
        .unwrap();

        let report = PerfTestOutput::from_results(&results);
        assert!(report.drive_results.is_some());
        assert!(report.object_results.is_none());
        assert!(report.net_results.is_none());

        let info = mock.server_info().await.unwrap();
        let reg = cluster_reg_info(&info, "myostor");
        let tmp = zip_perf_report(&report, "myostor-perf_1.json", &reg).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let delivery = DeliveryOptions {
            airgapped: false,
            portal_base: portal.url_str("/"),
            api_key: Some("abc".to_string()),
            dest_dir: dir.path().to_path_buf(),
        };

        let outcome = deliver_report(&delivery, &mut printer, &tmp, "myostor-perf_1", "myostor")
            .await
            .unwrap();

        assert_eq!(outcome, Delivery::Uploaded);
        assert!(!tmp.exists());
        assert!(!dir.path().join("myostor-perf_1.zip").exists());

        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("uploaded successfully"));
    }

    // Scenario: no kind, airgapped -> all three sub-reports populated and a
    // `<prefix>.zip` left on disk.
    #[tokio::test]
    async fn test_scenario_all_kinds_airgapped() {
        let mock = MockAdmin::default();
        let mut buf = Vec::new();
        let mut printer = Printer::new(&mut buf, OutputFormat::Text);

        let results = run_perf_tests(&mock, None, &test_opts(), false, false, &mut printer)
            .await
            .unwrap();

        let report = PerfTestOutput::from_results(&results);
        assert!(report.object_results.is_some());
        assert!(report.net_results.is_some());
        assert!(report.drive_results.is_some());
        assert!(report.error.is_none());

        let info = mock.server_info().await.unwrap();
        let reg = cluster_reg_info(&info, "myostor");
        let tmp = zip_perf_report(&report, "myostor-perf_2.json", &reg).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let delivery = DeliveryOptions {
            airgapped: true,
            portal_base: "http://127.0.0.1:1".to_string(),
            api_key: None,
            dest_dir: dir.path().to_path_buf(),
        };

        let outcome = deliver_report(&delivery, &mut printer, &tmp, "myostor-perf_2", "myostor")
            .await
            .unwrap();

        let saved = dir.path().join("myostor-perf_2.zip");
        assert_eq!(outcome, Delivery::Saved(saved.clone()));
        assert!(saved.exists());
    }
}
