//! Admin API client.
//!
//! Provides the [`AdminApi`] trait that CLI commands program against and the
//! HTTP implementation [`AdminClient`] that talks to a cluster's admin
//! endpoints. The benchmark operations are synchronous long-polls: the
//! server runs the test for the requested duration and answers with the
//! complete result.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{AliasEntry, ClientOptions};
use crate::error::{ClientError, ClientResult};
use crate::perf::{
    DriveSpeedTestResult, DriveTestOpts, NetTestOpts, NetperfResult, SpeedTestOpts,
    SpeedTestResult,
};

/// Versioned prefix shared by all admin endpoints.
const ADMIN_API_PREFIX: &str = "/admin/v1";

/// Extra wall-clock allowance on top of the requested benchmark duration
/// before a long-polled speed-test request is abandoned.
const SPEEDTEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(120);

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Cluster metadata reported by the admin info endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub deployment_id: String,

    #[serde(default)]
    pub cluster_name: String,

    pub version: String,

    pub servers: u32,

    pub drives: u32,

    #[serde(default)]
    pub buckets: u64,

    #[serde(default)]
    pub objects: u64,

    #[serde(default)]
    pub total_drive_space: u64,

    #[serde(default)]
    pub used_drive_space: u64,
}

/// Group status values accepted by the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStatus {
    Enabled,
    Disabled,
}

impl GroupStatus {
    /// Wire string for the status query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupStatus::Enabled => "enabled",
            GroupStatus::Disabled => "disabled",
        }
    }
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Operations the admin tool performs against a cluster.
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Enable or disable a user group.
    async fn set_group_status(&self, group: &str, status: GroupStatus) -> ClientResult<()>;

    /// Fetch cluster metadata.
    async fn server_info(&self) -> ClientResult<ServerInfo>;

    /// Run the object PUT/GET speed test and wait for the result.
    async fn object_speedtest(&self, opts: &SpeedTestOpts) -> ClientResult<SpeedTestResult>;

    /// Run the drive speed test and wait for the per-endpoint results.
    async fn drive_speedtest(
        &self,
        opts: &DriveTestOpts,
    ) -> ClientResult<Vec<DriveSpeedTestResult>>;

    /// Run the network speed test and wait for the result.
    async fn net_speedtest(&self, opts: &NetTestOpts) -> ClientResult<NetperfResult>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// HTTP implementation of [`AdminApi`].
#[derive(Debug)]
pub struct AdminClient {
    base_url: String,
    access_key: String,
    secret_key: String,
    http: reqwest::Client,
}

impl AdminClient {
    /// Create a client for the given alias entry.
    pub fn new(entry: &AliasEntry, options: &ClientOptions) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            base_url: entry.url.trim_end_matches('/').to_string(),
            access_key: entry.access_key.clone(),
            secret_key: entry.secret_key.clone(),
            http,
        })
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, ADMIN_API_PREFIX, path)
    }

    /// Map a non-success response to `ClientError::Api`.
    async fn check(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            message: if message.is_empty() {
                status.to_string()
            } else {
                message
            },
        })
    }
}

#[async_trait]
impl AdminApi for AdminClient {
    async fn set_group_status(&self, group: &str, status: GroupStatus) -> ClientResult<()> {
        tracing::debug!(group, status = %status, "setting group status");

        let response = self
            .http
            .put(self.url(&format!("/groups/{}/status", group)))
            .basic_auth(&self.access_key, Some(&self.secret_key))
            .query(&[("status", status.as_str())])
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn server_info(&self) -> ClientResult<ServerInfo> {
        tracing::debug!("fetching server info");

        let response = self
            .http
            .get(self.url("/info"))
            .basic_auth(&self.access_key, Some(&self.secret_key))
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn object_speedtest(&self, opts: &SpeedTestOpts) -> ClientResult<SpeedTestResult> {
        tracing::debug!(
            size = opts.size,
            concurrent = opts.concurrent,
            duration_secs = opts.duration.as_secs(),
            "starting object speed test"
        );

        let mut query: Vec<(&str, String)> = vec![
            ("size", opts.size.to_string()),
            ("concurrent", opts.concurrent.to_string()),
            ("duration", format!("{}s", opts.duration.as_secs())),
        ];
        if let Some(bucket) = &opts.bucket {
            query.push(("bucket", bucket.clone()));
        }

        let response = self
            .http
            .post(self.url("/speedtest/object"))
            .basic_auth(&self.access_key, Some(&self.secret_key))
            .timeout(opts.duration + SPEEDTEST_TIMEOUT_MARGIN)
            .query(&query)
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn drive_speedtest(
        &self,
        opts: &DriveTestOpts,
    ) -> ClientResult<Vec<DriveSpeedTestResult>> {
        tracing::debug!(
            filesize = opts.filesize,
            blocksize = opts.blocksize,
            serial = opts.serial,
            "starting drive speed test"
        );

        let response = self
            .http
            .post(self.url("/speedtest/drive"))
            .basic_auth(&self.access_key, Some(&self.secret_key))
            .timeout(SPEEDTEST_TIMEOUT_MARGIN)
            .query(&[
                ("filesize", opts.filesize.to_string()),
                ("blocksize", opts.blocksize.to_string()),
                ("serial", opts.serial.to_string()),
            ])
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn net_speedtest(&self, opts: &NetTestOpts) -> ClientResult<NetperfResult> {
        tracing::debug!(duration_secs = opts.duration.as_secs(), "starting network speed test");

        let response = self
            .http
            .post(self.url("/speedtest/net"))
            .basic_auth(&self.access_key, Some(&self.secret_key))
            .timeout(opts.duration + SPEEDTEST_TIMEOUT_MARGIN)
            .query(&[("duration", format!("{}s", opts.duration.as_secs()))])
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    fn test_client(server: &Server) -> AdminClient {
        AdminClient::new(
            &AliasEntry {
                url: server.url_str("/"),
                access_key: "admin".to_string(),
                secret_key: "secret".to_string(),
            },
            &ClientOptions::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_set_group_status() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("PUT", "/admin/v1/groups/ops/status"),
                request::query(url_decoded(contains(("status", "enabled")))),
            ])
            .respond_with(status_code(200)),
        );

        let client = test_client(&server);
        client
            .set_group_status("ops", GroupStatus::Enabled)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_set_group_status_api_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path(
                "PUT",
                "/admin/v1/groups/ops/status",
            ))
            .respond_with(status_code(403).body("access denied")),
        );

        let client = test_client(&server);
        let err = client
            .set_group_status("ops", GroupStatus::Disabled)
            .await
            .unwrap_err();

        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "access denied");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_info() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/admin/v1/info")).respond_with(
                json_encoded(serde_json::json!({
                    "deploymentId": "6faa41a5-0bc1-4cf7-a2f8-b43c18242b4a",
                    "clusterName": "prod-east",
                    "version": "2025-07-01T00:00:00Z",
                    "servers": 4,
                    "drives": 16,
                    "buckets": 211,
                    "objects": 1500000,
                    "totalDriveSpace": 64000000000000u64,
                    "usedDriveSpace": 21000000000000u64
                })),
            ),
        );

        let client = test_client(&server);
        let info = client.server_info().await.unwrap();
        assert_eq!(info.deployment_id, "6faa41a5-0bc1-4cf7-a2f8-b43c18242b4a");
        assert_eq!(info.servers, 4);
        assert_eq!(info.drives, 16);
        assert_eq!(info.used_drive_space, 21000000000000);
    }

    #[tokio::test]
    async fn test_net_speedtest() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/admin/v1/speedtest/net"))
                .respond_with(json_encoded(serde_json::json!({
                    "nodeResults": [
                        {"endpoint": "http://node1:9000", "tx": 125000000u64, "rx": 118000000u64}
                    ]
                }))),
        );

        let client = test_client(&server);
        let result = client
            .net_speedtest(&NetTestOpts {
                duration: Duration::from_secs(10),
            })
            .await
            .unwrap();

        assert_eq!(result.node_results.len(), 1);
        assert_eq!(result.node_results[0].tx, 125000000);
    }

    #[tokio::test]
    async fn test_object_speedtest_query() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/admin/v1/speedtest/object"),
                request::query(url_decoded(contains(("size", "67108864")))),
                request::query(url_decoded(contains(("concurrent", "32")))),
                request::query(url_decoded(contains(("bucket", "bench")))),
            ])
            .respond_with(json_encoded(serde_json::json!({
                "version": "2025-07-01T00:00:00Z",
                "servers": 1,
                "disks": 4,
                "size": 67108864u64,
                "concurrent": 32,
                "PUTStats": {"throughputPerSec": 1, "objectsPerSec": 1, "servers": []},
                "GETStats": {"throughputPerSec": 2, "objectsPerSec": 2, "servers": []}
            }))),
        );

        let client = test_client(&server);
        let result = client
            .object_speedtest(&SpeedTestOpts {
                size: 64 * 1024 * 1024,
                concurrent: 32,
                duration: Duration::from_secs(10),
                bucket: Some("bench".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(result.disks, 4);
        assert_eq!(result.get_stats.throughput_per_sec, 2);
    }

    #[tokio::test]
    async fn test_drive_speedtest() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/admin/v1/speedtest/drive"))
                .respond_with(json_encoded(serde_json::json!([
                    {
                        "endpoint": "http://node1:9000",
                        "version": "2025-07-01T00:00:00Z",
                        "perf": [{"path": "/data/1", "readThroughput": 5, "writeThroughput": 3}]
                    }
                ]))),
        );

        let client = test_client(&server);
        let results = client
            .drive_speedtest(&DriveTestOpts {
                filesize: 1024 * 1024 * 1024,
                blocksize: 4 * 1024 * 1024,
                serial: false,
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].perf[0].read_throughput, 5);
    }

    #[tokio::test]
    async fn test_connection_error() {
        // Nothing is listening on this port.
        let client = AdminClient::new(
            &AliasEntry {
                url: "http://127.0.0.1:1".to_string(),
                access_key: "admin".to_string(),
                secret_key: "secret".to_string(),
            },
            &ClientOptions {
                request_timeout: Duration::from_secs(1),
            },
        )
        .unwrap();

        let err = client.server_info().await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }
}
