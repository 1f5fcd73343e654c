//! Support portal integration and report delivery.
//!
//! After a perf run the archive is routed to one of two destinations: the
//! remote support portal (multipart upload) or the local working directory.
//! Airgapped mode skips the network entirely; a failed upload falls back to
//! the same local save, so the archive is never dropped.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use ostor_client::ServerInfo;

use crate::output::Printer;

/// Header carrying the portal API key on upload requests.
const PORTAL_API_KEY_HEADER: &str = "x-ostor-api-key";

// ---------------------------------------------------------------------------
// Registration metadata
// ---------------------------------------------------------------------------

/// Cluster capacity/version summary embedded in the registration info.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInfo {
    pub version: String,
    pub servers: u32,
    pub drives: u32,
    pub buckets: u64,
    pub objects: u64,
    pub total_drive_space: u64,
    pub used_drive_space: u64,
}

/// Metadata identifying the cluster's enrollment with the support portal.
///
/// Embedded verbatim as the archive's `cluster.info` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRegistrationInfo {
    pub deployment_id: String,
    pub cluster_name: String,
    pub used_capacity: u64,
    pub info: ClusterInfo,
}

/// Build the registration info from the cluster's admin info.
pub fn cluster_reg_info(info: &ServerInfo, alias: &str) -> ClusterRegistrationInfo {
    let cluster_name = if info.cluster_name.is_empty() {
        alias.to_string()
    } else {
        info.cluster_name.clone()
    };

    ClusterRegistrationInfo {
        deployment_id: info.deployment_id.clone(),
        cluster_name,
        used_capacity: info.used_drive_space,
        info: ClusterInfo {
            version: info.version.clone(),
            servers: info.servers,
            drives: info.drives,
            buckets: info.buckets,
            objects: info.objects,
            total_drive_space: info.total_drive_space,
            used_drive_space: info.used_drive_space,
        },
    }
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

/// Build the portal upload URL for an archive of the given kind.
pub fn upload_url(portal_base: &str, kind: &str, filename: &str) -> String {
    format!(
        "{}/api/v1/uploads?type={}&filename={}",
        portal_base.trim_end_matches('/'),
        kind,
        filename
    )
}

/// Upload the archive to the portal as a multipart form.
async fn upload_report(alias: &str, path: &Path, url: &str, api_key: &str) -> Result<()> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "perf.zip".to_string());

    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read archive {}", path.display()))?;

    let form = reqwest::multipart::Form::new()
        .text("alias", alias.to_string())
        .part("file", reqwest::multipart::Part::bytes(data).file_name(filename));

    let response = reqwest::Client::new()
        .post(url)
        .header(PORTAL_API_KEY_HEADER, api_key)
        .multipart(form)
        .send()
        .await
        .context("upload request failed")?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if body.is_empty() {
            bail!("portal answered with status {}", status);
        }
        bail!("portal answered with status {}: {}", status, body);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Delivery router
// ---------------------------------------------------------------------------

/// Where and how the archive should be delivered.
#[derive(Debug, Clone)]
pub struct DeliveryOptions {
    /// Never touch the network; save locally.
    pub airgapped: bool,

    /// Portal base URL.
    pub portal_base: String,

    /// Portal API key; required for uploads.
    pub api_key: Option<String>,

    /// Directory receiving locally-saved archives (the working directory in
    /// normal operation; explicit so the router is testable).
    pub dest_dir: PathBuf,
}

/// Final disposition of the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Uploaded to the portal; nothing retained locally.
    Uploaded,
    /// Saved to the given local path.
    Saved(PathBuf),
}

/// Rename `src` to `dst`, copying across filesystems if needed.
fn move_file(src: &Path, dst: &Path) -> Result<()> {
    if std::fs::rename(src, dst).is_ok() {
        return Ok(());
    }

    // The temp dir may live on another filesystem.
    std::fs::copy(src, dst)
        .with_context(|| format!("cannot copy {} to {}", src.display(), dst.display()))?;
    std::fs::remove_file(src)
        .with_context(|| format!("cannot remove {}", src.display()))?;
    Ok(())
}

/// Save the temporary archive as `<prefix>.zip` in the destination directory.
fn save_report_file<W: Write>(
    printer: &mut Printer<W>,
    tmp_path: &Path,
    dest_dir: &Path,
    prefix: &str,
) -> Result<PathBuf> {
    let dst = dest_dir.join(format!("{}.zip", prefix));
    move_file(tmp_path, &dst).with_context(|| {
        format!(
            "cannot move temporary archive {} to {}",
            tmp_path.display(),
            dst.display()
        )
    })?;

    printer.print_message(&format!("performance report saved at {}", dst.display()))?;
    Ok(dst)
}

/// Decide the archive's final disposition.
///
/// Airgapped mode renames the archive into the destination directory without
/// any network call. Otherwise the archive is uploaded to the portal; on any
/// upload failure a diagnostic is printed and the archive is saved locally
/// exactly as in airgapped mode.
pub async fn deliver_report<W: Write>(
    opts: &DeliveryOptions,
    printer: &mut Printer<W>,
    tmp_path: &Path,
    prefix: &str,
    alias: &str,
) -> Result<Delivery> {
    if opts.airgapped {
        let saved = save_report_file(printer, tmp_path, &opts.dest_dir, prefix)?;
        return Ok(Delivery::Saved(saved));
    }

    let url = upload_url(&opts.portal_base, "perf", &format!("{}.zip", prefix));
    let upload = match opts.api_key.as_deref() {
        Some(api_key) => upload_report(alias, tmp_path, &url, api_key).await,
        None => Err(anyhow::anyhow!("no portal API key configured")),
    };

    match upload {
        Ok(()) => {
            if let Err(e) = std::fs::remove_file(tmp_path) {
                tracing::warn!(
                    "cannot remove temporary archive {}: {}",
                    tmp_path.display(),
                    e
                );
            }
            printer.print_success("performance report uploaded successfully to the support portal")?;
            Ok(Delivery::Uploaded)
        }
        Err(e) => {
            printer.print_error(&format!("unable to upload performance report: {:#}", e))?;
            let saved = save_report_file(printer, tmp_path, &opts.dest_dir, prefix)?;
            Ok(Delivery::Saved(saved))
        }
    }
}
