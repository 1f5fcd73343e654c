//! Result archive builder.
//!
//! Packages the aggregated performance report and the cluster registration
//! metadata as two JSON entries in a single zip archive, staged at a
//! temporary path. The caller (the delivery router) owns the returned file:
//! it either renames it to its final name or deletes it after upload.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::portal::ClusterRegistrationInfo;
use crate::report::PerfTestOutput;

/// Fixed name of the registration metadata entry.
pub const CLUSTER_INFO_ENTRY: &str = "cluster.info";

fn write_json_entry<T: Serialize>(
    zip: &mut ZipWriter<File>,
    value: &T,
    name: &str,
) -> Result<()> {
    zip.start_file(name, SimpleFileOptions::default())
        .with_context(|| format!("cannot create archive entry '{}'", name))?;

    let encoded = serde_json::to_vec(value)
        .with_context(|| format!("cannot encode archive entry '{}'", name))?;
    zip.write_all(&encoded)
        .with_context(|| format!("cannot write archive entry '{}'", name))?;

    Ok(())
}

/// Build the result archive at a temporary path and return that path.
///
/// The archive contains exactly two entries: the report under `entry_name`
/// and the registration metadata under [`CLUSTER_INFO_ENTRY`]. On error the
/// partially-written temporary file may remain on disk, matching the
/// caller-owns-the-file contract.
pub fn zip_perf_report(
    report: &PerfTestOutput,
    entry_name: &str,
    reg_info: &ClusterRegistrationInfo,
) -> Result<PathBuf> {
    let tmp = tempfile::Builder::new()
        .prefix("ostor-perf-")
        .tempfile()
        .context("cannot create temporary archive file")?;
    let (file, path) = tmp
        .keep()
        .context("cannot persist temporary archive file")?;

    let mut zip = ZipWriter::new(file);
    write_json_entry(&mut zip, report, entry_name)?;
    write_json_entry(&mut zip, reg_info, CLUSTER_INFO_ENTRY)?;
    zip.finish().context("cannot finalize archive")?;

    Ok(path)
}
