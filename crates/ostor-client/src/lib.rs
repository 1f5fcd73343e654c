//! Admin API client for ostor object-storage clusters.
//!
//! This crate provides the typed surface the `ostor-admin` tool uses to talk
//! to a cluster:
//!
//! - **[`admin`]** -- the [`AdminApi`] trait and its HTTP implementation
//!   [`AdminClient`]: group status mutation, cluster info, and the three
//!   speed-test operations (object, drive, network).
//! - **[`perf`]** -- raw speed-test option and result structures as returned
//!   by the admin endpoints.
//! - **[`config`]** -- the `~/.ostor/admin.toml` model: alias ->
//!   endpoint/credentials plus support portal settings.
//! - **[`error`]** -- [`ClientError`] / [`ClientResult`].

pub mod admin;
pub mod config;
pub mod error;
pub mod perf;

pub use admin::{AdminApi, AdminClient, GroupStatus, ServerInfo};
pub use config::{AdminConfig, AliasEntry, ClientOptions, PortalConfig};
pub use error::{ClientError, ClientResult};
