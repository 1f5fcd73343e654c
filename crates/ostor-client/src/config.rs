//! Admin configuration file model.
//!
//! The admin tool reads a TOML file (default `~/.ostor/admin.toml`) that maps
//! cluster aliases to endpoints and credentials and carries the support
//! portal settings:
//!
//! ```toml
//! [aliases.myostor]
//! url = "https://ostor.example.com:9000"
//! access_key = "admin"
//! secret_key = "secret"
//!
//! [portal]
//! api_key = "0123-4567"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Default location of the admin configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "~/.ostor/admin.toml";

/// Default base URL of the remote support portal.
pub const DEFAULT_PORTAL_BASE_URL: &str = "https://support.ostor.io";

/// One configured cluster alias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasEntry {
    /// Cluster endpoint, e.g. `https://ostor.example.com:9000`.
    pub url: String,

    /// Admin access key.
    pub access_key: String,

    /// Admin secret key.
    pub secret_key: String,
}

/// Support portal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Base URL of the support portal.
    #[serde(default = "default_portal_base")]
    pub base_url: String,

    /// API key issued when the cluster was registered with the portal.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_portal_base() -> String {
    DEFAULT_PORTAL_BASE_URL.to_string()
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_portal_base(),
            api_key: None,
        }
    }
}

/// Top-level admin configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Known cluster aliases.
    #[serde(default)]
    pub aliases: HashMap<String, AliasEntry>,

    /// Support portal settings.
    #[serde(default)]
    pub portal: PortalConfig,
}

impl AdminConfig {
    /// Load the configuration from `path`. A missing file yields the default
    /// (empty) configuration so that commands which do not need an alias can
    /// still run; a present but malformed file is an error.
    pub fn load(path: &Path) -> ClientResult<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ClientError::Config(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        toml::from_str(&raw)
            .map_err(|e| ClientError::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// Look up an alias entry.
    pub fn alias(&self, name: &str) -> ClientResult<&AliasEntry> {
        self.aliases
            .get(name)
            .ok_or_else(|| ClientError::UnknownAlias(name.to_string()))
    }
}

/// Resolve a config path, expanding a leading `~` to the home directory.
pub fn resolved_config_path(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Transport options for the admin client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Timeout applied to ordinary (non-benchmark) requests.
    pub request_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}
