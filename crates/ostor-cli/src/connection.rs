//! Connection options and admin environment.
//!
//! `ConnectionOptions` are the top-level flags shared by all subcommands;
//! `AdminEnv` resolves them into loaded configuration and admin clients.
//! The global mode flags (JSON output, airgapped operation) live here as
//! explicit state rather than process-wide globals so the perf pipeline
//! stays independently testable.

use std::time::Duration;

use anyhow::{Context, Result};

use ostor_client::config::{resolved_config_path, DEFAULT_CONFIG_PATH};
use ostor_client::{AdminClient, AdminConfig, ClientOptions};

use crate::output::OutputFormat;

/// Global CLI connection options shared across all subcommands.
#[derive(Debug, Clone, clap::Args)]
pub struct ConnectionOptions {
    /// Path to the admin configuration file.
    #[arg(long, env = "OSTOR_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Support portal API key (overrides the config file).
    #[arg(long, env = "OSTOR_API_KEY")]
    pub api_key: Option<String>,

    /// Do not attempt any network upload; save reports locally.
    #[arg(long)]
    pub airgap: bool,

    /// Emit machine-readable JSON instead of status lines.
    #[arg(long)]
    pub json: bool,

    /// Timeout for ordinary admin requests.
    #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,
}

/// Admin environment backing command execution.
pub struct AdminEnv {
    /// Connection options from the command line.
    pub options: ConnectionOptions,

    config: AdminConfig,
}

impl AdminEnv {
    /// Create an environment, loading the admin config file.
    pub fn new(options: ConnectionOptions) -> Result<Self> {
        let path = resolved_config_path(&options.config);
        let config = AdminConfig::load(&path)
            .with_context(|| format!("cannot load admin config from {}", path.display()))?;
        Ok(Self { options, config })
    }

    /// Create an environment from already-loaded configuration.
    pub fn from_parts(options: ConnectionOptions, config: AdminConfig) -> Self {
        Self { options, config }
    }

    /// Build an admin client for the given alias.
    pub fn admin_client(&self, alias: &str) -> Result<AdminClient> {
        let entry = self
            .config
            .alias(alias)
            .context("unable to initialize admin connection")?;

        let client = AdminClient::new(
            entry,
            &ClientOptions {
                request_timeout: self.options.timeout,
            },
        )
        .context("unable to initialize admin connection")?;

        Ok(client)
    }

    /// Whether JSON output mode is active.
    pub fn json(&self) -> bool {
        self.options.json
    }

    /// Whether airgapped mode is active.
    pub fn airgapped(&self) -> bool {
        self.options.airgap
    }

    /// Printer format matching the mode flags.
    pub fn output_format(&self) -> OutputFormat {
        if self.options.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    /// Portal base URL from the config file.
    pub fn portal_base(&self) -> String {
        self.config.portal.base_url.clone()
    }

    /// Portal API key: the flag/env value wins over the config file.
    pub fn api_key(&self) -> Option<String> {
        self.options
            .api_key
            .clone()
            .or_else(|| self.config.portal.api_key.clone())
    }

    /// Portal API key, or a fatal diagnostic when uploads would need one.
    pub fn require_api_key(&self) -> Result<String> {
        self.api_key().ok_or_else(|| {
            anyhow::anyhow!(
                "no support portal API key configured: pass --api-key, set OSTOR_API_KEY, \
                 add it to the admin config, or run with --airgap"
            )
        })
    }
}
