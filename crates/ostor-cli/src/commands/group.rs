//! Group management commands.
//!
//! `group enable` / `group disable` flip a user group's status on the
//! target cluster. This is plain request/response glue around the admin
//! API; the interesting part is only the message formatting.

use std::io::Write;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use ostor_client::{AdminApi, GroupStatus};

use crate::connection::AdminEnv;
use crate::output::Printer;

/// Group management subcommands.
#[derive(Debug, Subcommand)]
pub enum GroupCommands {
    /// Enable a group.
    Enable(GroupStatusArgs),

    /// Disable a group.
    Disable(GroupStatusArgs),
}

/// Arguments for `group enable` / `group disable`.
#[derive(Debug, Args)]
pub struct GroupStatusArgs {
    /// Target cluster alias.
    pub alias: String,

    /// Group name.
    pub group: String,
}

/// JSON message emitted after a successful status change.
#[derive(Debug, Serialize)]
pub struct GroupMessage {
    pub status: &'static str,

    pub op: &'static str,

    #[serde(rename = "groupName")]
    pub group_name: String,

    #[serde(rename = "groupStatus")]
    pub group_status: String,
}

impl GroupCommands {
    fn op(&self) -> &'static str {
        match self {
            GroupCommands::Enable(_) => "enable",
            GroupCommands::Disable(_) => "disable",
        }
    }

    fn status(&self) -> GroupStatus {
        match self {
            GroupCommands::Enable(_) => GroupStatus::Enabled,
            GroupCommands::Disable(_) => GroupStatus::Disabled,
        }
    }

    fn args(&self) -> &GroupStatusArgs {
        match self {
            GroupCommands::Enable(args) | GroupCommands::Disable(args) => args,
        }
    }

    /// Execute the status change and print the outcome.
    pub async fn execute<W: Write>(&self, env: &AdminEnv, printer: &mut Printer<W>) -> Result<()> {
        let args = self.args();
        let status = self.status();

        let client = env.admin_client(&args.alias)?;
        client
            .set_group_status(&args.group, status)
            .await
            .with_context(|| format!("unable to set status of group '{}'", args.group))?;

        tracing::debug!(alias = %args.alias, group = %args.group, status = %status, "group status updated");

        printer.print_success(&format!("Group '{}' is now {}", args.group, status))?;
        printer.print_value(&GroupMessage {
            status: "success",
            op: self.op(),
            group_name: args.group.clone(),
            group_status: status.to_string(),
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionOptions;
    use crate::output::OutputFormat;
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use ostor_client::{AdminConfig, AliasEntry};
    use std::time::Duration;

    fn test_env(server: &Server) -> AdminEnv {
        let mut config = AdminConfig::default();
        config.aliases.insert(
            "myostor".to_string(),
            AliasEntry {
                url: server.url_str("/"),
                access_key: "admin".to_string(),
                secret_key: "secret".to_string(),
            },
        );

        AdminEnv::from_parts(
            ConnectionOptions {
                config: "unused".to_string(),
                api_key: None,
                airgap: false,
                json: false,
                timeout: Duration::from_secs(5),
            },
            config,
        )
    }

    #[test]
    fn test_op_and_status_mapping() {
        let args = || GroupStatusArgs {
            alias: "myostor".to_string(),
            group: "ops".to_string(),
        };

        let enable = GroupCommands::Enable(args());
        assert_eq!(enable.op(), "enable");
        assert_eq!(enable.status(), GroupStatus::Enabled);

        let disable = GroupCommands::Disable(args());
        assert_eq!(disable.op(), "disable");
        assert_eq!(disable.status(), GroupStatus::Disabled);
    }

    #[tokio::test]
    async fn test_enable_group() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("PUT", "/admin/v1/groups/ops/status"),
                request::query(url_decoded(contains(("status", "enabled")))),
            ])
            .respond_with(status_code(200)),
        );

        let env = test_env(&server);
        let cmd = GroupCommands::Enable(GroupStatusArgs {
            alias: "myostor".to_string(),
            group: "ops".to_string(),
        });

        let mut buf = Vec::new();
        let mut printer = Printer::new(&mut buf, OutputFormat::Text);
        cmd.execute(&env, &mut printer).await.unwrap();

        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("Group 'ops' is now enabled"));
    }

    #[tokio::test]
    async fn test_disable_group_json_output() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("PUT", "/admin/v1/groups/ops/status"),
                request::query(url_decoded(contains(("status", "disabled")))),
            ])
            .respond_with(status_code(200)),
        );

        let env = test_env(&server);
        let cmd = GroupCommands::Disable(GroupStatusArgs {
            alias: "myostor".to_string(),
            group: "ops".to_string(),
        });

        let mut buf = Vec::new();
        let mut printer = Printer::new(&mut buf, OutputFormat::Json);
        cmd.execute(&env, &mut printer).await.unwrap();

        let output = String::from_utf8(buf).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["status"], "success");
        assert_eq!(parsed["op"], "disable");
        assert_eq!(parsed["groupName"], "ops");
        assert_eq!(parsed["groupStatus"], "disabled");
    }

    #[tokio::test]
    async fn test_enable_group_api_error_is_fatal() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path(
                "PUT",
                "/admin/v1/groups/ops/status",
            ))
            .respond_with(status_code(403).body("access denied")),
        );

        let env = test_env(&server);
        let cmd = GroupCommands::Enable(GroupStatusArgs {
            alias: "myostor".to_string(),
            group: "ops".to_string(),
        });

        let mut buf = Vec::new();
        let mut printer = Printer::new(&mut buf, OutputFormat::Text);
        let err = cmd.execute(&env, &mut printer).await.unwrap_err();
        assert!(format!("{:#}", err).contains("unable to set status of group 'ops'"));
    }

    #[tokio::test]
    async fn test_unknown_alias_is_fatal() {
        let server = Server::run();
        let env = test_env(&server);
        let cmd = GroupCommands::Enable(GroupStatusArgs {
            alias: "missing".to_string(),
            group: "ops".to_string(),
        });

        let mut buf = Vec::new();
        let mut printer = Printer::new(&mut buf, OutputFormat::Text);
        let err = cmd.execute(&env, &mut printer).await.unwrap_err();
        assert!(format!("{:#}", err).contains("unknown alias"));
    }
}
