//! CLI command definitions and handlers.

use std::io::Write;

use clap::Subcommand;

use crate::connection::AdminEnv;
use crate::output::Printer;

pub mod group;
pub mod perf;

pub use group::GroupCommands;
pub use perf::PerfArgs;

/// An argument-shape violation that clap's own checks cannot express.
///
/// Rendered with the offending command's usage line and a non-zero exit.
#[derive(Debug, thiserror::Error)]
#[error("{message}\n\nUsage: {usage}")]
pub struct UsageError {
    pub message: String,
    pub usage: &'static str,
}

/// Top-level admin command set.
#[derive(Debug, Subcommand)]
pub enum AdminCommands {
    /// Manage user groups on a cluster.
    #[command(subcommand)]
    Group(GroupCommands),

    /// Run object, network and drive performance analysis.
    Perf(PerfArgs),
}

impl AdminCommands {
    /// Execute the command against the given environment.
    pub async fn run<W: Write>(&self, env: &AdminEnv, printer: &mut Printer<W>) -> anyhow::Result<()> {
        match self {
            Self::Group(cmd) => cmd.execute(env, printer).await,
            Self::Perf(args) => perf::execute_perf(env, args, printer).await,
        }
    }
}
