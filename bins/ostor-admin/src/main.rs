use clap::Parser;
use tracing_subscriber::EnvFilter;

use ostor_cli::commands::AdminCommands;
use ostor_cli::connection::{AdminEnv, ConnectionOptions};
use ostor_cli::output::Printer;

/// ostor Administration Tool
///
/// Command-line interface for managing an ostor object-storage cluster.
/// Provides commands for user group management and for running performance
/// analysis against a cluster, with results uploaded to the support portal
/// or saved locally.
#[derive(Parser, Debug)]
#[command(name = "ostor-admin", version, about)]
struct Cli {
    /// Connection and portal options.
    #[command(flatten)]
    connection: ConnectionOptions,

    /// Enable verbose logging.
    #[arg(long, default_value_t = false)]
    verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: AdminCommands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing.
    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .with_writer(std::io::stderr)
        .init();

    let env = AdminEnv::new(cli.connection)?;
    let mut printer = Printer::stdout(env.output_format());

    match cli.command.run(&env, &mut printer).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = printer.print_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}
