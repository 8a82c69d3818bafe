mod directory;
mod report;
mod snapshot;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::report::ReportArgs;
use crate::snapshot::SnapshotCommands;

#[derive(Debug, Parser)]
#[command(name = "bizdash-cli")]
#[command(about = "Business Profile analytics from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List locations from the configured data source
    Locations {
        /// Only locations of this brand
        #[arg(long)]
        brand: Option<String>,
    },
    /// List Business Profile accounts visible to the access token
    Accounts,
    /// Print dashboard KPIs for a selection
    Report(ReportArgs),
    /// Work with static snapshot files
    Snapshot {
        #[command(subcommand)]
        command: SnapshotCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = bizdash_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Locations { brand }) => {
            directory::run_locations(&config, brand.as_deref()).await?;
        }
        Some(Commands::Accounts) => directory::run_accounts(&config).await?,
        Some(Commands::Report(args)) => report::run_report(&config, &args).await?,
        Some(Commands::Snapshot { command }) => snapshot::run_snapshot(command)?,
        None => println!("bizdash-cli: run with --help to list commands"),
    }

    Ok(())
}
