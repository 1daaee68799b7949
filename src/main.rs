use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(name = "relaybot")]
#[command(about = "Slash-command and event bot built from declarative descriptors", long_about = None)]
struct Cli {
    /// Settings file
    #[arg(short, long, global = true, default_value = "settings.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish commands, subscribe events and feed gateway frames from stdin
    Run,
    /// Publish the discovered commands and wait for the result
    Publish {
        /// Print the payload instead of calling the API
        #[arg(long)]
        dry_run: bool,
    },
    /// List discovered commands and events
    List,
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Tokens live in .env next to the settings file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) | None => {
            println!("relaybot {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Run) => cli::cmd_run(&cli.config).await?,
        Some(Commands::Publish { dry_run }) => cli::cmd_publish(&cli.config, dry_run).await?,
        Some(Commands::List) => cli::cmd_list(&cli.config)?,
    }

    Ok(())
}
