use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docqa_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Chat with your PDFs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        #[arg(short, long, default_value = "8000")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Print persisted sessions as JSON
    Sessions,
    /// Extract and chunk a PDF without storing anything
    Ingest { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(config, &host, port).await,
        Commands::Sessions => commands::sessions::run(&config).await,
        Commands::Ingest { file } => commands::ingest::run(&config, file).await,
    }
}
