//! docrecord CLI - record access over MongoDB, PostgreSQL or memory
//!
//! Reads and writes schema-less records in named collections:
//! - `get-all`, `get`, `create`, `update`, `delete` on a collection
//! - `config path|show` to inspect `~/.docrecord/config.toml`
//!
//! The backend follows the connection string scheme.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docrecord_core::{ConnectionRegistry, RecordProvider};
use tracing::debug;

mod backend;
mod config;
mod records;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "docrecord",
    author,
    version,
    about = "Read and write document records in MongoDB, PostgreSQL or memory"
)]
struct Cli {
    /// Connection string (mongodb://, postgres://, memory://)
    #[arg(long, env = "DOCRECORD_URL", global = true, hide_env_values = true)]
    url: Option<String>,

    /// Config file (default: ~/.docrecord/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Records(RecordCommands),
    /// Inspect docrecord configuration (path, show)
    Config(config::ConfigArgs),
}

#[derive(Subcommand, Debug)]
enum RecordCommands {
    /// Print every record in a collection
    GetAll(records::GetAllArgs),
    /// Print one record by id
    Get(records::GetArgs),
    /// Insert a record and print it with its id
    Create(records::CreateArgs),
    /// Set fields on a record and print the result
    Update(records::UpdateArgs),
    /// Delete a record by id; prints whether one was removed
    Delete(records::DeleteArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_files = config::load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    debug!(files = ?dotenv_files, "Loaded .env files");

    let command = match cli.command {
        Commands::Config(args) => {
            return config::run_config(args, cli.url, cli.config.as_deref());
        }
        Commands::Records(command) => command,
    };

    let settings = config::load_config(cli.config.as_deref())?;
    let resolved = config::resolve(cli.url, &settings)?;
    let backend = backend::select(&resolved.connection_string)?;
    debug!(?backend, "Selected backend");

    let registry = Arc::new(ConnectionRegistry::new(backend.connector()));
    let provider = RecordProvider::new(
        Arc::clone(&registry),
        &resolved.connection_string,
        resolved.options,
    )?;

    let result = run_records(&provider, command).await;

    // Only close what was opened; a failed connect leaves nothing to close
    if !registry.is_empty().await {
        let closed = provider.close_connection().await;
        result?;
        closed?;
        return Ok(());
    }

    result
}

async fn run_records(provider: &RecordProvider, command: RecordCommands) -> Result<()> {
    match command {
        RecordCommands::GetAll(args) => records::run_get_all(provider, args).await,
        RecordCommands::Get(args) => records::run_get(provider, args).await,
        RecordCommands::Create(args) => records::run_create(provider, args).await,
        RecordCommands::Update(args) => records::run_update(provider, args).await,
        RecordCommands::Delete(args) => records::run_delete(provider, args).await,
    }
}
