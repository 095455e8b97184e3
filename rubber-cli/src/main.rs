//! rubber CLI - issue requests against a document store from the shell.
//!
//! # Commands
//!
//! - `rubber get <id>` - Fetch a document
//! - `rubber put <id> <json>` - Index a document
//! - `rubber delete <id>` - Delete a document
//! - `rubber search [json]` - Search and list hits
//! - `rubber count [json]` - Count matching documents
//! - `rubber mapping [--put json]` - Show or replace the mapping

use clap::{Parser, Subcommand};
use colored::Colorize;
use rubber_core::{Client, Settings};
use rubber_http::TransportConfig;
use rubber_log::{LogConfig, LogLevel};
use std::time::Duration;

mod commands;
mod error;

use error::CliResult;

/// rubber - document-store requests from the command line
#[derive(Parser, Debug)]
#[command(name = "rubber")]
#[command(version)]
#[command(about = "Issue get/put/delete/search/count/mapping requests against a document store")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the document store
    #[arg(long, global = true, env = "ELASTICSEARCH_URL")]
    url: Option<String>,

    /// Index name
    #[arg(short, long, global = true)]
    index: Option<String>,

    /// Document type
    #[arg(short = 't', long = "type", global = true)]
    doc_type: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    /// Fail with the transport error instead of reporting a missing response
    #[arg(long, global = true)]
    raise: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a document
    Get { id: String },

    /// Index a document
    Put { id: String, json: String },

    /// Delete a document
    #[command(alias = "rm")]
    Delete { id: String },

    /// Search and list hits
    #[command(alias = "s")]
    Search { query: Option<String> },

    /// Count matching documents
    Count { query: Option<String> },

    /// Show or replace the mapping
    Mapping {
        /// New mapping to PUT
        #[arg(long)]
        put: Option<String>,
    },
}

fn build_client(cli: &Cli) -> CliResult<Client> {
    let settings = Settings::from_env();
    let mut builder = Client::builder()
        .transport_config(
            TransportConfig::builder()
                .timeout(Duration::from_secs(cli.timeout))
                .build(),
        )
        .raise_on_error(cli.raise || settings.raise_on_error)
        .auto_index(false)
        .settings(settings);

    if let Some(url) = &cli.url {
        builder = builder.base_url(url.clone());
    }
    if let Some(index) = &cli.index {
        builder = builder.index(index.clone());
    }
    if let Some(doc_type) = &cli.doc_type {
        builder = builder.doc_type(doc_type.clone());
    }

    Ok(builder.build()?)
}

async fn run(cli: Cli) -> CliResult<()> {
    let client = build_client(&cli)?;

    match &cli.command {
        Commands::Get { id } => commands::get(&client, id).await,
        Commands::Put { id, json } => commands::put(&client, id, json).await,
        Commands::Delete { id } => commands::delete(&client, id).await,
        Commands::Search { query } => commands::search(&client, query.as_deref()).await,
        Commands::Count { query } => commands::count(&client, query.as_deref()).await,
        Commands::Mapping { put } => commands::mapping(&client, put.as_deref()).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut log_config = LogConfig::from_env();
    if cli.verbose {
        log_config = log_config.level(LogLevel::Debug);
    }
    let guard = log_config.init();

    if let Err(e) = run(cli).await {
        eprintln!("\n  {} {}\n", "Error:".red().bold(), e);
        drop(guard);
        std::process::exit(1);
    }
}
