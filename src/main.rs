use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use research_reader::config::{load_config, Config};
use research_reader::models::SearchRequest;
use research_reader::sources::{PmcSource, PubMedSource};
use research_reader::utils::HttpClient;

/// Research Reader - retrieve and extract biomedical literature for narration
#[derive(Parser, Debug)]
#[command(name = "research-reader")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search PubMed and extract open-access full text", long_about = None)]
struct Cli {
    /// Enable verbose logging (can be used multiple times: -v, -vv, -vvv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search PubMed and print enriched, citation-formatted summaries
    Search {
        /// Free-text query keywords
        query: String,

        /// Earliest publication date (e.g. "2020")
        #[arg(long)]
        mindate: Option<String>,

        /// Maximum number of results
        #[arg(long)]
        retmax: Option<usize>,
    },

    /// Fetch the full text of an open-access article by PMID
    Fulltext {
        /// PubMed identifier of the article
        pmid: String,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    let config = Arc::new(config);

    let client = Arc::new(HttpClient::with_timeouts(
        Duration::from_secs(config.http.timeout_secs),
        Duration::from_secs(config.http.connect_timeout_secs),
    ));

    match cli.command {
        Commands::Search {
            query,
            mindate,
            retmax,
        } => {
            let mut request = SearchRequest::new(query);
            if let Some(mindate) = mindate {
                request = request.mindate(mindate);
            }
            if let Some(retmax) = retmax {
                request = request.retmax(retmax);
            }

            let source = PubMedSource::new(config, client);
            let papers = source.search(&request).await?;
            println!("{}", serde_json::to_string_pretty(&papers)?);
        }
        Commands::Fulltext { pmid } => {
            let source = PmcSource::new(config, client);
            let outcome = source.full_text(&pmid).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}
