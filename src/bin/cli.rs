//! crawlstore CLI
//!
//! Operates directly on a crawlstore data directory: stores crawl files and
//! prints query results as pretty JSON.

use std::fs;
use std::path::{Path, PathBuf};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};
use crawlstore::model::{ProcessedCrawl, RawCrawl};
use crawlstore::{Config, CrawlError, CrawlRepository, Direction, LogStore, Result};

/// crawlstore CLI
#[derive(Parser, Debug)]
#[command(name = "crawlstore-cli")]
#[command(about = "Store and query network crawls")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./crawlstore_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the tables
    Init {
        /// Drop existing tables first
        #[arg(long)]
        recreate: bool,
    },

    /// Store a raw crawl read from a JSON file
    StoreRaw {
        file: PathBuf,
    },

    /// Store a processed crawl, diffing it against an optional previous one
    StoreProcessed {
        /// The new processed crawl (JSON)
        new: PathBuf,

        /// The previous processed crawl (JSON)
        #[arg(long)]
        old: Option<PathBuf>,
    },

    /// Print the most recent raw crawl
    LatestRaw,

    /// Print one raw crawl by its time range key
    Raw {
        key: String,
    },

    /// Print a crawl summary (the latest one without a key)
    CrawlInfo {
        key: Option<String>,
    },

    /// Print the latest state of a node
    NodeState {
        pubkey: String,
    },

    /// Print every recorded change of a node
    NodeHistory {
        pubkey: String,
    },

    /// Print per-node stats of a crawl
    NodeStats {
        crawl: String,
    },

    /// Print a node's edges in a crawl
    Connections {
        crawl: String,
        pubkey: String,

        /// in | out
        #[arg(long, default_value = "out")]
        direction: String,
    },

    /// Print every edge of a crawl
    AllConnections {
        crawl: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,crawlstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("crawlstore v{}", crawlstore::VERSION);
    tracing::debug!("Data directory: {}", args.data_dir.display());

    let recreate = matches!(args.command, Commands::Init { recreate: true });
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .recreate_tables(recreate)
        .build();

    let repo = match CrawlRepository::open(&config) {
        Ok(repo) => repo,
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = run(&repo, args.command).and_then(|()| repo.store().sync());
    if let Err(e) = outcome {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(repo: &CrawlRepository<LogStore>, command: Commands) -> Result<()> {
    match command {
        Commands::Init { recreate } => {
            // Tables were created (or recreated) by open
            tracing::info!(recreate, "tables ready");
            Ok(())
        }
        Commands::StoreRaw { file } => {
            let crawl: RawCrawl = read_json(&file)?;
            print_json(&repo.store_raw_crawl(&crawl)?)
        }
        Commands::StoreProcessed { new, old } => {
            let new: ProcessedCrawl = read_json(&new)?;
            let old: Option<ProcessedCrawl> = old.as_deref().map(read_json).transpose()?;
            print_json(&repo.store_processed_crawl(&new, old.as_ref())?)
        }
        Commands::LatestRaw => print_json(&repo.get_latest_raw_crawl()?),
        Commands::Raw { key } => print_json(&repo.get_raw_crawl_by_key(&key)?),
        Commands::CrawlInfo { key } => print_json(&repo.get_crawl_info(key.as_deref())?),
        Commands::NodeState { pubkey } => print_json(&repo.get_node_state(&pubkey)?),
        Commands::NodeHistory { pubkey } => print_json(&repo.get_node_history(&pubkey)?),
        Commands::NodeStats { crawl } => print_json(&repo.get_crawl_node_stats(&crawl)?),
        Commands::Connections {
            crawl,
            pubkey,
            direction,
        } => {
            let direction: Direction = direction.parse()?;
            print_json(&repo.get_connections(&crawl, &pubkey, direction)?)
        }
        Commands::AllConnections { crawl } => print_json(&repo.get_all_connections(&crawl)?),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| {
        CrawlError::InvalidArgument(format!("{}: {}", path.display(), e))
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
