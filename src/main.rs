//! # Review RAG CLI (`review-rag`)
//!
//! Administrative entry point for the review index: batch and live ingestion,
//! live refresh with sample fallback, filtered queries and inspection.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `review-rag ingest <file>` | Index a JSON review payload |
//! | `review-rag ingest-live` | Fetch Google Play + App Store reviews and index them |
//! | `review-rag fetch-live` | Fetch live reviews without indexing |
//! | `review-rag refresh` | Rebuild the collection from live + sample data |
//! | `review-rag query "<question>"` | Filtered semantic retrieval |
//! | `review-rag list` | Show stored points |
//! | `review-rag clear` | Drop and recreate the collection |
//! | `review-rag preview <file>` | Show normalized documents without indexing |
//!
//! Every command prints JSON on stdout; logs go to stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use embedding_service::{EmbeddingModelConfig, EmbeddingService, telemetry};
use review_providers::{SerpApiConfig, StoreClient};
use review_store::{
    LiveIngestParams, LiveSources, QueryRequest, ReviewRag, StoreConfig, fetch_live, preview_payload,
};
use serde::Serialize;
use tracing::{Level, debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "info,review_store=info";

/// Crates whose events reach the log output.
const LOG_TARGETS: &[&str] = &[
    telemetry::TARGET_PREFIX,
    "review_store",
    "review_providers",
    "review_rag",
];

#[derive(Parser)]
#[command(
    name = "review-rag",
    about = "App-store review indexing and filtered retrieval over Qdrant",
    version
)]
struct Cli {
    /// Debug-level logs for the review crates.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a review payload: a list, `{"reviews": [...]}`, or
    /// `{"google_play": [...], "apple": [...]}`.
    Ingest { file: PathBuf },

    /// Fetch reviews from both stores through SerpAPI and index them.
    IngestLive {
        /// Page ceiling per store (default: `REVIEW_MAX_PAGES` or 5).
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Fetch reviews from both stores without indexing.
    FetchLive {
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Clear the collection and index live reviews merged with the sample dataset.
    Refresh {
        #[arg(long)]
        max_pages: Option<usize>,

        /// Fail instead of indexing the sample dataset alone.
        #[arg(long)]
        no_fallback: bool,
    },

    /// Retrieve evidence for a question.
    Query {
        question: String,

        /// Any supported date shape, e.g. 2025-06-01 or "June 1, 2025".
        #[arg(long)]
        start_date: Option<String>,

        /// Inclusive of the whole day.
        #[arg(long)]
        end_date: Option<String>,

        /// iOS or Android.
        #[arg(long)]
        device: Option<String>,

        /// Repeatable: --rating 4 --rating 5.
        #[arg(long = "rating")]
        ratings: Vec<i64>,

        #[arg(long)]
        country: Option<String>,

        /// v1, v2 or v3.
        #[arg(long)]
        version: Option<String>,

        /// Not filterable; mapped onto a device filter.
        #[arg(long)]
        mobile_model: Option<String>,
    },

    /// List stored reviews.
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Drop and recreate the collection.
    Clear,

    /// Normalize a payload and print documents and metadata without indexing.
    Preview {
        file: PathBuf,

        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let dotenv = dotenvy::dotenv();
    init_tracing(cli.verbose);
    if let Err(e) = dotenv {
        debug!(error = %e, ".env not loaded");
    }

    let store_cfg = StoreConfig::from_env().context("invalid review store configuration")?;
    run(cli.command, store_cfg).await
}

async fn run(command: Commands, store_cfg: StoreConfig) -> Result<()> {
    match command {
        Commands::Ingest { file } => {
            let payload = read_payload(&file)?;
            let rag = connect(store_cfg)?;
            print_json(&rag.pipeline().ingest_from_payload(payload).await?)
        }
        Commands::IngestLive { max_pages } => {
            let (sources, params) = live_sources(max_pages)?;
            let rag = connect(store_cfg)?;
            print_json(&rag.pipeline().ingest_live(&sources, &params).await?)
        }
        Commands::FetchLive { max_pages } => {
            let (sources, params) = live_sources(max_pages)?;
            let reviews = fetch_live(&sources, &params).await;
            print_json(&serde_json::json!({ "count": reviews.len(), "reviews": reviews }))
        }
        Commands::Refresh {
            max_pages,
            no_fallback,
        } => {
            let rag = connect(store_cfg)?;
            // A missing SerpAPI key is a live failure like any other.
            let outcome = match live_sources(max_pages) {
                Ok((sources, params)) => {
                    rag.pipeline()
                        .refresh_live(&sources, &params, !no_fallback)
                        .await?
                }
                Err(e) if !no_fallback => {
                    info!(error = %e, "live sources unavailable, using sample dataset");
                    rag.pipeline().fallback_to_sample(e.to_string()).await?
                }
                Err(e) => return Err(e),
            };
            print_json(&outcome)
        }
        Commands::Query {
            question,
            start_date,
            end_date,
            device,
            ratings,
            country,
            version,
            mobile_model,
        } => {
            let req = QueryRequest {
                question,
                start_date,
                end_date,
                device,
                ratings,
                country,
                version,
                mobile_model,
            };
            let rag = connect(store_cfg)?;
            print_json(&rag.engine().query(&req).await?)
        }
        Commands::List { limit } => {
            let rag = connect(store_cfg)?;
            print_json(&rag.store().list_points(limit).await?)
        }
        Commands::Clear => {
            let rag = connect(store_cfg)?;
            rag.store().clear_and_recreate().await?;
            print_json(&serde_json::json!({
                "status": "ok",
                "collection": rag.store().collection(),
            }))
        }
        Commands::Preview { file, limit } => {
            let payload = read_payload(&file)?;
            print_json(&preview_payload(payload, limit, &store_cfg.normalize)?)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        telemetry::env_filter_with_level(DEFAULT_LOG_FILTER, LOG_TARGETS, Level::DEBUG)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(telemetry::layer(LOG_TARGETS))
        .init();
}

fn connect(cfg: StoreConfig) -> Result<ReviewRag> {
    let embedding_cfg =
        EmbeddingModelConfig::from_env().context("invalid embedding configuration")?;
    let embedder = Arc::new(EmbeddingService::new(embedding_cfg)?);
    Ok(ReviewRag::connect(cfg, embedder)?)
}

fn live_sources(max_pages: Option<usize>) -> Result<(LiveSources<StoreClient>, LiveIngestParams)> {
    let serp = SerpApiConfig::from_env()?;
    let (google_play, apple) = StoreClient::pair_from_config(&serp)?;
    let mut params = LiveIngestParams::from_serpapi(&serp);
    if let Some(n) = max_pages {
        params.max_pages = n;
    }
    Ok((LiveSources { google_play, apple }, params))
}

fn read_payload(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
