//! Offline analytics over a local file.
//!
//! Runs the same pipeline as the HTTP service against a single file, without a search index or
//! annotation provider, and prints the response as JSON on stdout.
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use docanalytics::{
    analytics::{AnalyticsSettings, AnonymizationStrategy, SummaryOrder},
    config::Config,
    logging,
    processing::{
        AnalyticsApi, AnalyticsService, AnonymizeRequest, ClusteringRequest, DocumentInput,
        DocumentsRequest, KeywordsRequest, StatisticsRequest, SummarizeRequest, SummaryStrategy,
        TableInput, TrendRequest,
    },
    storage::LocalFileStore,
};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "analyze",
    about = "Run document analytics on a local file and print JSON"
)]
struct Cli {
    /// Pretty-print the JSON output.
    #[arg(long, global = true)]
    pretty: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Most frequent terms per document.
    Keywords {
        file: PathBuf,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Extractive summary per document.
    Summarize {
        file: PathBuf,
        #[arg(long)]
        sentences: Option<usize>,
        #[arg(long, value_enum, default_value_t = Extractive::ByScore)]
        strategy: Extractive,
        /// Order score-ranked sentences by score instead of position.
        #[arg(long)]
        by_score_order: bool,
    },
    /// Numeric column statistics of a CSV or JSON dataset.
    Statistics { file: PathBuf },
    /// Next-value prediction for a numeric column.
    Trend {
        file: PathBuf,
        #[arg(long)]
        column: Option<String>,
    },
    /// K-means clustering; text files contribute one document per line.
    Cluster {
        file: PathBuf,
        #[arg(long)]
        k: Option<usize>,
        #[arg(long)]
        max_iterations: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Clinical section per sentence.
    Segment { file: PathBuf },
    /// Regex anonymization.
    Anonymize { file: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Extractive {
    FirstN,
    ByScore,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init_tracing_stderr();
    let cli = Cli::parse();
    let settings = Config::from_env()
        .context("invalid analytics configuration")?
        .analytics_settings();

    match cli.command {
        Command::Keywords { file, limit } => {
            let (service, name) = service_for(&file, settings)?;
            let request = KeywordsRequest {
                input: DocumentInput::from_file(name),
                limit,
                ..KeywordsRequest::default()
            };
            print(&service.extract_keywords(request).await?, cli.pretty)
        }
        Command::Summarize {
            file,
            sentences,
            strategy,
            by_score_order,
        } => {
            let (service, name) = service_for(&file, settings)?;
            let request = SummarizeRequest {
                input: DocumentInput::from_file(name),
                strategy: match strategy {
                    Extractive::FirstN => SummaryStrategy::FirstN,
                    Extractive::ByScore => SummaryStrategy::ByScore,
                },
                sentences,
                order: if by_score_order {
                    SummaryOrder::Score
                } else {
                    SummaryOrder::Document
                },
                index: None,
            };
            print(&service.summarize(request).await?, cli.pretty)
        }
        Command::Statistics { file } => {
            let (service, name) = service_for(&file, settings)?;
            let request = StatisticsRequest {
                input: table_input(name),
                index: None,
            };
            print(&service.describe_dataset(request).await?, cli.pretty)
        }
        Command::Trend { file, column } => {
            let (service, name) = service_for(&file, settings)?;
            let request = TrendRequest {
                input: table_input(name),
                column,
                index: None,
            };
            print(&service.predict_trend(request).await?, cli.pretty)
        }
        Command::Cluster {
            file,
            k,
            max_iterations,
            seed,
        } => {
            let (service, name) = service_for(&file, settings)?;
            let request = ClusteringRequest {
                input: DocumentInput::from_file(name),
                k,
                max_iterations,
                seed,
                index: None,
            };
            print(&service.cluster_documents(request).await?, cli.pretty)
        }
        Command::Segment { file } => {
            let (service, name) = service_for(&file, settings)?;
            let request = DocumentsRequest {
                input: DocumentInput::from_file(name),
                index: None,
            };
            print(&service.segment_documents(request).await?, cli.pretty)
        }
        Command::Anonymize { file } => {
            let (service, name) = service_for(&file, settings)?;
            let request = AnonymizeRequest {
                input: DocumentInput::from_file(name),
                strategy: AnonymizationStrategy::Regex,
                index: None,
            };
            print(&service.anonymize_documents(request).await?, cli.pretty)
        }
    }
}

/// Root a file store at the file's directory and return the name to read from it.
fn service_for(file: &Path, settings: AnalyticsSettings) -> Result<(AnalyticsService, String)> {
    let name = file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("{} does not name a file", file.display()))?
        .to_string();
    let root = file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let store = Arc::new(LocalFileStore::new(root));
    Ok((AnalyticsService::with_file_store(settings, store), name))
}

fn table_input(name: String) -> TableInput {
    TableInput {
        file: Some(name),
        table: None,
    }
}

fn print<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
