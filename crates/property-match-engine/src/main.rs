use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use property_match_engine::ingestion::PropertyCsvLoader;
use property_match_engine::logging::init_logger;
use property_match_engine::{DialogueOrchestrator, Settings, TemplateComposer};

#[derive(Parser, Debug)]
#[command(
    name = "property-match-engine",
    version,
    about = "Conversational rental listing search over CSV data"
)]
struct Args {
    /// CSV file or directory of region CSV files
    #[arg(long)]
    data: Option<PathBuf>,

    /// Only load directory files whose name starts with this prefix
    #[arg(long)]
    region: Option<String>,

    /// Maximum listings per reply
    #[arg(long)]
    limit: Option<usize>,

    /// Maximum rows read per CSV file
    #[arg(long)]
    row_limit: Option<usize>,

    /// Conversation thread id (default: new UUID)
    #[arg(long)]
    thread: Option<String>,

    /// Print each turn outcome as JSON instead of the reply text
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load().context("Failed to load configuration")?;
    if let Some(limit) = args.limit {
        settings.engine.default_limit = limit;
    }
    if args.data.is_some() {
        settings.ingestion.data_path = args.data.clone();
    }
    if args.region.is_some() {
        settings.ingestion.region = args.region.clone();
    }
    if args.row_limit.is_some() {
        settings.ingestion.row_limit = args.row_limit;
    }
    settings.validate()?;

    init_logger(&settings.logging)?;
    info!("Starting property match engine");

    let orchestrator = DialogueOrchestrator::new(settings.clone());

    match &settings.ingestion.data_path {
        Some(path) => {
            let loaded = PropertyCsvLoader::new(settings.fields.region.clone())
                .load(
                    path,
                    settings.ingestion.region.as_deref(),
                    settings.ingestion.row_limit,
                )
                .with_context(|| format!("Failed to load listings from {:?}", path))?;
            let summary = orchestrator.load_listings(loaded.records);
            info!(
                "Regions {:?}: {} stored, {} indexed",
                loaded.regions, summary.stored, summary.indexed
            );
        }
        None => warn!("No listing data configured; searches will return nothing"),
    }

    let thread_id = args
        .thread
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    orchestrator.memory().set_thread(&thread_id);

    let composer = TemplateComposer::new(
        settings.fields.clone(),
        settings.engine.default_limit,
    );

    let first = orchestrator.slot_status(&thread_id);
    if let Some(prompt) = first.next_prompt {
        println!("{}", prompt);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        let turn = orchestrator.respond(&thread_id, message, &composer).await?;
        if turn.outcome.is_complete() {
            info!("All slots filled on thread {}", thread_id);
        }
        if args.json {
            println!("{}", serde_json::to_string_pretty(&turn)?);
        } else {
            println!("{}", turn.reply);
        }
    }

    info!("Input closed, shutting down thread {}", thread_id);
    Ok(())
}
