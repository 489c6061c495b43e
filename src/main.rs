use anyhow::Result;
use clap::Parser;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use epg_automap::{
    config::Config,
    errors::AppError,
    matching::{MatchBatch, MatchEngine},
    models::{Channel, ChannelMatchResult, EpgEntry, EpgSource, MatchStatus, Stream},
};

#[derive(Parser)]
#[command(name = "epg-automap")]
#[command(version = "0.1.0")]
#[command(about = "Deterministic EPG auto-matching engine for channel name reconciliation")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Channels JSON file
    #[arg(long, value_name = "FILE")]
    channels: String,

    /// Streams JSON file
    #[arg(long, value_name = "FILE")]
    streams: Option<String>,

    /// EPG entries JSON file
    #[arg(long, value_name = "FILE")]
    epg: String,

    /// EPG sources JSON file, used for display names in the summary
    #[arg(long, value_name = "FILE")]
    sources: Option<String>,

    /// Comma-separated EPG source ids, highest priority first
    #[arg(long, value_name = "IDS")]
    source_priority: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "summary", value_parser = ["summary", "json"])]
    format: String,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("epg_automap={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting epg-automap v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load(&cli.config)?;

    let channels: Vec<Channel> = load_json(&cli.channels)?;
    let streams: Vec<Stream> = match &cli.streams {
        Some(path) => load_json(path)?,
        None => Vec::new(),
    };
    let epg_entries: Vec<EpgEntry> = load_json(&cli.epg)?;
    let sources: Vec<EpgSource> = match &cli.sources {
        Some(path) => load_json(path)?,
        None => Vec::new(),
    };
    let source_priority = cli
        .source_priority
        .as_deref()
        .map(parse_source_priority)
        .transpose()?;

    info!(
        "Loaded {} channels, {} streams, {} EPG entries",
        channels.len(),
        streams.len(),
        epg_entries.len()
    );

    let engine = MatchEngine::with_config(config.engine);
    let batch = MatchBatch {
        channels: &channels,
        streams: &streams,
        epg_entries: &epg_entries,
        source_priority,
    };

    let results = engine
        .run_batch_yielding(&batch, |current, total, name| {
            debug!("matching {}/{}: {}", current + 1, total, name);
        })
        .await;

    match cli.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&results)?),
        _ => print_summary(&results, &sources),
    }

    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &str) -> Result<Vec<T>, AppError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| AppError::input(path, e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| AppError::input(path, e.to_string()))
}

fn parse_source_priority(raw: &str) -> Result<Vec<i64>, AppError> {
    raw.split(',')
        .map(|token| {
            token.trim().parse::<i64>().map_err(|e| {
                AppError::configuration(format!("invalid source id '{token}': {e}"))
            })
        })
        .collect()
}

fn print_summary(results: &[ChannelMatchResult<'_>], sources: &[EpgSource]) {
    let source_name = |id: i64| {
        sources
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| format!("source {id}"))
    };

    let mut exact = 0usize;
    let mut multiple = 0usize;
    let mut unmatched = 0usize;

    for result in results {
        match result.status {
            MatchStatus::Exact => exact += 1,
            MatchStatus::Multiple => multiple += 1,
            MatchStatus::None => unmatched += 1,
        }

        let country = result
            .detected_country
            .as_ref()
            .map(|c| c.as_str())
            .unwrap_or("-");
        println!(
            "{} [{}] key='{}' status={:?} best={}",
            result.channel.name, country, result.normalized_name, result.status, result.best_score
        );
        for scored in result.matches_with_scores.iter().take(3) {
            println!(
                "    {:>3}  {}  ({}, {})",
                scored.confidence,
                scored.epg.tvg_id,
                scored.epg.name,
                source_name(scored.epg.source)
            );
        }
    }

    println!(
        "\n{} channels: {} exact, {} multiple, {} unmatched",
        results.len(),
        exact,
        multiple,
        unmatched
    );
}
