//! TTML track builder
//!
//! Builds a subtitle track from TTML files and prints a JSON summary of the
//! samples, durations and sample entry a container writer would receive.

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttml_track::{
    DefaultFetcher, SampleDescription, SubSampleInformation, Track, TrackConfig, TrackMetadata,
    TtmlDocument, TtmlError, TtmlTrack,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "ttml-track";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Track configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// TTML documents, one sample each, in track order
    #[arg(required = true)]
    documents: Vec<PathBuf>,
}

/// JSON summary of a built track
#[derive(Debug, Serialize)]
struct TrackSummary<'a> {
    name: &'a str,
    handler: &'a str,
    metadata: &'a TrackMetadata,
    raw_durations_ms: &'a [i64],
    scaled_durations: Vec<i64>,
    sample_sizes: Vec<u64>,
    subsample_layouts: Vec<&'a [u64]>,
    subsample_information: &'a SubSampleInformation,
    sample_description: &'a SampleDescription,
}

fn main() {
    let args = Args::parse();

    init_logging(args.json_logs);
    tracing::info!("{} v{} starting", APP_NAME, VERSION);

    if let Err(e) = run(&args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> ttml_track::Result<()> {
    let config = match &args.config {
        Some(path) => TrackConfig::from_file(path)?,
        None => TrackConfig::default(),
    };
    tracing::debug!("Configuration loaded: {:?}", config);

    let documents = args
        .documents
        .iter()
        .map(TtmlDocument::from_file)
        .collect::<ttml_track::Result<Vec<_>>>()?;

    let name = args
        .documents
        .first()
        .and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "subtitles".to_string());

    let track = TtmlTrack::build(name, &documents, &config, &DefaultFetcher::new())?;

    let summary = TrackSummary {
        name: track.name(),
        handler: track.handler(),
        metadata: track.track_metadata(),
        raw_durations_ms: track.raw_durations(),
        scaled_durations: track.sample_durations(),
        sample_sizes: track.samples().iter().map(|s| s.size()).collect(),
        subsample_layouts: track
            .subsample_layouts()
            .iter()
            .map(|l| l.segments())
            .collect(),
        subsample_information: track.subsample_information(),
        sample_description: track.sample_description(),
    };
    let json =
        serde_json::to_string_pretty(&summary).map_err(|e| TtmlError::Config(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

/// Initialize logging with tracing. Logs go to stderr so stdout stays JSON.
fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ttml_track=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
