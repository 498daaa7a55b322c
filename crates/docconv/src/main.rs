//! docconv - inspect and build collaborative document snapshots
//!
//! Reads stored binary snapshots the way the rendering and indexing paths
//! do, and builds snapshots from JSON documents for seeding and fixtures.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use collab::{ConversionSettings, SettingsManager, SnapshotLoader};
use doc_model::Document;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "docconv")]
#[command(about = "Convert between document snapshots and JSON documents")]
struct Cli {
    /// Conversion settings file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the JSON document stored in a snapshot
    Decode { snapshot: PathBuf },
    /// Build a snapshot from a JSON document
    Encode {
        json: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the plain text of a snapshot
    Text { snapshot: PathBuf },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let loader = SnapshotLoader::new(load_settings(cli.config.as_deref())?);

    match cli.command {
        Command::Decode { snapshot } => {
            let bytes = read_snapshot(&snapshot)?;
            let output = match loader.load(&bytes) {
                Some(document) => document.to_json_string()?,
                None => "null".to_string(),
            };
            println!("{output}");
        }
        Command::Encode { json, output } => {
            let source = fs::read_to_string(&json)
                .with_context(|| format!("Failed to read {}", json.display()))?;
            let document = Document::from_json_str(&source)
                .with_context(|| format!("Invalid document in {}", json.display()))?;

            let bytes = loader.write(&document);
            fs::write(&output, &bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            tracing::info!(path = %output.display(), bytes = bytes.len(), "Wrote snapshot");
        }
        Command::Text { snapshot } => {
            let bytes = read_snapshot(&snapshot)?;
            if let Some(text) = loader.load_text(&bytes) {
                println!("{text}");
            }
        }
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<ConversionSettings> {
    let Some(path) = path else {
        return Ok(ConversionSettings::default());
    };

    let mut manager = SettingsManager::new(path);
    let settings = manager
        .load_sync()
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    tracing::debug!(?settings, "Loaded conversion settings");
    Ok(settings.clone())
}

fn read_snapshot(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}
