//! GenScene - Main entry point
//!
//! Opens the interactive viewer, or generates a single scene document to
//! stdout when `--prompt` is given.

mod app;
mod config;
mod objects;
mod scene;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use genscene_core::SceneDocument;
use genscene_gen::SceneGenerator;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "genscene")]
#[command(about = "Generate 3D scenes from text prompts and explore them in a viewer")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "genscene.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Generate a scene for this prompt, print it as JSON, and exit
    /// without opening the viewer
    #[arg(short, long)]
    prompt: Option<String>,

    /// Open the viewer on a scene document loaded from a JSON file
    #[arg(short, long)]
    scene: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("GenScene v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config(&args.config)?;
    let generator = SceneGenerator::from_env(config.generation.clone())?;

    if let Some(prompt) = args.prompt {
        // One-shot generation mode
        info!(prompt = %prompt, "Generating single scene");
        let document = generator.generate_blocking(&prompt)?;
        println!("{}", document.to_json_pretty()?);
        return Ok(());
    }

    if !generator.has_credential() {
        info!(
            "{} is not set; the viewer will open but generation will fail \
             until a key is provided",
            genscene_gen::API_KEY_ENV
        );
    }

    let initial = match &args.scene {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let document = SceneDocument::from_json(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            document.validate()?;
            info!(
                path = %path.display(),
                objects = document.objects.len(),
                lights = document.lights.len(),
                "Loaded scene document"
            );
            document
        }
        None => SceneDocument::demo(),
    };

    app::run(generator, initial);
    Ok(())
}
