// Sightline Command Line Interface
// Replays recorded detections through the narration pipeline and answers questions

mod replay;

use anyhow::Context;
use clap::{Parser, Subcommand};
use replay::Queries;
use sightline_core::NarrationConfig;
use sightline_eye::NarrationPipeline;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sightline")]
#[command(about = "Narrates objects seen in a stream of detections", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines detections file through the pipeline
    Replay {
        /// Detections file, one frame per line ("-" for stdin)
        input: PathBuf,

        /// Configuration file (TOML, YAML or JSON)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Ask where an item is after the last frame
        #[arg(long = "where-is", value_name = "LABEL")]
        where_is: Vec<String>,

        /// Ask when an item was seen
        #[arg(long, value_name = "LABEL")]
        when: Vec<String>,

        /// Ask what is between the viewer and an item
        #[arg(long, value_name = "LABEL")]
        between: Vec<String>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate a configuration file
    CheckConfig {
        /// Configuration file path
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Replay {
            input,
            config,
            where_is,
            when,
            between,
            json,
        } => {
            let queries = Queries {
                where_is,
                when,
                between,
            };
            run_replay(&input, config.as_deref(), &queries, json)?;
        }
        Commands::CheckConfig { file } => {
            check_config(&file)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<NarrationConfig> {
    match path {
        Some(path) => {
            let config = NarrationConfig::load(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            debug!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(NarrationConfig::default()),
    }
}

fn run_replay(
    input: &Path,
    config_path: Option<&Path>,
    queries: &Queries,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let frames = if input == Path::new("-") {
        replay::read_frames(io::stdin().lock())?
    } else {
        let file = File::open(input)
            .with_context(|| format!("failed to open {}", input.display()))?;
        replay::read_frames(BufReader::new(file))?
    };
    info!("Replaying {} frames", frames.len());

    let mut pipeline = NarrationPipeline::new(&config);
    let outputs = replay::replay(&mut pipeline, frames);
    let answers = replay::answer(&pipeline, queries);

    if json {
        for output in &outputs {
            println!("{}", serde_json::to_string(output)?);
        }
        println!("{}", serde_json::to_string_pretty(&answers)?);
    } else {
        for output in &outputs {
            println!("{}", replay::render_frame(output));
        }
        println!();
        println!("{}", replay::render_answers(&answers));
    }

    Ok(())
}

fn check_config(path: &Path) -> anyhow::Result<()> {
    match NarrationConfig::load(path) {
        Ok(config) => {
            println!("✅ {} is valid", path.display());
            println!(
                "   tracker: iou > {}, absence {} frames, min {} frames",
                config.tracker.iou_threshold,
                config.tracker.allowed_absence,
                config.tracker.min_frames_for_track
            );
            println!(
                "   subsumption: {} ({} groups)",
                if config.subsumption.enabled { "on" } else { "off" },
                config.subsumption.groups.len()
            );
            println!("   custom categories: {}", config.scene.custom_categories.len());
            Ok(())
        }
        Err(e) => {
            println!("❌ {} is invalid", path.display());
            Err(e).with_context(|| format!("checking {}", path.display()))
        }
    }
}
