//! Tagsmith CLI - tag images with an ONNX tagger and edit the sidecar tags.
//!
//! Every image `name.ext` gets a `name.txt` next to it holding a
//! comma-separated tag list. The CLI can generate those files, edit them in
//! one shot or through an interactive session with undo/redo.
//!
//! # Usage
//!
//! ```bash
//! # Tag every image in a folder
//! tagsmith tag ./dataset --overwrite never
//!
//! # Count tags across the folder
//! tagsmith tags list ./dataset
//!
//! # Edit interactively with undo/redo
//! tagsmith edit ./dataset
//!
//! # View configuration
//! tagsmith config show
//! ```

use clap::{Parser, Subcommand};
use tagsmith_core::pipeline::TaskSlot;

mod cli;
mod logging;

/// Tagsmith - image tagging and sidecar tag editing.
#[derive(Parser, Debug)]
#[command(name = "tagsmith")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate sidecar tag files for a folder of images
    Tag(cli::tag::TagArgs),

    /// List, add or remove tags in sidecar files
    Tags(cli::tags::TagsArgs),

    /// Edit a folder's tags interactively with undo/redo
    Edit(cli::edit::EditArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't up yet, so config warnings go straight to stderr.
    let config = match tagsmith_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `tagsmith config path`."
            );
            tagsmith_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Tagsmith v{}", tagsmith_core::VERSION);

    // Tagging runs, bulk edits and tag scans share one worker slot.
    let worker = TaskSlot::new("background");

    match cli.command {
        Commands::Tag(args) => cli::tag::execute(args, &config, &worker).await,
        Commands::Tags(args) => cli::tags::execute(args, &config, &worker).await,
        Commands::Edit(args) => cli::edit::execute(args, &config, &worker).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
