//! The `tagsmith tag` command: generate sidecar files for a folder of images.

mod run;
mod setup;
pub mod types;

pub use types::OverwritePolicy;

use std::path::PathBuf;

use clap::Args;
use tagsmith_core::pipeline::TaskSlot;
use tagsmith_core::Config;

use run::run_batch;
use setup::{setup_tagger, TagContext};

/// Arguments for the `tag` command.
#[derive(Args, Debug, Default)]
pub struct TagArgs {
    /// Image file or folder to tag
    #[arg(required = true)]
    pub input: PathBuf,

    /// Minimum score for general tags (0.0 to 1.0)
    #[arg(long)]
    pub general_threshold: Option<f32>,

    /// Minimum score for character tags (0.0 to 1.0)
    #[arg(long)]
    pub character_threshold: Option<f32>,

    /// Maximum number of general tags per image
    #[arg(long)]
    pub general_limit: Option<usize>,

    /// Maximum number of character tags per image
    #[arg(long)]
    pub character_limit: Option<usize>,

    /// Keep every character tag even when the image is tagged `solo`
    #[arg(long)]
    pub no_solo: bool,

    /// Write tags with underscores instead of spaces
    #[arg(long)]
    pub keep_underscores: bool,

    /// Policy for images that already have a sidecar file
    #[arg(long, value_enum, default_value_t = OverwritePolicy::Ask)]
    pub overwrite: OverwritePolicy,

    /// Model file (defaults to `model_dir/model_filename` from config)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Label CSV (defaults to `selected_tags*.csv` next to the model)
    #[arg(long)]
    pub labels: Option<PathBuf>,

    /// Tag this image before the rest of the folder
    #[arg(long, value_name = "IMAGE")]
    pub first: Option<PathBuf>,
}

/// Execute the tag command.
///
/// A single image goes through the same run as a folder, so the overwrite
/// policy applies to it too.
pub async fn execute(args: TagArgs, config: &Config, worker: &TaskSlot) -> anyhow::Result<()> {
    let TagContext { processor, files } = setup_tagger(&args, config).await?;

    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(());
    }
    tracing::info!("Found {} image(s) to tag", files.len());

    let summary = run_batch(worker, processor, files, args.overwrite).await?;
    if !summary.is_success() {
        if summary.aborted {
            anyhow::bail!("Tagging was stopped before every image was processed");
        }
        anyhow::bail!("{} image(s) could not be tagged", summary.failures.len());
    }
    Ok(())
}
