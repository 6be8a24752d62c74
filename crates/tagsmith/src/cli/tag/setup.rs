//! Tagger setup: config overrides, model loading, file discovery.

use std::path::PathBuf;

use tagsmith_core::pipeline::{prioritize, FileDiscovery};
use tagsmith_core::{BatchOptions, BatchProcessor, Config, InferenceEngine};

use super::TagArgs;

/// Everything a tagging run needs, assembled once.
pub(crate) struct TagContext {
    pub processor: BatchProcessor<InferenceEngine>,
    /// Images to tag, in processing order
    pub files: Vec<PathBuf>,
}

/// Validate input, load the model and discover images.
pub async fn setup_tagger(args: &TagArgs, config: &Config) -> anyhow::Result<TagContext> {
    if !args.input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the path and try again.",
            args.input
        );
    }

    let config = apply_overrides(config.clone(), args)?;
    let model_path = args.model.clone().unwrap_or_else(|| config.model_path());
    let labels_path = args.labels.clone().or_else(|| config.labels_override());

    tracing::info!("Loading model {:?}", model_path);
    let engine = tokio::task::spawn_blocking(move || {
        InferenceEngine::load(&model_path, labels_path.as_deref())
    })
    .await??;
    tracing::info!(
        "Model loaded with {} labels from {:?}",
        tagsmith_core::ImageTagger::labels(&engine).len(),
        engine.labels_path()
    );

    let files = if args.input.is_dir() {
        let mut files = FileDiscovery::from_config(&config.processing).discover(&args.input);
        if let Some(first) = &args.first {
            prioritize(&mut files, first);
        }
        files
    } else {
        vec![args.input.clone()]
    };

    let processor = BatchProcessor::new(engine, BatchOptions::from_config(&config));
    Ok(TagContext { processor, files })
}

/// Fold command-line flags over the loaded config and re-validate.
pub(crate) fn apply_overrides(mut config: Config, args: &TagArgs) -> anyhow::Result<Config> {
    if let Some(v) = args.general_threshold {
        config.tagging.general_threshold = v;
    }
    if let Some(v) = args.character_threshold {
        config.tagging.character_threshold = v;
    }
    if let Some(v) = args.general_limit {
        config.tagging.general_limit = v;
    }
    if let Some(v) = args.character_limit {
        config.tagging.character_limit = v;
    }
    if args.no_solo {
        config.tagging.enable_solo_character_limit = false;
    }
    if args.keep_underscores {
        config.tagging.convert_underscore_to_space = false;
    }
    config.validate()?;
    Ok(config)
}
