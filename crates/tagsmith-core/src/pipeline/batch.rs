//! Batch tagging - runs every image through decode, inference, the solo rule
//! and formatting, then writes its sidecar.
//!
//! Images are processed strictly in order. Per-image problems (unreadable
//! image, inference failure, nothing above threshold, write failure) are
//! recorded and the run moves on; only a stop request ends a run early.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::Config;
use crate::error::PipelineError;
use crate::inference::ImageTagger;
use crate::store::tag_file::TagFileStore;
use crate::tagging::format::format_tags;
use crate::tagging::solo::apply_solo_rule;
use crate::types::SelectionConfig;

use super::decode::ImageDecoder;
use super::worker::StopFlag;

/// Per-run tagging options.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Thresholds and caps
    pub selection: SelectionConfig,
    /// Keep one character when the image is tagged `solo`
    pub enable_solo_rule: bool,
    /// Render underscores as spaces in the sidecar
    pub convert_underscore: bool,
    /// Largest accepted image side
    pub max_image_dimension: u32,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl BatchOptions {
    /// Options as configured in the `[tagging]` and `[processing]` sections.
    pub fn from_config(config: &Config) -> Self {
        Self {
            selection: config.selection(),
            enable_solo_rule: config.tagging.enable_solo_character_limit,
            convert_underscore: config.tagging.convert_underscore_to_space,
            max_image_dimension: config.processing.max_image_dimension,
        }
    }
}

/// Why an image produced no sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Load,
    Inference,
    EmptyResult,
    Write,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Load => "could not load image",
            Self::Inference => "inference failed",
            Self::EmptyResult => "no tags above threshold",
            Self::Write => "could not write tags",
        })
    }
}

/// Terminal state of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// Sidecar existed and overwriting was declined
    Skipped,
    /// Sidecar written at this path
    Written(PathBuf),
    Failed(FailureKind),
}

/// Display hint for a [`RunEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Progress notification; advisory only.
///
/// `index` is zero-based; the `Display` form shows it one-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Processing {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    Skipped {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    Written {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    Failed {
        index: usize,
        total: usize,
        path: PathBuf,
        kind: FailureKind,
        message: String,
    },
    Aborted {
        index: usize,
        total: usize,
    },
}

impl RunEvent {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Processing { .. } => Severity::Info,
            Self::Written { .. } => Severity::Success,
            Self::Skipped { .. } => Severity::Warning,
            Self::Failed {
                kind: FailureKind::EmptyResult,
                ..
            } => Severity::Warning,
            Self::Failed { .. } | Self::Aborted { .. } => Severity::Error,
        }
    }

    /// Zero-based position of the image this event is about.
    pub fn index(&self) -> usize {
        match self {
            Self::Processing { index, .. }
            | Self::Skipped { index, .. }
            | Self::Written { index, .. }
            | Self::Failed { index, .. }
            | Self::Aborted { index, .. } => *index,
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl fmt::Display for RunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processing { index, total, path } => {
                write!(f, "[{}/{}] Processing {}", index + 1, total, path.display())
            }
            Self::Skipped { index, total, path } => write!(
                f,
                "[{}/{}] Skipped {} (tags already exist)",
                index + 1,
                total,
                file_name(path)
            ),
            Self::Written { index, total, path } => {
                write!(f, "[{}/{}] Wrote {}", index + 1, total, file_name(path))
            }
            Self::Failed {
                index,
                total,
                path,
                kind,
                message,
            } => write!(
                f,
                "[{}/{}] {}: {kind} ({message})",
                index + 1,
                total,
                file_name(path)
            ),
            Self::Aborted { index, total } => write!(
                f,
                "Tagging stopped by user ({} of {} images not processed)",
                total - index,
                total
            ),
        }
    }
}

type OverwriteFn<'a> = Box<dyn Fn(&Path) -> bool + Send + 'a>;
type StopFn<'a> = Box<dyn Fn() -> bool + Send + 'a>;
type LogFn<'a> = Box<dyn Fn(&RunEvent) + Send + 'a>;

/// Collaborators for one run: overwrite decision, stop poll and log sink.
///
/// Defaults: always overwrite, never stop, discard events.
pub struct RunContext<'a> {
    overwrite: OverwriteFn<'a>,
    stop: StopFn<'a>,
    log: LogFn<'a>,
}

impl Default for RunContext<'_> {
    fn default() -> Self {
        Self {
            overwrite: Box::new(|_: &Path| true),
            stop: Box::new(|| false),
            log: Box::new(|_: &RunEvent| {}),
        }
    }
}

impl<'a> RunContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask `checker(sidecar)` before replacing an existing sidecar.
    pub fn with_overwrite_checker(mut self, checker: impl Fn(&Path) -> bool + Send + 'a) -> Self {
        self.overwrite = Box::new(checker);
        self
    }

    /// Poll `checker` before each image; `true` ends the run.
    pub fn with_stop_checker(mut self, checker: impl Fn() -> bool + Send + 'a) -> Self {
        self.stop = Box::new(checker);
        self
    }

    /// Stop when `flag` is raised.
    pub fn with_stop_flag(self, flag: StopFlag) -> Self {
        self.with_stop_checker(move || flag.is_stopped())
    }

    /// Receive every progress event.
    pub fn with_log_sink(mut self, sink: impl Fn(&RunEvent) + Send + 'a) -> Self {
        self.log = Box::new(sink);
        self
    }

    fn should_stop(&self) -> bool {
        (self.stop)()
    }

    fn should_overwrite(&self, sidecar: &Path) -> bool {
        (self.overwrite)(sidecar)
    }

    fn emit(&self, event: RunEvent) {
        match event.severity() {
            Severity::Error => tracing::warn!("{event}"),
            Severity::Warning => tracing::info!("{event}"),
            Severity::Info | Severity::Success => tracing::debug!("{event}"),
        }
        (self.log)(&event);
    }
}

/// A failed image and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

/// Counts for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Images handed to the run
    pub total: usize,
    pub written: usize,
    pub skipped: usize,
    pub failures: Vec<ImageFailure>,
    /// The run was stopped before reaching every image
    pub aborted: bool,
}

impl RunSummary {
    /// Images the run reached (written, skipped or failed).
    pub fn attempted(&self) -> usize {
        self.written + self.skipped + self.failures.len()
    }

    /// Not stopped and no image failed.
    pub fn is_success(&self) -> bool {
        !self.aborted && self.failures.is_empty()
    }
}

/// Tags a list of images with one tagger.
pub struct BatchProcessor<T> {
    tagger: T,
    decoder: ImageDecoder,
    options: BatchOptions,
}

impl<T: ImageTagger> BatchProcessor<T> {
    pub fn new(tagger: T, options: BatchOptions) -> Self {
        Self {
            decoder: ImageDecoder::new(options.max_image_dimension),
            tagger,
            options,
        }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    pub fn tagger(&self) -> &T {
        &self.tagger
    }

    /// Tag `images` in order, writing one sidecar per image.
    pub fn run(&self, images: &[PathBuf], ctx: &RunContext<'_>) -> RunSummary {
        let start = Instant::now();
        let total = images.len();
        let mut summary = RunSummary {
            total,
            ..Default::default()
        };

        for (index, path) in images.iter().enumerate() {
            if ctx.should_stop() {
                ctx.emit(RunEvent::Aborted { index, total });
                summary.aborted = true;
                break;
            }

            let sidecar = TagFileStore::sidecar_path(path);
            if sidecar.is_file() && !ctx.should_overwrite(&sidecar) {
                summary.skipped += 1;
                ctx.emit(RunEvent::Skipped {
                    index,
                    total,
                    path: path.clone(),
                });
                continue;
            }

            ctx.emit(RunEvent::Processing {
                index,
                total,
                path: path.clone(),
            });

            match self.tag_one(path, &sidecar) {
                Ok(()) => {
                    summary.written += 1;
                    ctx.emit(RunEvent::Written {
                        index,
                        total,
                        path: sidecar,
                    });
                }
                Err((kind, message)) => {
                    ctx.emit(RunEvent::Failed {
                        index,
                        total,
                        path: path.clone(),
                        kind,
                        message: message.clone(),
                    });
                    summary.failures.push(ImageFailure {
                        path: path.clone(),
                        kind,
                        message,
                    });
                }
            }
        }

        tracing::info!(
            "Tagging finished in {:?}: {} written, {} skipped, {} failed{}",
            start.elapsed(),
            summary.written,
            summary.skipped,
            summary.failures.len(),
            if summary.aborted { " (stopped)" } else { "" }
        );
        summary
    }

    /// Tag a single image.
    ///
    /// An existing sidecar is only replaced if `ctx` agrees; otherwise the
    /// image is [`ImageOutcome::Skipped`]. The stop and log collaborators
    /// are not consulted.
    pub fn process(&self, image: &Path, ctx: &RunContext<'_>) -> ImageOutcome {
        let sidecar = TagFileStore::sidecar_path(image);
        if sidecar.is_file() && !ctx.should_overwrite(&sidecar) {
            return ImageOutcome::Skipped;
        }
        match self.tag_one(image, &sidecar) {
            Ok(()) => ImageOutcome::Written(sidecar),
            Err((kind, _)) => ImageOutcome::Failed(kind),
        }
    }

    fn tag_one(&self, path: &Path, sidecar: &Path) -> Result<(), (FailureKind, String)> {
        let decoded = self
            .decoder
            .decode(path)
            .map_err(|e| (FailureKind::Load, e.to_string()))?;

        let result = self
            .tagger
            .tag_image(&decoded.image, &self.options.selection)
            .map_err(|e| (FailureKind::Inference, e.to_string()))?;
        if result.is_empty() {
            return Err((
                FailureKind::EmptyResult,
                "no tag passed the thresholds".to_string(),
            ));
        }

        let filtered = apply_solo_rule(&result, self.tagger.labels(), self.options.enable_solo_rule);
        let text = format_tags(&filtered, self.options.convert_underscore);

        TagFileStore::write_text(sidecar, &text).map_err(|source| {
            let err = PipelineError::Write {
                path: sidecar.to_path_buf(),
                source,
            };
            (FailureKind::Write, err.to_string())
        })?;
        tracing::trace!("{:?}: {}", sidecar, text);
        Ok(())
    }
}
