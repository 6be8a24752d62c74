//! CLI enum types for the tag command.

use clap::ValueEnum;

/// What to do when an image already has a sidecar file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OverwritePolicy {
    /// Replace existing sidecars
    Always,
    /// Keep existing sidecars and skip the image
    Never,
    /// Ask for each existing sidecar (falls back to `never` without a terminal)
    #[default]
    Ask,
}

impl std::fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverwritePolicy::Always => write!(f, "always"),
            OverwritePolicy::Never => write!(f, "never"),
            OverwritePolicy::Ask => write!(f, "ask"),
        }
    }
}
