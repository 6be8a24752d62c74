//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_threshold("tagging.general_threshold", self.tagging.general_threshold)?;
        check_threshold(
            "tagging.character_threshold",
            self.tagging.character_threshold,
        )?;
        if self.general.model_filename.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "general.model_filename must not be empty".into(),
            ));
        }
        if self.processing.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "processing.max_image_dimension must be > 0".into(),
            ));
        }
        if self.history.max_history == 0 {
            return Err(ConfigError::ValidationError(
                "history.max_history must be > 0".into(),
            ));
        }
        Ok(())
    }
}

fn check_threshold(name: &str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::ValidationError(format!(
            "{name} must be between 0.0 and 1.0"
        )));
    }
    Ok(())
}
