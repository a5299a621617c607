//! Configuration for the orchestration pipeline.
//!
//! Loaded from `atelier.json` (camelCase keys, every field optional);
//! a missing file yields the defaults. Values are validated with
//! actionable messages before the server starts.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "atelier.json";

/// Default upper bound on the evaluator call, in seconds.
const fn default_scoring_timeout_secs() -> u64 {
    30
}

/// Default submissions allowed per learner per calendar day.
const fn default_daily_submission_limit() -> u64 {
    5
}

/// Default minimum trimmed deliverable length, in characters.
const fn default_min_deliverable_chars() -> usize {
    50
}

/// Default certificate number prefix.
fn default_certificate_prefix() -> String {
    "ATELIER".to_string()
}

/// Default evaluator model.
fn default_evaluator_model() -> String {
    atelier_scoring::anthropic::DEFAULT_MODEL.to_string()
}

/// Default evaluator completion budget.
const fn default_evaluator_max_tokens() -> u32 {
    atelier_scoring::anthropic::DEFAULT_MAX_TOKENS
}

/// Configuration error with a suggestion, rendered as one message.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but cannot be read or parsed.
    #[error("Invalid config file '{path}': {message}\n\nSuggestion: validate your atelier.json with a JSON linter")]
    Parse {
        /// Path to the offending file.
        path: String,
        /// Description of the failure.
        message: String,
    },

    /// A config value is out of its valid domain.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    Validation {
        /// Description of the invalid value.
        message: String,
        /// How to fix it.
        suggestion: String,
    },
}

impl ConfigError {
    fn parse(path: &Path, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    fn validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }
}

/// Orchestration pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Upper bound on one evaluator call, in seconds.
    #[serde(default = "default_scoring_timeout_secs")]
    pub scoring_timeout_secs: u64,

    /// Submissions allowed per learner per local calendar day.
    #[serde(default = "default_daily_submission_limit")]
    pub daily_submission_limit: u64,

    /// Minimum trimmed deliverable length, in characters.
    #[serde(default = "default_min_deliverable_chars")]
    pub min_deliverable_chars: usize,

    /// Prefix of generated certificate numbers.
    #[serde(default = "default_certificate_prefix")]
    pub certificate_prefix: String,

    /// Model name passed to the evaluator.
    #[serde(default = "default_evaluator_model")]
    pub evaluator_model: String,

    /// Completion budget passed to the evaluator.
    #[serde(default = "default_evaluator_max_tokens")]
    pub evaluator_max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scoring_timeout_secs: default_scoring_timeout_secs(),
            daily_submission_limit: default_daily_submission_limit(),
            min_deliverable_chars: default_min_deliverable_chars(),
            certificate_prefix: default_certificate_prefix(),
            evaluator_model: default_evaluator_model(),
            evaluator_max_tokens: default_evaluator_max_tokens(),
        }
    }
}

impl Config {
    /// Loads `atelier.json` from a directory, falling back to defaults
    /// when the file does not exist.
    pub fn load_from_dir(dir: &Path) -> std::result::Result<Self, ConfigError> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file yields the (validated) defaults; an unreadable or
    /// malformed file is an error.
    pub fn load_from_file(path: &Path) -> std::result::Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => return Err(ConfigError::parse(path, format!("failed to read file: {e}"))),
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.scoring_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "scoringTimeoutSecs must be greater than 0",
                "Set scoringTimeoutSecs to at least 1 second in your atelier.json",
            ));
        }
        if self.daily_submission_limit == 0 {
            return Err(ConfigError::validation(
                "dailySubmissionLimit must be greater than 0",
                "Set dailySubmissionLimit to at least 1 in your atelier.json",
            ));
        }
        if self.min_deliverable_chars == 0 {
            return Err(ConfigError::validation(
                "minDeliverableChars must be greater than 0",
                "Set minDeliverableChars to at least 1 in your atelier.json",
            ));
        }
        if self.certificate_prefix.trim().is_empty() {
            return Err(ConfigError::validation(
                "certificatePrefix must not be empty",
                "Provide a short uppercase prefix in your atelier.json",
            ));
        }
        if self.evaluator_model.trim().is_empty() {
            return Err(ConfigError::validation(
                "evaluatorModel must not be empty",
                "Provide a model name in your atelier.json",
            ));
        }
        Ok(())
    }
}
