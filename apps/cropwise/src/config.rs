//! # Configuration
//!
//! TOML configuration for the Cropwise binary.
//!
//! ```toml
//! [data]
//! farmer_path = "data/farmer_advisor_dataset.csv"
//! market_path = "data/market_researcher_dataset.csv"
//!
//! [model]
//! executable = "/usr/local/bin/ollama"
//! args = ["run", "llama2:7b-chat"]
//! timeout_secs = 60
//!
//! [retrieval]
//! top_n = 3
//!
//! [suggestion]
//! neighbors = 10
//! ```
//!
//! Every field has a default; a missing config file means "all defaults".

use cropwise_core::CropwiseError;
use cropwise_core::primitives::{DEFAULT_NEIGHBORS, DEFAULT_TOP_N};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `model.executable`.
pub const MODEL_PATH_ENV: &str = "CROPWISE_MODEL_PATH";

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropwiseConfig {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub retrieval: RetrievalConfig,
    pub suggestion: SuggestionConfig,
}

/// Dataset locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    pub farmer_path: PathBuf,
    pub market_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            farmer_path: PathBuf::from("data/farmer_advisor_dataset.csv"),
            market_path: PathBuf::from("data/market_researcher_dataset.csv"),
        }
    }
}

/// The external model process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub executable: PathBuf,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("/usr/local/bin/ollama"),
            args: vec!["run".to_string(), "llama2:7b-chat".to_string()],
            timeout_secs: 60,
        }
    }
}

impl ModelConfig {
    /// Wall-clock limit for one model call.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrievalConfig {
    pub top_n: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuggestionConfig {
    pub neighbors: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            neighbors: DEFAULT_NEIGHBORS,
        }
    }
}

impl CropwiseConfig {
    /// Parse configuration text and validate it.
    pub fn from_toml(content: &str) -> Result<Self, CropwiseError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| CropwiseError::InvalidInput(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), CropwiseError> {
        if self.model.timeout_secs == 0 {
            return Err(CropwiseError::InvalidInput(
                "model.timeout_secs must be > 0".to_string(),
            ));
        }
        if self.model.args.is_empty() {
            return Err(CropwiseError::InvalidInput(
                "model.args must name at least the run mode".to_string(),
            ));
        }
        if self.model.executable.as_os_str().is_empty() {
            return Err(CropwiseError::InvalidInput(
                "model.executable must not be empty".to_string(),
            ));
        }
        if self.retrieval.top_n == 0 {
            return Err(CropwiseError::InvalidInput(
                "retrieval.top_n must be >= 1".to_string(),
            ));
        }
        if self.suggestion.neighbors == 0 {
            return Err(CropwiseError::InvalidInput(
                "suggestion.neighbors must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Replace the model executable when an override is given.
    #[must_use]
    pub fn with_model_override(mut self, executable: Option<String>) -> Self {
        if let Some(path) = executable.filter(|p| !p.trim().is_empty()) {
            self.model.executable = PathBuf::from(path.trim());
        }
        self
    }
}

/// Load configuration from `path`, falling back to defaults if it is absent.
///
/// The `CROPWISE_MODEL_PATH` environment variable is applied last.
pub fn load_config(path: &Path) -> Result<CropwiseConfig, CropwiseError> {
    let config = match std::fs::metadata(path) {
        Ok(metadata) => {
            if metadata.len() > MAX_CONFIG_FILE_SIZE {
                return Err(CropwiseError::InvalidInput(format!(
                    "Config file size {} bytes exceeds maximum allowed {} bytes",
                    metadata.len(),
                    MAX_CONFIG_FILE_SIZE
                )));
            }
            let content = std::fs::read_to_string(path).map_err(|e| {
                CropwiseError::IoError(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            CropwiseConfig::from_toml(&content)?
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config at {}, using defaults", path.display());
            CropwiseConfig::default()
        }
        Err(e) => {
            return Err(CropwiseError::IoError(format!(
                "Cannot read config metadata '{}': {}",
                path.display(),
                e
            )));
        }
    };

    Ok(config.with_model_override(std::env::var(MODEL_PATH_ENV).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = CropwiseConfig::default();
        assert_eq!(config.model.timeout(), Duration::from_secs(60));
        assert_eq!(config.model.args, ["run", "llama2:7b-chat"]);
        assert_eq!(config.retrieval.top_n, 3);
        assert_eq!(config.suggestion.neighbors, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = CropwiseConfig::from_toml("[model]\ntimeout_secs = 5\n").expect("parse");
        assert_eq!(config.model.timeout_secs, 5);
        assert_eq!(config.model.executable, PathBuf::from("/usr/local/bin/ollama"));
        assert_eq!(config.data, DataConfig::default());
    }

    #[test]
    fn zero_timeout_rejected() {
        let result = CropwiseConfig::from_toml("[model]\ntimeout_secs = 0\n");
        assert!(matches!(result, Err(CropwiseError::InvalidInput(_))));
    }

    #[test]
    fn unknown_field_rejected() {
        let result = CropwiseConfig::from_toml("[retrieval]\ntopn = 4\n");
        assert!(matches!(result, Err(CropwiseError::InvalidInput(_))));
    }

    #[test]
    fn override_replaces_executable() {
        let config = CropwiseConfig::default().with_model_override(Some("/opt/llm".to_string()));
        assert_eq!(config.model.executable, PathBuf::from("/opt/llm"));

        let config = CropwiseConfig::default().with_model_override(Some("  ".to_string()));
        assert_eq!(config.model.executable, PathBuf::from("/usr/local/bin/ollama"));
    }
}
