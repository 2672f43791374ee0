use serde::{Deserialize, Serialize};

use crate::domain::model::{OnInvalid, WorkdayConfig};
use crate::utils::error::{Result, RounderError};

/// Optional TOML settings file. Every field is optional; anything absent
/// falls back to the CLI flag (or its default).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub rounding: Option<RoundingSection>,
    pub api: Option<ApiSection>,
    pub workday: Option<WorkdayConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundingSection {
    pub on_invalid: Option<OnInvalid>,
    pub start_column: Option<String>,
    pub stop_column: Option<String>,
    pub duration_column: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSection {
    pub endpoint: Option<String>,
}

impl FileConfig {
    pub fn load(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| RounderError::ConfigError {
            message: format!("failed to parse {}: {}", path, e),
        })
    }
}
