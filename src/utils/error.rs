use std::fmt;

use thiserror::Error;

/// Which endpoint of a time entry failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Start,
    Stop,
}

impl fmt::Display for TimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeField::Start => write!(f, "start"),
            TimeField::Stop => write!(f, "stop"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    #[error("is missing")]
    Missing,
    #[error("could not be parsed: {0}")]
    Unparseable(String),
}

/// A time entry the engine refuses to round. Carries the entry's identity so
/// the bad record can be located; no default timestamp is ever substituted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} timestamp of {label} {reason}")]
pub struct InvalidEntry {
    pub label: String,
    pub field: TimeField,
    pub reason: InvalidReason,
}

#[derive(Error, Debug)]
pub enum RounderError {
    #[error("invalid time entry: {0}")]
    InvalidEntryError(#[from] InvalidEntry),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned {status} while {context}: {body}")]
    ApiStatusError {
        status: u16,
        context: String,
        body: String,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl RounderError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            RounderError::InvalidEntryError(cause) => {
                format!("A time entry could not be rounded: {}", cause)
            }
            RounderError::ApiError(_) => "Could not reach the Toggl API".to_string(),
            RounderError::ApiStatusError { status, context, .. } => {
                format!("The Toggl API rejected the request ({}) while {}", status, context)
            }
            RounderError::CsvError(_) => "The export file could not be processed".to_string(),
            RounderError::IoError(_) => "A file could not be read or written".to_string(),
            RounderError::SerializationError(_) => "Entry data could not be serialized".to_string(),
            RounderError::ConfigError { message } => message.clone(),
            RounderError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RounderError::InvalidEntryError(_) => {
                "Fix the entry in the source, or rerun with --on-invalid skip".to_string()
            }
            RounderError::ApiError(_) => {
                "Check the network connection and the --api-endpoint value".to_string()
            }
            RounderError::ApiStatusError { status, .. } if *status == 401 || *status == 403 => {
                "Check that TOGGL_API_KEY holds a valid API token".to_string()
            }
            RounderError::ApiStatusError { .. } => {
                "Inspect the response body above; the Toggl API may be degraded".to_string()
            }
            RounderError::CsvError(_) => {
                "Make sure the input is a CSV export with a header row".to_string()
            }
            RounderError::IoError(_) => {
                "Check the input path and that the output directory is writable".to_string()
            }
            RounderError::SerializationError(_) => {
                "Re-export the source data; a record seems malformed".to_string()
            }
            RounderError::ConfigError { .. } | RounderError::InvalidConfigValueError { .. } => {
                "Run with --help to see the expected configuration".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RounderError>;
