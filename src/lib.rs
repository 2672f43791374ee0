pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::toggl::{TogglClient, TogglPipeline};
pub use crate::config::{cli::LocalStorage, CliConfig, Settings};
pub use crate::core::{engine::RoundingEngine, pipeline::CsvPipeline};
pub use crate::domain::model::{OnInvalid, RawEntry, RoundingOutcome, TimeEntry, Timestamp};
pub use crate::utils::error::{Result, RounderError};
