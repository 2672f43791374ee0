pub mod engine;
pub mod pipeline;
pub mod rounding;
pub mod workday;

pub use crate::domain::model::{RawEntry, RoundingOutcome, TimeEntry};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
