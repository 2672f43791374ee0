use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, SecondsFormat};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::error::InvalidEntry;

/// How a timestamp was written in the source, so the writer can emit the same
/// shape it read. No timezone conversion happens anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampStyle {
    /// RFC 3339 with an explicit UTC offset, e.g. `2024-03-09T09:07:42+01:00`.
    Rfc3339,
    /// Naive `YYYY-MM-DDTHH:MM:SS`.
    NaiveT,
    /// Naive `YYYY-MM-DD HH:MM:SS`.
    NaiveSpace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub at: DateTime<FixedOffset>,
    pub style: TimestampStyle,
}

impl Timestamp {
    pub fn parse(raw: &str) -> Result<Self, chrono::ParseError> {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(at) => Ok(Self {
                at,
                style: TimestampStyle::Rfc3339,
            }),
            Err(rfc_err) => {
                let naive_formats = [
                    ("%Y-%m-%dT%H:%M:%S%.f", TimestampStyle::NaiveT),
                    ("%Y-%m-%d %H:%M:%S%.f", TimestampStyle::NaiveSpace),
                ];
                for (format, style) in naive_formats {
                    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                        return Ok(Self {
                            at: naive.and_utc().fixed_offset(),
                            style,
                        });
                    }
                }
                Err(rfc_err)
            }
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            TimestampStyle::Rfc3339 => {
                write!(f, "{}", self.at.to_rfc3339_opts(SecondsFormat::Secs, false))
            }
            TimestampStyle::NaiveT => {
                write!(f, "{}", self.at.naive_local().format("%Y-%m-%dT%H:%M:%S"))
            }
            TimestampStyle::NaiveSpace => {
                write!(f, "{}", self.at.naive_local().format("%Y-%m-%d %H:%M:%S"))
            }
        }
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp {
            at: self.at + rhs,
            style: self.style,
        }
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: Duration) -> Timestamp {
        Timestamp {
            at: self.at - rhs,
            style: self.style,
        }
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Timestamp) -> Duration {
        self.at - rhs.at
    }
}

/// One row or record as the loader found it: start/stop still raw strings,
/// everything else carried through opaquely in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    pub start: Option<String>,
    pub stop: Option<String>,
    pub fields: IndexMap<String, Value>,
}

impl RawEntry {
    /// Something a user can find the entry by in a log line.
    pub fn label(&self) -> String {
        if let Some(id) = self.fields.get("id") {
            return format!("id {}", id);
        }
        if let Some(Value::String(description)) = self.fields.get("description") {
            if !description.is_empty() {
                return format!("\"{}\"", description);
            }
        }
        "unlabelled entry".to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntry {
    pub start: Timestamp,
    pub stop: Timestamp,
    /// Whole seconds between the rounded endpoints. Negative when the source
    /// had stop before start; that anomaly is surfaced, not patched.
    pub duration: i64,
    pub fields: IndexMap<String, Value>,
}

impl TimeEntry {
    pub fn hours(&self) -> f64 {
        self.duration as f64 / 3600.0
    }
}

/// An entry the skip policy dropped, kept with enough context to report.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedEntry {
    pub index: usize,
    pub cause: InvalidEntry,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundingOutcome {
    pub entries: Vec<TimeEntry>,
    pub rejected: Vec<RejectedEntry>,
    pub filler: Vec<TimeEntry>,
}

/// What to do with an entry whose start or stop cannot be used. The engine
/// only reports failures; this choice belongs to the caller's configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnInvalid {
    #[default]
    Skip,
    Abort,
}

impl FromStr for OnInvalid {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "skip" => Ok(OnInvalid::Skip),
            "abort" => Ok(OnInvalid::Abort),
            other => Err(format!("unknown policy '{}', expected skip or abort", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkdayConfig {
    #[serde(default = "default_target_hours")]
    pub target_hours: f64,
    pub workspace_id: i64,
    pub project_id: i64,
    #[serde(default = "default_description")]
    pub description: String,
}

impl WorkdayConfig {
    pub fn target_seconds(&self) -> i64 {
        (self.target_hours * 3600.0).round() as i64
    }
}

fn default_target_hours() -> f64 {
    8.0
}

fn default_description() -> String {
    "Admin".to_string()
}
