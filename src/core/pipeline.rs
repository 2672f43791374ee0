use std::path::Path;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::core::rounding::round_entries;
use crate::core::workday::fill_admin_time;
use crate::core::{ConfigProvider, Pipeline, RawEntry, RoundingOutcome, Storage, TimeEntry};
use crate::utils::error::{Result, RounderError};

/// Where the time columns sit in the input file. Captured during extract so
/// load can write the exact same header back.
#[derive(Debug, Clone)]
struct CsvLayout {
    headers: Vec<String>,
    start: usize,
    stop: usize,
    duration: Option<usize>,
}

impl CsvLayout {
    fn from_headers<C: ConfigProvider>(headers: &csv::StringRecord, config: &C) -> Result<Self> {
        let headers: Vec<String> = headers.iter().map(str::to_string).collect();
        let start = find_column(&headers, config.start_column()).ok_or_else(|| {
            RounderError::ConfigError {
                message: format!("input file has no '{}' column", config.start_column()),
            }
        })?;
        let stop = find_column(&headers, config.stop_column()).ok_or_else(|| {
            RounderError::ConfigError {
                message: format!("input file has no '{}' column", config.stop_column()),
            }
        })?;
        let duration = find_column(&headers, config.duration_column());

        Ok(Self {
            headers,
            start,
            stop,
            duration,
        })
    }

    fn render(&self, entry: &TimeEntry) -> Vec<String> {
        self.headers
            .iter()
            .enumerate()
            .map(|(index, name)| {
                if index == self.start {
                    entry.start.to_string()
                } else if index == self.stop {
                    entry.stop.to_string()
                } else if Some(index) == self.duration {
                    entry.duration.to_string()
                } else {
                    field_value(entry, name).map(value_to_cell).unwrap_or_default()
                }
            })
            .collect()
    }
}

fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
}

fn field_value<'a>(entry: &'a TimeEntry, name: &str) -> Option<&'a Value> {
    entry.fields.get(name).or_else(|| {
        // Filler entries carry lowercase keys regardless of the header casing.
        entry
            .fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub struct CsvPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    input: String,
    layout: Mutex<Option<CsvLayout>>,
}

impl<S: Storage, C: ConfigProvider> CsvPipeline<S, C> {
    pub fn new(storage: S, config: C, input: String) -> Self {
        Self {
            storage,
            config,
            input,
            layout: Mutex::new(None),
        }
    }

    fn output_name(&self) -> String {
        let stem = Path::new(&self.input)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("entries");
        format!("{}_rounded.csv", stem)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CsvPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawEntry>> {
        tracing::debug!("Reading export file: {}", self.input);
        let data = self.storage.read_file(&self.input).await?;

        let mut reader = csv::Reader::from_reader(data.as_slice());
        let layout = CsvLayout::from_headers(reader.headers()?, &self.config)?;

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut entry = RawEntry::default();
            for (index, cell) in record.iter().enumerate() {
                if index == layout.start {
                    if !cell.is_empty() {
                        entry.start = Some(cell.to_string());
                    }
                } else if index == layout.stop {
                    if !cell.is_empty() {
                        entry.stop = Some(cell.to_string());
                    }
                } else if Some(index) == layout.duration {
                    // Regenerated from the rounded endpoints on write.
                } else if let Some(name) = layout.headers.get(index) {
                    entry
                        .fields
                        .insert(name.clone(), Value::String(cell.to_string()));
                }
            }
            entries.push(entry);
        }

        *self.layout.lock().await = Some(layout);
        Ok(entries)
    }

    async fn transform(&self, entries: Vec<RawEntry>) -> Result<RoundingOutcome> {
        let mut outcome = round_entries(&entries, self.config.on_invalid())?;
        if let Some(workday) = self.config.workday() {
            outcome.filler = fill_admin_time(&outcome.entries, workday);
        }
        Ok(outcome)
    }

    async fn load(&self, outcome: RoundingOutcome) -> Result<String> {
        let layout = self
            .layout
            .lock()
            .await
            .clone()
            .ok_or_else(|| RounderError::ConfigError {
                message: "load ran before extract; no header layout captured".to_string(),
            })?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&layout.headers)?;
        for entry in outcome.entries.iter().chain(outcome.filler.iter()) {
            writer.write_record(layout.render(entry))?;
        }
        let data = writer
            .into_inner()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

        let output = format!("{}/{}", self.config.output_path(), self.output_name());
        tracing::debug!("Writing {} bytes to {}", data.len(), output);
        self.storage.write_file(&output, &data).await?;

        Ok(output)
    }
}
