use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use indexmap::IndexMap;
use serde_json::Value;

use crate::core::rounding::round_timestamp;
use crate::domain::model::{TimeEntry, Timestamp, WorkdayConfig};

/// Total rounded seconds worked per calendar day, keyed by the day of the
/// start timestamp.
pub fn seconds_per_day(entries: &[TimeEntry]) -> BTreeMap<NaiveDate, i64> {
    let mut per_day = BTreeMap::new();
    for entry in entries {
        *per_day.entry(entry.start.at.date_naive()).or_insert(0) += entry.duration;
    }
    per_day
}

/// The latest stop time among entries starting on the given day.
pub fn last_stop_for_day(day: NaiveDate, entries: &[TimeEntry]) -> Option<Timestamp> {
    entries
        .iter()
        .filter(|entry| entry.start.at.date_naive() == day)
        .map(|entry| entry.stop)
        .max_by_key(|stop| stop.at)
}

/// Generates one filler entry per day that falls short of the configured
/// target, running from the day's last stop to the rounded end of the
/// shortfall. Days that meet the target produce nothing.
pub fn fill_admin_time(entries: &[TimeEntry], config: &WorkdayConfig) -> Vec<TimeEntry> {
    let mut filler = Vec::new();

    for (day, worked) in seconds_per_day(entries) {
        let shortfall = config.target_seconds() - worked;
        if shortfall <= 0 {
            continue;
        }
        let Some(start) = last_stop_for_day(day, entries) else {
            continue;
        };
        let stop = round_timestamp(start + Duration::seconds(shortfall));

        let mut fields = IndexMap::new();
        fields.insert("workspace_id".to_string(), Value::from(config.workspace_id));
        fields.insert("project_id".to_string(), Value::from(config.project_id));
        fields.insert(
            "description".to_string(),
            Value::String(config.description.clone()),
        );

        filler.push(TimeEntry {
            start,
            stop,
            duration: (stop - start).num_seconds(),
            fields,
        });
    }

    filler
}
