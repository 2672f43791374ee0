use chrono::{Duration, Timelike};

use crate::domain::model::{
    OnInvalid, RawEntry, RejectedEntry, RoundingOutcome, TimeEntry, Timestamp,
};
use crate::utils::error::{InvalidEntry, InvalidReason, Result, RounderError, TimeField};

/// Zeroes the seconds and sub-second components. Minute, hour and date are
/// untouched.
pub fn truncate_seconds(ts: Timestamp) -> Timestamp {
    ts - Duration::seconds(i64::from(ts.at.second()))
        - Duration::nanoseconds(i64::from(ts.at.nanosecond()))
}

/// Rounds a whole-minute timestamp to the nearest quarter hour, half up:
/// minute 7 stays on the hour, minute 8 moves to :15. A result of 60 carries
/// into the next hour (and across day/month/year boundaries) through the
/// calendar arithmetic of the duration addition.
pub fn round_to_quarter_hour(ts: Timestamp) -> Timestamp {
    let minute = i64::from(ts.at.minute());
    let slot = ((minute + 7) / 15) * 15;
    ts + Duration::minutes(slot - minute)
}

pub fn round_timestamp(ts: Timestamp) -> Timestamp {
    round_to_quarter_hour(truncate_seconds(ts))
}

/// Rounds both endpoints independently and recomputes the duration from the
/// rounded values. The input entry is not mutated; its passthrough fields are
/// carried over unchanged.
pub fn round_entry(entry: &RawEntry) -> std::result::Result<TimeEntry, InvalidEntry> {
    let start = round_timestamp(parse_endpoint(entry, TimeField::Start)?);
    let stop = round_timestamp(parse_endpoint(entry, TimeField::Stop)?);

    Ok(TimeEntry {
        start,
        stop,
        duration: (stop - start).num_seconds(),
        fields: entry.fields.clone(),
    })
}

fn parse_endpoint(
    entry: &RawEntry,
    field: TimeField,
) -> std::result::Result<Timestamp, InvalidEntry> {
    let raw = match field {
        TimeField::Start => entry.start.as_deref(),
        TimeField::Stop => entry.stop.as_deref(),
    };

    let raw = raw.ok_or_else(|| InvalidEntry {
        label: entry.label(),
        field,
        reason: InvalidReason::Missing,
    })?;

    Timestamp::parse(raw).map_err(|e| InvalidEntry {
        label: entry.label(),
        field,
        reason: InvalidReason::Unparseable(e.to_string()),
    })
}

/// Rounds each entry independently, preserving input order. Invalid entries
/// are either collected (`Skip`) or fail the whole batch (`Abort`); the
/// policy comes from the caller, never from the engine itself.
pub fn round_entries(entries: &[RawEntry], on_invalid: OnInvalid) -> Result<RoundingOutcome> {
    let mut rounded = Vec::with_capacity(entries.len());
    let mut rejected = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        match round_entry(entry) {
            Ok(entry) => rounded.push(entry),
            Err(cause) => match on_invalid {
                OnInvalid::Abort => return Err(RounderError::InvalidEntryError(cause)),
                OnInvalid::Skip => {
                    tracing::warn!("Skipping entry {}: {}", index, cause);
                    rejected.push(RejectedEntry { index, cause });
                }
            },
        }
    }

    Ok(RoundingOutcome {
        entries: rounded,
        rejected,
        filler: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::Value;

    fn ts(raw: &str) -> Timestamp {
        Timestamp::parse(raw).unwrap()
    }

    fn entry(start: &str, stop: &str) -> RawEntry {
        RawEntry {
            start: Some(start.to_string()),
            stop: Some(stop.to_string()),
            fields: IndexMap::new(),
        }
    }

    #[test]
    fn truncation_drops_seconds_only() {
        let truncated = truncate_seconds(ts("2024-01-01T09:07:42"));
        assert_eq!(truncated, ts("2024-01-01T09:07:00"));
    }

    #[test]
    fn truncation_drops_fractional_seconds() {
        let truncated = truncate_seconds(ts("2024-01-01T09:07:42.731"));
        assert_eq!(truncated, ts("2024-01-01T09:07:00"));
    }

    #[test]
    fn rounding_half_up_tie_breaks() {
        // 7 down, 8 up; same pattern in every quarter.
        let cases = [
            ("2024-01-01T09:07:00", "2024-01-01T09:00:00"),
            ("2024-01-01T09:08:00", "2024-01-01T09:15:00"),
            ("2024-01-01T09:22:00", "2024-01-01T09:15:00"),
            ("2024-01-01T09:23:00", "2024-01-01T09:30:00"),
            ("2024-01-01T09:37:00", "2024-01-01T09:30:00"),
            ("2024-01-01T09:38:00", "2024-01-01T09:45:00"),
            ("2024-01-01T09:52:00", "2024-01-01T09:45:00"),
            ("2024-01-01T09:53:00", "2024-01-01T10:00:00"),
        ];
        for (input, expected) in cases {
            assert_eq!(round_to_quarter_hour(ts(input)), ts(expected), "{}", input);
        }
    }

    #[test]
    fn rounding_carries_across_midnight() {
        assert_eq!(
            round_to_quarter_hour(ts("2024-01-31T23:53:00")),
            ts("2024-02-01T00:00:00")
        );
    }

    #[test]
    fn rounding_carries_across_year_end() {
        assert_eq!(
            round_to_quarter_hour(ts("2023-12-31T23:55:00")),
            ts("2024-01-01T00:00:00")
        );
    }

    #[test]
    fn rounding_is_idempotent() {
        let once = round_timestamp(ts("2024-01-01T09:07:42"));
        assert_eq!(round_timestamp(once), once);

        let raw = entry("2024-01-01T09:07:42", "2024-01-01T13:51:18");
        let rounded = round_entry(&raw).unwrap();
        let again = round_entry(&RawEntry {
            start: Some(rounded.start.to_string()),
            stop: Some(rounded.stop.to_string()),
            fields: rounded.fields.clone(),
        })
        .unwrap();
        assert_eq!(again, rounded);
    }

    #[test]
    fn rounded_entries_land_on_the_quarter_grid() {
        let rounded = round_entry(&entry("2024-05-14T11:03:29", "2024-05-14T11:41:07")).unwrap();
        for endpoint in [rounded.start, rounded.stop] {
            assert_eq!(endpoint.at.minute() % 15, 0);
            assert_eq!(endpoint.at.second(), 0);
            assert_eq!(endpoint.at.nanosecond(), 0);
        }
    }

    #[test]
    fn duration_is_recomputed_from_rounded_endpoints() {
        // 09:07:42 -> 09:00, 13:51:18 -> 13:45: a clean 4.75 hours where the
        // raw interval was ~4.727 hours.
        let rounded = round_entry(&entry("2024-01-01T09:07:42", "2024-01-01T13:51:18")).unwrap();
        assert_eq!(rounded.start, ts("2024-01-01T09:00:00"));
        assert_eq!(rounded.stop, ts("2024-01-01T13:45:00"));
        assert_eq!(rounded.duration, 17_100);
        assert_eq!(rounded.hours(), 4.75);
        assert_eq!(rounded.duration, (rounded.stop - rounded.start).num_seconds());
    }

    #[test]
    fn whole_hours_come_out_of_noisy_endpoints() {
        let rounded = round_entry(&entry("2024-01-01T09:07:42", "2024-01-01T13:53:18")).unwrap();
        assert_eq!(rounded.start, ts("2024-01-01T09:00:00"));
        assert_eq!(rounded.stop, ts("2024-01-01T14:00:00"));
        assert_eq!(rounded.hours(), 5.0);
    }

    #[test]
    fn offset_aware_entries_round_on_wall_clock_minutes() {
        let rounded =
            round_entry(&entry("2024-01-01T09:07:42+01:00", "2024-01-01T09:38:00+01:00")).unwrap();
        assert_eq!(rounded.start.to_string(), "2024-01-01T09:00:00+01:00");
        assert_eq!(rounded.stop.to_string(), "2024-01-01T09:45:00+01:00");
        assert_eq!(rounded.duration, 45 * 60);
    }

    #[test]
    fn reversed_entries_surface_a_negative_duration() {
        // Stop before start in the source. Both endpoints still round; the
        // negative duration is passed through so the anomaly stays visible.
        let rounded = round_entry(&entry("2024-01-01T10:08:00", "2024-01-01T09:52:00")).unwrap();
        assert_eq!(rounded.start, ts("2024-01-01T10:15:00"));
        assert_eq!(rounded.stop, ts("2024-01-01T09:45:00"));
        assert_eq!(rounded.duration, -30 * 60);
    }

    #[test]
    fn short_entries_can_round_to_zero_duration() {
        let rounded = round_entry(&entry("2024-01-01T08:53:00", "2024-01-01T08:56:30")).unwrap();
        assert_eq!(rounded.start, rounded.stop);
        assert_eq!(rounded.duration, 0);
    }

    #[test]
    fn passthrough_fields_are_preserved() {
        let mut raw = entry("2024-01-01T09:07:42", "2024-01-01T09:21:10");
        raw.fields.insert("id".to_string(), Value::from(981));
        raw.fields
            .insert("description".to_string(), Value::String("Standup".into()));
        raw.fields.insert("billable".to_string(), Value::Bool(false));
        raw.fields
            .insert("tags".to_string(), serde_json::json!(["meeting", "daily"]));

        let rounded = round_entry(&raw).unwrap();
        assert_eq!(rounded.fields, raw.fields);
    }

    #[test]
    fn missing_stop_is_reported_not_rounded() {
        let mut raw = RawEntry {
            start: Some("2024-01-01T09:07:42".to_string()),
            stop: None,
            fields: IndexMap::new(),
        };
        raw.fields.insert("id".to_string(), Value::from(7));

        let err = round_entry(&raw).unwrap_err();
        assert_eq!(err.field, TimeField::Stop);
        assert_eq!(err.reason, InvalidReason::Missing);
        assert_eq!(err.label, "id 7");
    }

    #[test]
    fn unparseable_start_is_reported() {
        let raw = entry("about nine", "2024-01-01T09:21:10");
        let err = round_entry(&raw).unwrap_err();
        assert_eq!(err.field, TimeField::Start);
        assert!(matches!(err.reason, InvalidReason::Unparseable(_)));
    }

    #[test]
    fn skip_policy_collects_rejects_and_keeps_order() {
        let entries = vec![
            entry("2024-01-01T09:07:00", "2024-01-01T09:22:00"),
            RawEntry {
                start: Some("2024-01-01T10:00:00".to_string()),
                stop: None,
                fields: IndexMap::new(),
            },
            entry("2024-01-01T11:08:00", "2024-01-01T11:23:00"),
        ];

        let outcome = round_entries(&entries, OnInvalid::Skip).unwrap();
        assert_eq!(outcome.entries.len(), 2);
        assert_eq!(outcome.entries[0].start, ts("2024-01-01T09:00:00"));
        assert_eq!(outcome.entries[1].start, ts("2024-01-01T11:15:00"));
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].index, 1);
        assert_eq!(outcome.rejected[0].cause.field, TimeField::Stop);
    }

    #[test]
    fn abort_policy_fails_the_batch_on_first_invalid_entry() {
        let entries = vec![
            entry("2024-01-01T09:07:00", "2024-01-01T09:22:00"),
            entry("not a time", "2024-01-01T10:00:00"),
        ];

        let err = round_entries(&entries, OnInvalid::Abort).unwrap_err();
        assert!(matches!(err, RounderError::InvalidEntryError(_)));
    }
}
