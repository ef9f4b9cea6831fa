//! Inactivity classification.
//!
//! A resource is inactive when its last write is strictly older than the
//! cutoff, when it was never written, or when its timestamp can't be read.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::api::{Column, Dataset};
use crate::error::{CleanerError, Result};

/// Point in time separating active from inactive resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cutoff {
    pub days: u32,
    pub at: DateTime<Utc>,
}

impl Cutoff {
    /// Cutoff `days` before `now`. Fails when that lies outside the
    /// representable date range.
    pub fn days_before(now: DateTime<Utc>, days: u32) -> Result<Self> {
        let at = Duration::try_days(i64::from(days))
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or_else(|| {
                CleanerError::Config(format!("--days {days} reaches past the earliest supported date"))
            })?;
        Ok(Self { days, at })
    }

    pub fn now(days: u32) -> Result<Self> {
        Self::days_before(Utc::now(), days)
    }

    /// Classify a raw last-write timestamp. `resource` only feeds the
    /// warning emitted for unreadable values.
    #[must_use]
    pub fn is_inactive(&self, last_written: Option<&str>, resource: &str) -> bool {
        let Some(raw) = present(last_written) else {
            return true;
        };
        match parse_timestamp(raw) {
            Some(when) => when < self.at,
            None => {
                warn!(resource, value = raw, "could not parse last write timestamp");
                true
            }
        }
    }

    #[must_use]
    pub fn is_dataset_inactive(&self, dataset: &Dataset) -> bool {
        self.is_inactive(dataset.last_written_at.as_deref(), dataset.display_name())
    }

    #[must_use]
    pub fn is_column_inactive(&self, column: &Column) -> bool {
        self.is_inactive(column.last_written.as_deref(), column.display_name())
    }
}

/// Returns the timestamp unless it is missing, blank or a literal `null`.
fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("null"))
}

/// Parse an API timestamp. Accepts RFC 3339, naive ISO date-times (taken as
/// UTC) and bare dates.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Datasets split by activity. `filtered_out` holds datasets excluded by a
/// name filter; they belong to neither of the other buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetBuckets {
    pub active: Vec<Dataset>,
    pub inactive: Vec<Dataset>,
    pub filtered_out: Vec<Dataset>,
}

/// Split datasets by activity, honouring an optional name filter.
#[must_use]
pub fn categorize_datasets(
    datasets: Vec<Dataset>,
    names: &[String],
    cutoff: &Cutoff,
) -> DatasetBuckets {
    let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut buckets = DatasetBuckets::default();

    for dataset in datasets {
        if !wanted.is_empty() && !wanted.contains(dataset.name.as_str()) {
            buckets.filtered_out.push(dataset);
        } else if cutoff.is_dataset_inactive(&dataset) {
            buckets.inactive.push(dataset);
        } else {
            buckets.active.push(dataset);
        }
    }
    buckets
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnBuckets {
    pub active: Vec<Column>,
    pub inactive: Vec<Column>,
}

#[must_use]
pub fn partition_columns(columns: Vec<Column>, cutoff: &Cutoff) -> ColumnBuckets {
    let (inactive, active): (Vec<Column>, Vec<Column>) = columns
        .into_iter()
        .partition(|column| cutoff.is_column_inactive(column));
    ColumnBuckets { active, inactive }
}
