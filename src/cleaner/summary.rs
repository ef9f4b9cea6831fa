//! What a run found and did.

use serde::Serialize;

use crate::api::{AuthInfo, Column, Dataset};

/// A dataset as it appears in the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetEntry {
    pub name: String,
    pub slug: String,
    pub last_written_at: Option<String>,
}

impl From<&Dataset> for DatasetEntry {
    fn from(dataset: &Dataset) -> Self {
        Self {
            name: dataset.display_name().to_string(),
            slug: dataset.slug.clone(),
            last_written_at: dataset.last_written_at.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnEntry {
    pub id: String,
    pub key_name: String,
    pub last_written: Option<String>,
}

impl From<&Column> for ColumnEntry {
    fn from(column: &Column) -> Self {
        Self {
            id: column.id.clone(),
            key_name: column.display_name().to_string(),
            last_written: column.last_written.clone(),
        }
    }
}

/// Column check result for one active dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnReport {
    pub dataset_name: String,
    pub dataset_slug: String,
    pub active: usize,
    pub inactive: Vec<ColumnEntry>,
}

/// State of a deletion phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum DeletionPhase {
    NotRequested,
    NothingToDelete,
    Aborted,
    Completed {
        deleted: usize,
        failed: usize,
        skipped: usize,
    },
}

impl DeletionPhase {
    #[must_use]
    pub const fn deleted(&self) -> usize {
        match self {
            Self::Completed { deleted, .. } => *deleted,
            _ => 0,
        }
    }

    #[must_use]
    pub const fn failed(&self) -> usize {
        match self {
            Self::Completed { failed, .. } => *failed,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub environment: String,
    pub team: String,
    pub days: u32,
    pub active_datasets: Vec<DatasetEntry>,
    pub inactive_datasets: Vec<DatasetEntry>,
    pub filtered_out: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ColumnReport>>,
    pub dataset_deletion: DeletionPhase,
    pub column_deletion: DeletionPhase,
    #[serde(skip)]
    pub warnings: Vec<String>,
}

impl RunSummary {
    #[must_use]
    pub fn new(auth: &AuthInfo, days: u32) -> Self {
        Self {
            environment: auth.environment.name.clone(),
            team: auth.team.name.clone(),
            days,
            active_datasets: Vec::new(),
            inactive_datasets: Vec::new(),
            filtered_out: 0,
            columns: None,
            dataset_deletion: DeletionPhase::NotRequested,
            column_deletion: DeletionPhase::NotRequested,
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn inactive_column_count(&self) -> usize {
        self.columns
            .iter()
            .flatten()
            .map(|report| report.inactive.len())
            .sum()
    }

    #[must_use]
    pub const fn deleted_total(&self) -> usize {
        self.dataset_deletion.deleted() + self.column_deletion.deleted()
    }

    #[must_use]
    pub const fn failed_total(&self) -> usize {
        self.dataset_deletion.failed() + self.column_deletion.failed()
    }
}
