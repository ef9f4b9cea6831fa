//! The cleanup run: fetch, classify, report and optionally delete.

pub mod confirm;
pub mod summary;

use tracing::{debug, info, warn};

use crate::activity::{Cutoff, categorize_datasets, partition_columns};
use crate::api::{AuthInfo, Column, Dataset, DatasetDeletion, HoneycombClient};
use crate::api::client::mentions_protection;
use crate::cli::colors::CleanerStyles;
use crate::error::{CleanerError, Result};
use crate::report::Reporter;

pub use confirm::{AssumeYes, CONFIRM_PHRASE, Confirm, LinePrompt};
pub use summary::{ColumnEntry, ColumnReport, DatasetEntry, DeletionPhase, RunSummary};

/// What the operator asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupOptions {
    pub days: u32,
    /// Restrict candidates to these dataset names; empty means all.
    pub names: Vec<String>,
    pub delete: bool,
    pub delete_protected: bool,
    pub check_columns: bool,
    pub delete_columns: bool,
}

impl CleanupOptions {
    #[must_use]
    pub const fn mutates(&self) -> bool {
        self.delete || (self.check_columns && self.delete_columns)
    }
}

/// Inactive columns found in one dataset, kept for the deletion phase.
struct InactiveColumns {
    dataset_name: String,
    dataset_slug: String,
    columns: Vec<Column>,
}

pub struct Cleaner<'a> {
    client: &'a HoneycombClient,
    reporter: &'a Reporter,
    options: &'a CleanupOptions,
}

impl<'a> Cleaner<'a> {
    pub const fn new(
        client: &'a HoneycombClient,
        reporter: &'a Reporter,
        options: &'a CleanupOptions,
    ) -> Self {
        Self {
            client,
            reporter,
            options,
        }
    }

    /// Run the whole workflow against `cutoff`. Only listing datasets is
    /// fatal; per-resource failures end up in the summary.
    pub fn run(&self, cutoff: &Cutoff, confirm: &mut dyn Confirm) -> Result<RunSummary> {
        let days = self.options.days;
        let auth = self.environment();
        let mut summary = RunSummary::new(&auth, days);

        self.reporter.line(format!(
            "{} {}",
            CleanerStyles::heading("Honeycomb Environment:"),
            CleanerStyles::name(&auth.environment.name)
        ));
        self.reporter.line(
            CleanerStyles::heading(format!(
                "Fetching datasets and checking for inactivity over {days} days..."
            ))
            .to_string(),
        );

        let datasets = self.client.list_datasets()?;
        let buckets = categorize_datasets(datasets, &self.options.names, cutoff);
        info!(
            active = buckets.active.len(),
            inactive = buckets.inactive.len(),
            filtered_out = buckets.filtered_out.len(),
            days,
            "categorized datasets"
        );

        summary.active_datasets = buckets.active.iter().map(DatasetEntry::from).collect();
        summary.inactive_datasets = buckets.inactive.iter().map(DatasetEntry::from).collect();
        summary.filtered_out = buckets.filtered_out.len();

        let team_slug = auth.team.slug.as_str();
        let env_slug = auth.environment.slug.as_str();

        self.reporter.blank();
        self.reporter
            .line(format!("Found {} active datasets", buckets.active.len()));
        if !buckets.active.is_empty() {
            self.reporter.datasets(
                &buckets.active,
                &format!("Active datasets (last {days} days)"),
                team_slug,
                env_slug,
            );
        }

        self.reporter.blank();
        self.reporter
            .line(format!("Found {} inactive datasets", buckets.inactive.len()));
        if !self.options.names.is_empty() {
            self.reporter.line(format!(
                "Filtered out {} datasets (not in specified list)",
                buckets.filtered_out.len()
            ));
        }

        if buckets.inactive.is_empty() {
            self.reporter
                .line("No inactive datasets found. Nothing to clean up!");
        } else {
            self.reporter.datasets(
                &buckets.inactive,
                &format!("Datasets with no activity in the last {days} days"),
                team_slug,
                env_slug,
            );
        }

        if self.options.check_columns {
            self.check_columns(&buckets.active, cutoff, confirm, &mut summary)?;
        }

        if self.options.delete {
            summary.dataset_deletion = if buckets.inactive.is_empty() {
                DeletionPhase::NothingToDelete
            } else {
                self.delete_datasets(&buckets.inactive, confirm)?
            };
        } else if !buckets.inactive.is_empty() {
            self.reporter.blank();
            self.reporter.line(CleanerStyles::hint(format!(
                "To delete datasets, run: honeycomb-cleaner --days {days} --delete"
            )).to_string());
        }

        Ok(summary)
    }

    fn environment(&self) -> AuthInfo {
        match self.client.environment_info() {
            Ok(auth) => auth,
            Err(err) => {
                warn!(error = %err, "could not fetch environment info");
                self.reporter.line(
                    CleanerStyles::warning(format!("Error fetching environment info: {err}"))
                        .to_string(),
                );
                AuthInfo::default()
            }
        }
    }

    fn check_columns(
        &self,
        active: &[Dataset],
        cutoff: &Cutoff,
        confirm: &mut dyn Confirm,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let days = self.options.days;
        self.reporter.blank();
        self.reporter.line(format!(
            "Checking columns in active datasets for inactivity over {days} days..."
        ));
        self.reporter
            .line(format!("Processing {} active datasets...", active.len()));

        let mut reports = Vec::new();
        let mut pending = Vec::new();

        for (index, dataset) in active.iter().enumerate() {
            let name = dataset.display_name();
            self.reporter.line(format!(
                "  [{}/{}] Checking {name} ({})...",
                index + 1,
                active.len(),
                dataset.slug
            ));

            if dataset.slug.is_empty() {
                self.reporter.line(format!("Skipping {name}: no slug found"));
                continue;
            }

            let columns = match self.client.list_columns(&dataset.slug) {
                Ok(columns) => columns,
                Err(err) => {
                    self.report_column_fetch_error(&dataset.slug, &err, summary);
                    Vec::new()
                }
            };

            let buckets = partition_columns(columns, cutoff);
            self.reporter.line(format!(
                "    Found {} active, {} inactive columns",
                buckets.active.len(),
                buckets.inactive.len()
            ));

            reports.push(ColumnReport {
                dataset_name: name.to_string(),
                dataset_slug: dataset.slug.clone(),
                active: buckets.active.len(),
                inactive: buckets.inactive.iter().map(ColumnEntry::from).collect(),
            });

            if !buckets.inactive.is_empty() {
                self.reporter.columns(
                    &buckets.inactive,
                    &format!("Inactive columns (last {days} days)"),
                    name,
                );
                pending.push(InactiveColumns {
                    dataset_name: name.to_string(),
                    dataset_slug: dataset.slug.clone(),
                    columns: buckets.inactive,
                });
            }
        }

        let total: usize = pending.iter().map(|entry| entry.columns.len()).sum();
        self.reporter.blank();
        self.reporter.line(format!(
            "Found {total} inactive columns across {} datasets",
            pending.len()
        ));
        summary.columns = Some(reports);

        if !self.options.delete_columns {
            if total > 0 {
                self.reporter.blank();
                self.reporter.line(CleanerStyles::hint(format!(
                    "To delete these columns, run: honeycomb-cleaner --check-columns --delete-columns --days {days}"
                )).to_string());
            }
            return Ok(());
        }

        summary.column_deletion = if total == 0 {
            DeletionPhase::NothingToDelete
        } else {
            self.delete_columns(&pending, total, confirm)?
        };
        Ok(())
    }

    fn report_column_fetch_error(&self, slug: &str, err: &CleanerError, summary: &mut RunSummary) {
        warn!(dataset = slug, error = %err, "could not fetch columns");
        if err.status() == Some(401) {
            self.reporter.line(
                CleanerStyles::warning(format!("Error fetching columns for {slug}: Unauthorized (401)"))
                    .to_string(),
            );
            self.reporter.line(format!(
                "  {} API key may lack 'Manage Queries and Columns' permission",
                CleanerStyles::arrow()
            ));
            summary.warnings.push(format!(
                "columns for {slug}: unauthorized, API key may lack 'Manage Queries and Columns' permission"
            ));
        } else {
            self.reporter.line(
                CleanerStyles::warning(format!("Error fetching columns for {slug}: {err}")).to_string(),
            );
            summary.warnings.push(format!("columns for {slug}: {err}"));
        }
    }

    fn delete_columns(
        &self,
        pending: &[InactiveColumns],
        total: usize,
        confirm: &mut dyn Confirm,
    ) -> Result<DeletionPhase> {
        self.danger_banner("COLUMN DELETION MODE");
        self.reporter.blank();
        if !confirm.confirm(&format!("Do you want to delete {total} inactive columns?"))? {
            self.reporter.line("Column deletion aborted.");
            info!("column deletion aborted by operator");
            return Ok(DeletionPhase::Aborted);
        }

        self.reporter.blank();
        self.reporter.line(format!("Deleting {total} columns..."));
        let (mut deleted, mut failed, mut skipped) = (0, 0, 0);

        for entry in pending {
            self.reporter.blank();
            self.reporter.line(format!("Dataset: {}", entry.dataset_name));
            for column in &entry.columns {
                let name = column.display_name();
                if column.id.is_empty() {
                    self.reporter.line(format!("  Skipping {name}: no ID found"));
                    skipped += 1;
                    continue;
                }

                self.reporter.inline(format!("  Deleting column {name}... "));
                match self.client.delete_column(&entry.dataset_slug, &column.id) {
                    Ok(()) => {
                        self.reporter.line(CleanerStyles::ok("OK").to_string());
                        deleted += 1;
                    }
                    Err(err) => {
                        self.report_failure(&err, &format!("deleting column {}", column.id));
                        failed += 1;
                    }
                }
            }
        }

        self.reporter.blank();
        self.reporter
            .line(format!("Deleted {deleted} out of {total} columns."));
        info!(deleted, failed, skipped, "column deletion finished");
        Ok(DeletionPhase::Completed {
            deleted,
            failed,
            skipped,
        })
    }

    fn delete_datasets(
        &self,
        inactive: &[Dataset],
        confirm: &mut dyn Confirm,
    ) -> Result<DeletionPhase> {
        let total = inactive.len();
        self.danger_banner("DATASET DELETION MODE");
        self.reporter.blank();
        if !confirm.confirm(&format!("Do you want to delete {total} inactive datasets?"))? {
            self.reporter.line("Dataset deletion aborted.");
            info!("dataset deletion aborted by operator");
            return Ok(DeletionPhase::Aborted);
        }

        self.reporter.blank();
        self.reporter.line(format!("Deleting {total} datasets..."));
        let (mut deleted, mut failed, mut skipped) = (0, 0, 0);

        for dataset in inactive {
            let name = dataset.display_name();
            if dataset.slug.is_empty() {
                self.reporter.line(format!("Skipping {name}: no slug found"));
                skipped += 1;
                continue;
            }

            self.reporter.inline(format!("Deleting {name}... "));
            match self
                .client
                .delete_dataset(&dataset.slug, self.options.delete_protected)
            {
                Ok(DatasetDeletion::Deleted) => {
                    self.reporter.line(CleanerStyles::ok("OK").to_string());
                    deleted += 1;
                }
                Ok(DatasetDeletion::DeletedAfterUnprotect) => {
                    self.reporter.line(format!(
                        "{} {}",
                        CleanerStyles::ok("OK"),
                        CleanerStyles::muted("(deletion protection disabled)")
                    ));
                    deleted += 1;
                }
                Err(err) => {
                    self.report_failure(&err, &format!("deleting {}", dataset.slug));
                    if !self.options.delete_protected
                        && err.status() == Some(409)
                        && mentions_protection(&err.to_string())
                    {
                        self.reporter.line(format!(
                            "  {} {}",
                            CleanerStyles::arrow(),
                            CleanerStyles::hint("rerun with --delete-protected to disable deletion protection first")
                        ));
                    }
                    failed += 1;
                }
            }
        }

        self.reporter.blank();
        self.reporter
            .line(format!("Deleted {deleted} out of {total} datasets."));
        info!(deleted, failed, skipped, "dataset deletion finished");
        Ok(DeletionPhase::Completed {
            deleted,
            failed,
            skipped,
        })
    }

    fn danger_banner(&self, what: &str) {
        self.reporter.line(
            CleanerStyles::danger(format!("⚠️ WARNING: {what} ⚠️")).to_string(),
        );
        self.reporter
            .line(CleanerStyles::danger("This action cannot be undone!").to_string());
    }

    /// `FAILED - Error 404 deleting column c1` followed by the API's detail.
    fn report_failure(&self, err: &CleanerError, action: &str) {
        debug!(error = %err, action, "deletion failed");
        match err {
            CleanerError::Api { status, message } => {
                self.reporter.line(
                    CleanerStyles::failed(format!("FAILED - Error {status} {action}")).to_string(),
                );
                self.reporter
                    .line(format!("  {} {message}", CleanerStyles::arrow()));
            }
            other => {
                self.reporter.line(
                    CleanerStyles::failed(format!("FAILED - Error {action}: {other}")).to_string(),
                );
            }
        }
    }
}
