//! Console reporting: dates, dataset links and result tables.

use std::io::Write;

use rich_rust::prelude as rich;
use rich_rust::renderables::Table;

use crate::activity::parse_timestamp;
use crate::api::{Column, Dataset};
use crate::cli::OutputMode;
use crate::cli::colors::CleanerStyles;
use crate::config::{DEFAULT_COLUMN_DISPLAY_LIMIT, DEFAULT_UI_URL};
use crate::utils::truncate_string;

const MAX_CELL_CHARS: usize = 80;

/// `YYYY-MM-DD`, `Never` for missing values, `Unknown` for unreadable ones.
#[must_use]
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != "null")
    else {
        return "Never".to_string();
    };
    parse_timestamp(raw).map_or_else(
        || "Unknown".to_string(),
        |when| when.format("%Y-%m-%d").to_string(),
    )
}

/// Link to the dataset's home page in the Honeycomb UI.
#[must_use]
pub fn dataset_url(ui_url: &str, dataset: &Dataset, team_slug: &str, env_slug: &str) -> String {
    if dataset.slug.is_empty() {
        return "N/A".to_string();
    }
    format!(
        "{}/{team_slug}/environments/{env_slug}/datasets/{}/home",
        ui_url.trim_end_matches('/'),
        dataset.slug
    )
}

fn styled_column(header: &str, color: &str) -> rich::Column {
    rich::Column::new(header).style(
        rich::Style::new().color(rich::Color::parse(color).unwrap_or(rich::Color::default())),
    )
}

#[must_use]
pub fn datasets_table(
    datasets: &[Dataset],
    ui_url: &str,
    team_slug: &str,
    env_slug: &str,
) -> Table {
    let mut table = Table::new()
        .with_column(styled_column("Name", "cyan"))
        .with_column(styled_column("Created", "blue"))
        .with_column(styled_column("Last Activity", "yellow"))
        .with_column(styled_column("URL", "green"));

    for dataset in datasets {
        table = table.with_row_cells([
            truncate_string(dataset.display_name(), MAX_CELL_CHARS),
            format_date(dataset.created_at.as_deref()),
            format_date(dataset.last_written_at.as_deref()),
            dataset_url(ui_url, dataset, team_slug, env_slug),
        ]);
    }

    table
}

/// Columns table limited to `limit` rows. Returns the table and the number
/// of rows left out.
#[must_use]
pub fn columns_table(columns: &[Column], limit: usize) -> (Table, usize) {
    let mut table = Table::new()
        .with_column(styled_column("Column Name", "cyan"))
        .with_column(styled_column("Type", "magenta"))
        .with_column(styled_column("Created", "blue"))
        .with_column(styled_column("Last Written", "yellow"))
        .with_column(styled_column("Hidden", "red"));

    for column in columns.iter().take(limit) {
        table = table.with_row_cells([
            truncate_string(column.display_name(), MAX_CELL_CHARS),
            column.display_type().to_string(),
            format_date(column.created_at.as_deref()),
            format_date(column.last_written.as_deref()),
            (if column.hidden { "Yes" } else { "No" }).to_string(),
        ]);
    }

    (table, columns.len().saturating_sub(limit))
}

#[must_use]
pub fn columns_title(title: &str, dataset_name: &str, total: usize, limit: usize) -> String {
    if total > limit {
        format!("{title} - {dataset_name} (showing first {limit} of {total})")
    } else {
        format!("{title} - {dataset_name}")
    }
}

/// Writes human output; silent in robot mode, where the final JSON summary
/// is the only thing on stdout.
#[derive(Debug, Clone)]
pub struct Reporter {
    mode: OutputMode,
    ui_url: String,
    column_limit: usize,
}

impl Reporter {
    #[must_use]
    pub fn new(mode: OutputMode, ui_url: impl Into<String>, column_limit: usize) -> Self {
        Self {
            mode,
            ui_url: ui_url.into(),
            column_limit: column_limit.max(1),
        }
    }

    pub fn line(&self, text: impl AsRef<str>) {
        if !self.mode.is_robot() {
            println!("{}", text.as_ref());
        }
    }

    /// Print without a newline, for "Deleting x... OK" progress lines.
    pub fn inline(&self, text: impl AsRef<str>) {
        if !self.mode.is_robot() {
            print!("{}", text.as_ref());
            let _ = std::io::stdout().flush();
        }
    }

    pub fn blank(&self) {
        self.line("");
    }

    pub fn datasets(&self, datasets: &[Dataset], title: &str, team_slug: &str, env_slug: &str) {
        if self.mode.is_robot() {
            return;
        }
        let table = datasets_table(datasets, &self.ui_url, team_slug, env_slug);
        println!("{}", CleanerStyles::heading(title));
        println!("{}", table.render_plain(terminal_width()));
    }

    pub fn columns(&self, columns: &[Column], title: &str, dataset_name: &str) {
        if self.mode.is_robot() {
            return;
        }
        let limit = self.column_limit;
        let (table, hidden) = columns_table(columns, limit);
        println!(
            "{}",
            CleanerStyles::heading(columns_title(title, dataset_name, columns.len(), limit))
        );
        println!("{}", table.render_plain(terminal_width()));
        if hidden > 0 {
            println!(
                "{}",
                CleanerStyles::muted(format!(
                    "... and {hidden} more columns (use --delete-columns to see deletion progress)"
                ))
            );
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputMode::Human, DEFAULT_UI_URL, DEFAULT_COLUMN_DISPLAY_LIMIT)
    }
}

fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(w, _)| w as usize)
        .unwrap_or(120)
}
