//! Command-line interface definition.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

pub mod colors;
pub mod output;

pub use output::OutputMode;

/// Clean up inactive Honeycomb datasets and columns
#[derive(Parser, Debug, Clone)]
#[command(name = "honeycomb-cleaner", version, about, long_about = None)]
pub struct Cli {
    /// Days to look back for activity (default: 60)
    #[arg(long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Enable deletion mode
    #[arg(long)]
    pub delete: bool,

    /// Also delete datasets with deletion protection enabled
    #[arg(long)]
    pub delete_protected: bool,

    /// Only consider datasets with these names for deletion (can be used multiple times)
    #[arg(long, short = 'n', value_name = "NAME", action = ArgAction::Append)]
    pub name: Vec<String>,

    /// Check for unused columns in active datasets
    #[arg(long)]
    pub check_columns: bool,

    /// Enable deletion of unused columns (requires --check-columns)
    #[arg(long, requires = "check_columns")]
    pub delete_columns: bool,

    /// Honeycomb API key (overrides env var)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Honeycomb API base URL
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Skip the interactive confirmation before deleting
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Emit a JSON summary on stdout instead of tables
    #[arg(long)]
    pub robot: bool,

    /// Path to a config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Silence logs
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    #[must_use]
    pub const fn output_mode(&self) -> OutputMode {
        if self.robot {
            OutputMode::Robot
        } else {
            OutputMode::Human
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_report_only() {
        let cli = Cli::try_parse_from(["honeycomb-cleaner"]).unwrap();
        assert_eq!(cli.days, None);
        assert!(!cli.delete);
        assert!(!cli.check_columns);
        assert!(cli.name.is_empty());
        assert_eq!(cli.output_mode(), OutputMode::Human);
    }

    #[test]
    fn names_accumulate() {
        let cli = Cli::try_parse_from([
            "honeycomb-cleaner",
            "--name",
            "a",
            "-n",
            "b",
            "--days",
            "30",
            "--delete",
        ])
        .unwrap();
        assert_eq!(cli.name, vec!["a", "b"]);
        assert_eq!(cli.days, Some(30));
        assert!(cli.delete);
    }

    #[test]
    fn delete_columns_requires_check_columns() {
        assert!(Cli::try_parse_from(["honeycomb-cleaner", "--delete-columns"]).is_err());
        let cli = Cli::try_parse_from([
            "honeycomb-cleaner",
            "--check-columns",
            "--delete-columns",
        ])
        .unwrap();
        assert!(cli.delete_columns);
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["honeycomb-cleaner", "-vv", "--robot"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output_mode(), OutputMode::Robot);
        assert!(Cli::try_parse_from(["honeycomb-cleaner", "-v", "-q"]).is_err());
    }
}
