//! honeycomb-cleaner - find and remove inactive Honeycomb datasets and columns.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use honeycomb_cleaner::app::AppContext;
use honeycomb_cleaner::cleaner::RunSummary;
use honeycomb_cleaner::cli::Cli;
use honeycomb_cleaner::cli::colors::ColorSupport;
use honeycomb_cleaner::cli::output::{
    HumanLayout, emit_human, emit_robot, robot_error, robot_ok, robot_partial,
};
use honeycomb_cleaner::utils::pluralize;
use honeycomb_cleaner::{CleanerError, Result};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    if cli.robot {
        colored::control::set_override(false);
    } else {
        ColorSupport::detect().apply();
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.robot {
                // Partial results were already emitted with the summary.
                if !matches!(e, CleanerError::DeletionFailed { .. }) {
                    let response = robot_error(e.code(), e.to_string());
                    let _ = emit_robot(&response);
                }
            } else {
                eprintln!("Error: {e}");
                if matches!(e, CleanerError::MissingApiKey) {
                    eprintln!("Set it with: export HONEYCOMB_API_KEY=your_api_key_here");
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = AppContext::from_cli(cli)?;
    let summary = ctx.run()?;

    let failed = summary.failed_total();
    let deleted = summary.deleted_total();

    if cli.robot {
        let warnings = summary.warnings.clone();
        let mut response = if failed > 0 {
            robot_partial(summary, deleted, failed)
        } else {
            robot_ok(summary)
        };
        response.warnings = warnings;
        emit_robot(&response)?;
    } else {
        emit_human(summary_layout(&summary));
    }

    if failed > 0 {
        return Err(CleanerError::DeletionFailed {
            failed,
            attempted: failed + deleted,
        });
    }
    Ok(())
}

fn summary_layout(summary: &RunSummary) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.blank().section("Summary");
    layout
        .kv("Environment", &summary.environment)
        .kv("Threshold", &pluralize(summary.days as usize, "day", "days"))
        .kv("Active datasets", &summary.active_datasets.len().to_string())
        .kv("Inactive datasets", &summary.inactive_datasets.len().to_string());
    if summary.filtered_out > 0 {
        layout.kv("Filtered out", &summary.filtered_out.to_string());
    }
    if summary.columns.is_some() {
        layout.kv(
            "Inactive columns",
            &summary.inactive_column_count().to_string(),
        );
    }
    if summary.deleted_total() > 0 || summary.failed_total() > 0 {
        layout
            .kv("Deleted", &summary.deleted_total().to_string())
            .kv("Failed", &summary.failed_total().to_string());
    }
    layout
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn",
        1 => "warn,honeycomb_cleaner=info",
        2 => "info,honeycomb_cleaner=debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.robot {
        // JSON logging for robot mode
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
