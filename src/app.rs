use crate::activity::Cutoff;
use crate::api::HoneycombClient;
use crate::cleaner::{AssumeYes, Cleaner, CleanupOptions, LinePrompt, RunSummary};
use crate::cli::{Cli, OutputMode};
use crate::config::Config;
use crate::error::{CleanerError, Result};
use crate::report::Reporter;

pub struct AppContext {
    pub config: Config,
    pub client: HoneycombClient,
    pub reporter: Reporter,
    pub options: CleanupOptions,
    pub output_mode: OutputMode,
    pub assume_yes: bool,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        Self::from_config(cli, config)
    }

    /// Combine an already-loaded config with the command line. Flags win
    /// over config and environment.
    pub fn from_config(cli: &Cli, mut config: Config) -> Result<Self> {
        if let Some(key) = cli.api_key.as_ref() {
            config.api.key = Some(key.clone());
        }
        if let Some(url) = cli.api_url.as_ref() {
            config.api.url = url.clone();
        }

        let api_key = config
            .api
            .key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(CleanerError::MissingApiKey)?;

        let options = CleanupOptions {
            days: cli.days.unwrap_or(config.defaults.days),
            names: cli.name.clone(),
            delete: cli.delete,
            delete_protected: cli.delete_protected,
            check_columns: cli.check_columns,
            delete_columns: cli.delete_columns,
        };

        let output_mode = cli.output_mode();
        if output_mode.is_robot() && options.mutates() && !cli.yes {
            return Err(CleanerError::Config(
                "robot mode cannot prompt for confirmation; pass --yes to delete".to_string(),
            ));
        }

        let client = HoneycombClient::builder(&api_key)
            .base_url(config.api.url.clone())
            .timeout(config.api.timeout)
            .retry(config.retry.policy())
            .build()?;

        let reporter = Reporter::new(
            output_mode,
            config.api.ui_url.clone(),
            config.defaults.column_display_limit,
        );

        Ok(Self {
            config,
            client,
            reporter,
            options,
            output_mode,
            assume_yes: cli.yes,
        })
    }

    /// Run the cleanup with the cutoff anchored at the current time.
    pub fn run(&self) -> Result<RunSummary> {
        let cutoff = Cutoff::now(self.options.days)?;
        let cleaner = Cleaner::new(&self.client, &self.reporter, &self.options);
        if self.assume_yes {
            cleaner.run(&cutoff, &mut AssumeYes)
        } else {
            cleaner.run(&cutoff, &mut LinePrompt::stdio())
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("honeycomb-cleaner").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn missing_key_is_an_error() {
        let result = AppContext::from_config(&cli(&[]), Config::default());
        assert!(matches!(result, Err(CleanerError::MissingApiKey)));
    }

    #[test]
    fn flag_key_and_days_win_over_config() {
        let mut config = Config::default();
        config.api.key = Some("from-config".to_string());
        config.defaults.days = 14;
        let ctx = AppContext::from_config(
            &cli(&["--api-key", "from-flag", "--days", "3", "--api-url", "http://localhost:1"]),
            config,
        )
        .unwrap();
        assert_eq!(ctx.config.api.key.as_deref(), Some("from-flag"));
        assert_eq!(ctx.options.days, 3);
        assert_eq!(ctx.client.base_url(), "http://localhost:1");
    }

    #[test]
    fn config_days_used_without_flag() {
        let mut config = Config::default();
        config.api.key = Some("k".to_string());
        config.defaults.days = 14;
        let ctx = AppContext::from_config(&cli(&["-n", "a"]), config).unwrap();
        assert_eq!(ctx.options.days, 14);
        assert_eq!(ctx.options.names, vec!["a"]);
        assert!(!ctx.assume_yes);
    }

    #[test]
    fn robot_deletion_requires_yes() {
        let mut config = Config::default();
        config.api.key = Some("k".to_string());
        let result = AppContext::from_config(&cli(&["--robot", "--delete"]), config.clone());
        assert!(matches!(result, Err(CleanerError::Config(_))));

        let ctx = AppContext::from_config(&cli(&["--robot", "--delete", "--yes"]), config).unwrap();
        assert!(ctx.assume_yes);
        assert_eq!(ctx.output_mode, OutputMode::Robot);
    }
}
