use anyhow::{Context, Result};

use crate::cli::args::Cli;
use crate::config::{self, FileConfig, Overrides, Settings};
use crate::output::format::OutputMode;

pub struct RunContext {
    pub output_mode: OutputMode,
    pub settings: Settings,
}

impl RunContext {
    /// Create context from CLI arguments, the environment and the config file
    pub fn from_args(cli: &Cli) -> Result<Self> {
        if cli.no_color {
            colored::control::set_override(false);
        }

        let config_path = match &cli.config {
            Some(path) => path.clone(),
            None => config::default_config_path()?,
        };
        let file = FileConfig::load(&config_path)?;

        let overrides = Overrides {
            endpoint: cli.endpoint.as_deref(),
            app_id: cli.app_id.as_deref(),
            token_file: cli.token_file.as_deref(),
        };
        let settings = config::resolve(file, &overrides, |key| std::env::var(key).ok())
            .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

        Ok(RunContext {
            output_mode: OutputMode::from_json_flag(cli.json),
            settings,
        })
    }
}
