//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use tracing::debug;
use validator::Validate;

use crate::AppResult;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub forms: FormConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tunables for the plan form engine
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct FormConfig {
    /// Sessions per week used to seed the session estimate from the plan dates
    #[serde(default = "default_sessions_per_week")]
    #[validate(range(min = 1, max = 14))]
    pub sessions_per_week: u32,

    /// Days the end date is pushed past a new start date that overtook it
    #[serde(default = "default_end_date_advance")]
    #[validate(range(min = 1, max = 365))]
    pub end_date_advance_days: i64,

    /// Length of a freshly created plan, in days
    #[serde(default = "default_plan_length")]
    #[validate(range(min = 0, max = 3650))]
    pub default_plan_length_days: i64,

    /// Upper bound accepted for the discount percentage
    #[serde(default = "default_max_discount")]
    #[validate(range(min = 0, max = 100))]
    pub max_discount_percent: u32,
}

fn default_sessions_per_week() -> u32 {
    2
}

fn default_end_date_advance() -> i64 {
    7
}

fn default_plan_length() -> i64 {
    7
}

fn default_max_discount() -> u32 {
    100
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            sessions_per_week: default_sessions_per_week(),
            end_date_advance_days: default_end_date_advance(),
            default_plan_length_days: default_plan_length(),
            max_discount_percent: default_max_discount(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default level for the workspace crates
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> AppResult<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("forms.sessions_per_week", 2)?
            .set_default("forms.end_date_advance_days", 7)?
            .set_default("forms.default_plan_length_days", 7)?
            .set_default("forms.max_discount_percent", 100)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with THERAPY_ prefix
            .add_source(
                Environment::with_prefix("THERAPY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.forms.validate()?;

        debug!(run_mode = %run_mode, "Configuration loaded");
        Ok(app_config)
    }
}
