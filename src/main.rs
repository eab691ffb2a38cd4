//! plan-check
//!
//! Replays a recorded sequence of form edits through the create-flow plan
//! model and prints either the validation errors or the submission payload.
//!
//! ```text
//! plan-check edits.json
//! ```
//!
//! The input file looks like:
//!
//! ```json
//! {
//!   "role": "therapist",
//!   "today": "2026-10-16",
//!   "edits": [["therapyName", "Knee Rehab"], ["totalAmount", "1200"]]
//! }
//! ```

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::env;
use std::fs;
use std::process::ExitCode;
use therapy_core::config::LoggingConfig;
use therapy_core::models::UserRole;
use therapy_core::{AppConfig, AppResult};
use therapy_forms::{EditOutcome, PlanField, PlanFormModel};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Edit script read from disk
#[derive(Debug, Deserialize)]
struct EditScript {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    today: Option<NaiveDate>,
    edits: Vec<(String, String)>,
}

/// Initialize tracing/logging
fn init_tracing(logging: &LoggingConfig) {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "plan_check={},therapy_core={},therapy_forms={}",
            log_level, log_level, log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Returns whether the draft is submittable
fn run(config: &AppConfig, path: &str) -> AppResult<bool> {
    let raw = fs::read_to_string(path)?;
    let script: EditScript = serde_json::from_str(&raw)?;

    let role = match script.role.as_deref() {
        Some(name) => name.parse::<UserRole>()?,
        None => UserRole::default(),
    };
    let today = script.today.unwrap_or_else(|| Local::now().date_naive());

    info!(path, role = %role, edits = script.edits.len(), "Replaying plan edits");

    let mut model = PlanFormModel::new_create(today, config.forms.clone());
    for (name, value) in &script.edits {
        let field: PlanField = name.parse()?;

        match model.set_field(field, value) {
            EditOutcome::Applied => debug!(%field, value = %value, "Edit applied"),
            EditOutcome::Ignored => warn!(%field, "Derived field ignored"),
            EditOutcome::Rejected(reason) => warn!(%field, reason = %reason, "Edit rejected"),
        }
    }

    let report = model.validate(role.is_admin());
    if report.is_empty() {
        let payload = model.submission_payload();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        Ok(true)
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(false)
    }
}

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("plan-check: {}", e);
            return ExitCode::from(2);
        }
    };

    init_tracing(&config.logging);

    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: plan-check <edits.json>");
        return ExitCode::from(2);
    };

    match run(&config, &path) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!(code = e.error_code(), "plan-check failed: {}", e);
            ExitCode::from(2)
        }
    }
}
