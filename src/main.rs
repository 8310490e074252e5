//! Entry point for the Tax Engine binary.
//!
//! Running this binary starts an HTTP server exposing the calculators.
//! Tax configuration JSON files are read from the directory named by
//! `TAX_ENGINE_CONFIG_DIR` (default `tax_configs`) on top of the
//! compiled-in configuration.  `TAX_ENGINE_HOLIDAYS` may name a JSON
//! holiday calendar replacing the compiled-in one, `TAX_ENGINE_BIND_ADDR`
//! sets the listen address and `TAX_ENGINE_LOG` the tracing filter.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tax_engine::api::{self, AppState};
use tax_engine::config::TaxConfigSet;
use tax_engine::deadlines::{DeadlineEngine, DeadlineRegistry};
use tax_engine::holidays::HolidayCalendar;
use tracing_subscriber::EnvFilter;

fn load_state() -> Result<AppState> {
    let config_dir = std::env::var("TAX_ENGINE_CONFIG_DIR").unwrap_or_else(|_| "tax_configs".to_string());
    let mut configs = TaxConfigSet::builtin();
    configs
        .load_dir(&PathBuf::from(&config_dir))
        .with_context(|| format!("failed to read tax configs from {config_dir}"))?;

    let calendar = match std::env::var("TAX_ENGINE_HOLIDAYS") {
        Ok(path) => HolidayCalendar::load(&PathBuf::from(&path))
            .with_context(|| format!("failed to load holiday calendar {path}"))?,
        Err(_) => HolidayCalendar::guyana(),
    };

    let versions: Vec<&str> = configs.configs().iter().map(|c| c.version.as_str()).collect();
    tracing::info!(?versions, holidays = calendar.len(), "reference data ready");

    Ok(AppState::new(
        configs,
        DeadlineEngine::new(DeadlineRegistry::guyana(), calendar),
    ))
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_env("TAX_ENGINE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let addr = std::env::var("TAX_ENGINE_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let result = match load_state() {
        Ok(state) => api::serve(&addr, state).await,
        Err(err) => Err(err),
    };
    if let Err(err) = result {
        tracing::error!("error running server: {err:#}");
        std::process::exit(1);
    }
}
