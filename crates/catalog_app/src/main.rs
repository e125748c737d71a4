mod app;
mod command;
mod config;
mod render;

use std::io;
use std::time::Duration;

use anyhow::Context;
use catalog_engine::EngineHandle;
use catalog_logging::{catalog_info, catalog_warn};

use crate::config::{config_path, AppConfig, API_URL_ENV};

fn main() -> anyhow::Result<()> {
    let path = config_path();
    let (config, load_error) = match AppConfig::load(&path) {
        Ok(Some(config)) => (config, None),
        Ok(None) => (AppConfig::default(), None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    let config = config.with_api_override(std::env::var(API_URL_ENV).ok());

    catalog_logging::initialize(config.log_destination.into(), config.level_filter());
    if let Some(err) = load_error {
        catalog_warn!("ignoring config {:?}, using defaults: {}", path, err);
    }
    catalog_info!("using catalog at {}", config.api_base_url);

    let engine = EngineHandle::new(config.engine_config())
        .with_context(|| format!("starting engine for {}", config.api_base_url))?;
    let wait = Duration::from_secs(config.wait_timeout_secs);

    let stdin = io::stdin();
    app::App::new(engine, io::stdout(), wait).run(stdin.lock())
}
