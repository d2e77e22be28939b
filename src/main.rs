mod api_routes;
mod api_state;
mod models;
mod repo;
mod service;

use crate::models::config::{setup_config, Config};
use crate::repo::sqlite::LogStore;
use crate::service::legacy_import::import_legacy_log;
use crate::service::retention::{purge, RetentionPolicy};
use crate::service::scheduler::{run_auto_purge, PurgeSchedule};
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::Path;

#[macro_use]
extern crate rocket;

use api_state::AppState;
use rocket::fairing::AdHoc;
use rocket::http::Header;

/// Build the HTTP server around an initialized store
pub fn build_rocket(state: AppState) -> rocket::Rocket<rocket::Build> {
    let figment = rocket::Config::figment()
        .merge(("address", state.config().address.clone()))
        .merge(("port", state.config().port));

    let auto_purge = state
        .config()
        .auto_purge
        .as_ref()
        .map(PurgeSchedule::from_config)
        .transpose();

    let rocket = rocket::custom(figment)
        .attach(AdHoc::on_response("CORS", |_, response| {
            Box::pin(async move {
                response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
                response.set_header(Header::new(
                    "Access-Control-Allow-Methods",
                    "GET, POST, PATCH, DELETE, OPTIONS",
                ));
                response.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
            })
        }))
        .register("/", catchers![api_routes::default_catcher])
        .mount(
            "/api",
            routes![
                api_routes::get_logs,
                api_routes::get_log_tags,
                api_routes::get_log,
                api_routes::append_log,
                api_routes::set_log_lock,
                api_routes::purge_logs,
                api_routes::log_events,
                api_routes::health_check,
                api_routes::cors_preflight,
            ],
        );

    let rocket = match auto_purge {
        Ok(Some(schedule)) => {
            let purge_state = state.clone();
            rocket.attach(AdHoc::on_liftoff("Auto purge", move |rocket| {
                Box::pin(async move {
                    let shutdown = rocket.shutdown();
                    rocket::tokio::spawn(run_auto_purge(purge_state, schedule, shutdown));
                })
            }))
        }
        Ok(None) => rocket,
        Err(e) => {
            // Config validation normally catches this first
            warn!("Auto purge disabled: {}", e);
            rocket
        }
    };

    rocket.manage(state)
}

#[rocket::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(parse_log_level(&args.log_level))
        .format_timestamp_secs()
        .init();

    info!("RustyLlmLogs starting...");

    // Strip any surrounding quotes from config file path
    let config_file_path = args
        .config_file
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();

    let config = if Path::new(&config_file_path).exists() {
        setup_config(config_file_path.clone()).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file not found: {}. Starting with defaults and an in-memory database.",
            config_file_path
        );
        Config::default()
    };
    debug!("Loaded config: {:?}", &config);

    if args.validate_only {
        info!("Configuration is valid. Exiting (--validate-only mode).");
        return Ok(());
    }

    let store = LogStore::open_and_setup(&config.database_file)
        .with_context(|| format!("Failed to open log database: {}", config.database_file))?;
    info!("Database initialized successfully: {}", store.location());

    if let Some(legacy) = config.legacy_log_file.as_deref().filter(|l| !l.trim().is_empty()) {
        import_legacy_log(&store, Path::new(legacy))
            .with_context(|| format!("Failed to import legacy log file: {}", legacy))?;
    }

    if args.purge_days.is_some() || args.purge_count.is_some() {
        let policy = RetentionPolicy::from_params(args.purge_days, args.purge_count)
            .context("Invalid purge arguments")?;
        let deleted = purge(&store, policy).context("Purge failed")?;
        info!("Purge complete: {} entries deleted", deleted);
        return Ok(());
    }

    build_rocket(AppState::new(store, config)).launch().await?;
    Ok(())
}

fn parse_log_level(level: &str) -> log::LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    }
}

#[derive(Parser)]
#[command(name = "RustyLlmLogs")]
#[command(about = "Log retention and query service for an LLM console", long_about = None)]
struct Cli {
    #[arg(
        short = 'c',
        long = "config",
        default_value = "config.json",
        env = "LLMLOGS_CONFIG"
    )]
    config_file: String,

    #[arg(
        short = 'l',
        long = "log-level",
        default_value = "info",
        env = "LOG_LEVEL"
    )]
    log_level: String,

    #[arg(short = 'v', long = "validate-only")]
    validate_only: bool,

    /// Purge unlocked entries older than N days, then exit
    #[arg(long = "purge-days", conflicts_with = "purge_count")]
    purge_days: Option<i64>,

    /// Keep only the N newest unlocked entries, then exit
    #[arg(long = "purge-count", conflicts_with = "purge_days")]
    purge_count: Option<i64>,
}
