use crate::models::config::{AutoPurge, Config};
use crate::models::error::{LogError, Result};
use crate::service::scheduler::PurgeSchedule;
use log::{info, warn};
use std::fs;
use std::path::Path;

/// Validates the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    info!("Validating configuration...");

    validate_numeric_values(config)?;

    validate_database_path(&config.database_file)?;

    if let Some(auto_purge) = &config.auto_purge {
        validate_auto_purge(auto_purge)?;
    }

    if let Some(legacy) = &config.legacy_log_file {
        if legacy.trim().is_empty() {
            warn!("legacy_log_file is empty and will be ignored");
        }
    }

    info!("Configuration validation passed");
    Ok(())
}

fn validate_numeric_values(config: &Config) -> Result<()> {
    if config.default_page_limit == 0 {
        return Err(LogError::InvalidConfig(
            "default_page_limit must be greater than 0".to_string(),
        ));
    }

    if config.port == 0 {
        return Err(LogError::InvalidConfig(
            "port must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// `:memory:` and shared-cache URIs are always accepted
pub fn is_in_memory(db_file: &str) -> bool {
    db_file == ":memory:" || db_file.starts_with("file::memory:")
}

fn validate_database_path(db_file: &str) -> Result<()> {
    if db_file.trim().is_empty() {
        return Err(LogError::InvalidConfig(
            "database_file cannot be empty. Provide a path or use ':memory:'".to_string(),
        ));
    }

    if is_in_memory(db_file) {
        info!("Using in-memory database");
        return Ok(());
    }

    let path = Path::new(db_file);

    if path.exists() {
        if !path.is_file() {
            return Err(LogError::InvalidConfig(format!(
                "Database path exists but is not a file: {}",
                db_file
            )));
        }

        if let Err(e) = fs::OpenOptions::new().read(true).write(true).open(path) {
            return Err(LogError::InvalidConfig(format!(
                "Database file is not readable/writable: {}\nError: {}",
                db_file, e
            )));
        }
        return Ok(());
    }

    let parent = path.parent().ok_or_else(|| {
        LogError::InvalidConfig(format!("Database path has no parent directory: {}", db_file))
    })?;

    // An empty parent is the current directory
    if !parent.as_os_str().is_empty() && !parent.exists() {
        #[cfg(windows)]
        let suggestion = format!("mkdir \"{}\"", parent.display());
        #[cfg(not(windows))]
        let suggestion = format!("mkdir -p \"{}\"", parent.display());

        return Err(LogError::InvalidConfig(format!(
            "Database parent directory does not exist: {}\nSuggestion: Create the directory with: {}",
            db_file, suggestion
        )));
    }

    Ok(())
}

fn validate_auto_purge(auto_purge: &AutoPurge) -> Result<()> {
    let schedule = PurgeSchedule::from_config(auto_purge)?;

    info!(
        "Auto purge validated: {} on schedule '{}'",
        schedule.policy(),
        auto_purge.schedule
    );
    Ok(())
}
