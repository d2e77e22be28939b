use crate::models::config_validator::validate_config;
use crate::models::error::{LogError, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub database_file: String,
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u64,
    #[serde(default)]
    pub legacy_log_file: Option<String>,
    #[serde(default)]
    pub auto_purge: Option<AutoPurge>,
}

/// Scheduled retention run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutoPurge {
    /// Cron expression with seconds, e.g. "0 0 3 * * *"
    pub schedule: String,
    #[serde(default)]
    pub days_to_keep: Option<i64>,
    #[serde(default)]
    pub count_to_keep: Option<i64>,
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}
const fn default_port() -> u16 {
    31161
}
const fn default_page_limit() -> u64 {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_file: ":memory:".to_string(),
            address: default_address(),
            port: default_port(),
            default_page_limit: default_page_limit(),
            legacy_log_file: None,
            auto_purge: None,
        }
    }
}

pub fn setup_config(config_file: String) -> Result<Config> {
    let config_path = PathBuf::from(config_file);
    info!("Loading config from: {}", config_path.display());

    let config_str = fs::read_to_string(&config_path).map_err(|cause| LogError::ConfigRead {
        path: config_path.clone(),
        cause,
    })?;

    let config: Config =
        serde_json::from_str(&config_str).map_err(|cause| LogError::ConfigParse {
            path: config_path,
            cause,
        })?;

    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_load_valid_config_with_all_fields() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("logs.db");

        let config_content = format!(
            r#"{{
            "database_file": "{}",
            "address": "0.0.0.0",
            "port": 8080,
            "default_page_limit": 25,
            "legacy_log_file": "logs/llm.jsonl",
            "auto_purge": {{ "schedule": "0 0 3 * * *", "count_to_keep": 500 }}
        }}"#,
            db_path.to_str().unwrap().replace('\\', "\\\\")
        );
        let temp_file = write_config(&config_content);

        let config = setup_config(temp_file.path().to_str().unwrap().to_string()).unwrap();

        assert_eq!(config.address, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.default_page_limit, 25);
        assert_eq!(config.legacy_log_file.as_deref(), Some("logs/llm.jsonl"));
        let auto_purge = config.auto_purge.unwrap();
        assert_eq!(auto_purge.count_to_keep, Some(500));
        assert_eq!(auto_purge.days_to_keep, None);
    }

    #[test]
    fn test_load_config_with_defaults() {
        let temp_file = write_config(r#"{ "database_file": ":memory:" }"#);

        let config = setup_config(temp_file.path().to_str().unwrap().to_string()).unwrap();

        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.port, 31161);
        assert_eq!(config.default_page_limit, 50);
        assert!(config.legacy_log_file.is_none());
        assert!(config.auto_purge.is_none());
    }

    #[test]
    fn test_error_on_missing_config_file() {
        let result = setup_config("/this/does/not/exist/config.json".to_string());
        assert!(matches!(result, Err(LogError::ConfigRead { .. })));
    }

    #[test]
    fn test_error_on_invalid_json() {
        let temp_file = write_config(r#"{ "database_file": ":memory:", "port": }"#);
        let result = setup_config(temp_file.path().to_str().unwrap().to_string());
        assert!(matches!(result, Err(LogError::ConfigParse { .. })));
    }

    #[test]
    fn test_error_on_missing_required_fields() {
        let temp_file = write_config(r#"{ "port": 9000 }"#);
        let result = setup_config(temp_file.path().to_str().unwrap().to_string());
        assert!(matches!(result, Err(LogError::ConfigParse { .. })));
    }

    #[test]
    fn test_validation_failure_is_reported() {
        let temp_file = write_config(r#"{ "database_file": ":memory:", "default_page_limit": 0 }"#);
        let result = setup_config(temp_file.path().to_str().unwrap().to_string());
        assert!(matches!(result, Err(LogError::InvalidConfig(_))));
    }
}
