use crate::models::error::{LogError, Result};
use crate::models::log_entry::NewLogEntry;
use crate::repo::sqlite::LogStore;
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// One line of the old newline-delimited JSON log file
#[derive(Debug, Deserialize)]
struct LegacyLine {
    timestamp: Option<String>,
    model: Option<String>,
    prompt: Option<String>,
    #[serde(default)]
    response: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    duration_ms: Option<f64>,
    #[serde(default)]
    metadata: Option<Value>,
    #[serde(default)]
    tag: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Import a legacy JSONL log into the store once, then rename it to `*.jsonl.bak`.
/// Missing files are not an error; unparseable lines are skipped and counted.
/// All rows and the rename succeed together or not at all.
pub fn import_legacy_log(store: &LogStore, path: &Path) -> Result<Option<ImportSummary>> {
    if !path.is_file() {
        return Ok(None);
    }

    info!("Migrating legacy logs from {}", path.display());
    let content = fs::read_to_string(path)?;
    let mut summary = ImportSummary::default();
    let mut entries = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!("Skipping bad line {} during migration: {}", line_no + 1, e);
                summary.skipped += 1;
            }
        }
    }

    let backup = backup_path(path);
    let result = store.append_batch(&entries, || {
        fs::rename(path, &backup)?;
        Ok(())
    });

    match result {
        Ok(ids) => summary.imported = ids.len(),
        Err(e) => {
            // The rename happened but the commit did not; put the file back for the next start
            if backup.is_file() && !path.exists() {
                if let Err(restore) = fs::rename(&backup, path) {
                    warn!(
                        "Could not restore {} after failed migration: {}",
                        path.display(),
                        restore
                    );
                }
            }
            return Err(e);
        }
    }

    info!(
        "Migrated {} logs ({} skipped); legacy file moved to {}",
        summary.imported,
        summary.skipped,
        backup.display()
    );

    Ok(Some(summary))
}

fn parse_line(line: &str) -> Result<NewLogEntry> {
    let legacy: LegacyLine = serde_json::from_str(line).map_err(|cause| {
        LogError::Serialization {
            field: "legacy log line".to_string(),
            cause,
        }
    })?;

    let model = legacy.model.unwrap_or_default();
    let prompt = legacy.prompt.unwrap_or_default();
    let duration_ms = legacy.duration_ms.unwrap_or(0.0);

    let mut entry = match legacy.error.filter(|e| !e.trim().is_empty()) {
        Some(error) => NewLogEntry::failure(&model, &prompt, &error, duration_ms),
        None => NewLogEntry::success(
            &model,
            &prompt,
            legacy.response.unwrap_or(Value::Null),
            duration_ms,
        ),
    };

    if let Some(metadata) = legacy.metadata.filter(Value::is_object) {
        entry = entry.with_metadata(metadata);
    }
    if let Some(tag) = legacy.tag {
        entry = entry.with_tag(&tag);
    }
    let timestamp = legacy
        .timestamp
        .as_deref()
        .and_then(parse_legacy_timestamp)
        .ok_or_else(|| {
            LogError::InvalidRequest("legacy line has no valid timestamp".to_string())
        })?;

    entry.at(timestamp).validate()
}

/// The old writer used naive UTC ISO timestamps without an offset
fn parse_legacy_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}
