use crate::models::error::Result;
use crate::models::log_entry::LogEntry;
use crate::repo::sqlite::LogStore;
use log::info;

/// Pin or unpin one entry. Once this returns with `locked = true`, no purge that
/// has not already removed the row can delete it.
pub fn set_lock(store: &LogStore, id: i64, locked: bool) -> Result<LogEntry> {
    let entry = store.set_locked(id, locked)?;
    info!(
        "Log entry {} {}",
        id,
        if locked { "pinned" } else { "unpinned" }
    );
    Ok(entry)
}
