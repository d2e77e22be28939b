use crate::models::config_validator::is_in_memory;
use crate::models::error::{LogError, Result};
use crate::models::log_entry::{LogEntry, NewLogEntry};
use chrono::{DateTime, Utc};
use log::{debug, info};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, Row, ToSql, TransactionBehavior};
use serde_json::Value;
use std::sync::Arc;

type DbPool = Pool<SqliteConnectionManager>;

const LOG_COLUMNS: &str =
    "ID, Timestamp, Model, Prompt, Response, Duration_Ms, Error, Metadata, Locked, Tag";

/// Row filter shared by the page query and its total
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogFilter {
    pub tag: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Which unlocked rows a purge removes. Locked rows are never matched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PurgePredicate {
    /// Unlocked rows strictly older than the cutoff
    OlderThan(DateTime<Utc>),
    /// Unlocked rows ranked past the N newest unlocked rows
    BeyondNewest(u64),
}

/// Durable store of LLM invocation records backed by a pooled SQLite database
#[derive(Clone)]
pub struct LogStore {
    pool: Arc<DbPool>,
    location: String,
}

impl LogStore {
    /// Open (or create) the database and build the connection pool
    pub fn open(db_file: &str) -> Result<Self> {
        if db_file.is_empty() {
            return Err(LogError::InvalidConfig(
                "Database file path cannot be empty. Provide a valid path or use ':memory:' for in-memory database.".to_string(),
            ));
        }

        info!("Initializing database connection pool: {}", db_file);

        let in_memory = is_in_memory(db_file);
        let use_wal = !in_memory;

        let manager = if db_file == ":memory:" {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(db_file)
        }
        .with_init(move |conn| {
            let mut pragmas = String::from(
                "PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;",
            );

            if use_wal {
                pragmas.push_str(" PRAGMA journal_mode = WAL;");
            }

            conn.execute_batch(&pragmas)
        });

        // Every in-memory connection would otherwise see its own private database
        let pool_size = if in_memory {
            1
        } else {
            num_cpus::get_physical() + 7
        };
        let mut builder = r2d2::Pool::builder().max_size(pool_size as u32);
        if in_memory {
            // Recycling the only connection would drop the database with it
            builder = builder.max_lifetime(None).idle_timeout(None);
        }
        let pool = builder
            .build(manager)
            .map_err(|cause| LogError::DatabaseConnection {
                path: db_file.to_string(),
                cause,
            })?;

        info!("Database pool created with {} connections", pool_size);

        Ok(Self {
            pool: Arc::new(pool),
            location: db_file.to_string(),
        })
    }

    /// Open the database and make sure the schema is current
    pub fn open_and_setup(db_file: &str) -> Result<Self> {
        let store = Self::open(db_file)?;
        store.setup_database()?;
        Ok(store)
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn get_connection(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|cause| LogError::DatabaseConnection {
                path: self.location.clone(),
                cause,
            })
    }

    pub fn setup_database(&self) -> Result<()> {
        info!("Initializing database schema");
        let setup_queries = "BEGIN;
        PRAGMA ENCODING = 'UTF-8';

        CREATE TABLE IF NOT EXISTS Logs(
            ID            integer not null
                constraint Logs_ID_pk
                    primary key autoincrement,
            Timestamp     integer not null,
            Model         TEXT    not null,
            Prompt        TEXT    not null,
            Response      TEXT,
            Duration_Ms   REAL    not null default 0,
            Error         TEXT,
            Metadata      TEXT    not null default '{}',
            Locked        integer not null default 0,
            Tag           TEXT);

        COMMIT;";

        let conn = self.get_connection()?;
        conn.execute_batch(setup_queries)
            .map_err(LogError::query("create tables"))?;

        migrate_columns(&conn)?;

        let index_queries = "
        CREATE INDEX IF NOT EXISTS Logs_Timestamp_ID_index
                on Logs (Timestamp DESC, ID DESC);

        CREATE INDEX IF NOT EXISTS Logs_Tag_index
                on Logs (Tag);

        CREATE INDEX IF NOT EXISTS Logs_Locked_Timestamp_index
                on Logs (Locked, Timestamp DESC);";

        conn.execute_batch(index_queries)
            .map_err(LogError::query("create indexes"))?;

        info!("Database schema initialized successfully");
        Ok(())
    }

    /// Persist a new entry and return its freshly assigned ID
    pub fn append(&self, entry: &NewLogEntry) -> Result<i64> {
        let conn = self.get_connection()?;
        let id = insert_entry(&conn, entry)?;
        debug!("Inserted log entry {} for model {}", id, entry.model);
        Ok(id)
    }

    /// Insert every entry in one write transaction. `before_commit` runs inside the
    /// transaction; if it fails, none of the entries are written.
    pub fn append_batch<F>(&self, entries: &[NewLogEntry], before_commit: F) -> Result<Vec<i64>>
    where
        F: FnOnce() -> Result<()>,
    {
        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(LogError::query("begin batch insert"))?;

        let ids = entries
            .iter()
            .map(|entry| insert_entry(&tx, entry))
            .collect::<Result<Vec<i64>>>()?;

        before_commit()?;

        tx.commit().map_err(LogError::query("commit batch insert"))?;

        debug!("Inserted {} log entries in one batch", ids.len());
        Ok(ids)
    }

    pub fn get(&self, id: i64) -> Result<LogEntry> {
        let conn = self.get_connection()?;
        conn.query_row(
            &format!("SELECT {} FROM Logs WHERE ID = ?1", LOG_COLUMNS),
            [id],
            map_log_row,
        )
        .optional()
        .map_err(LogError::query("select log entry"))?
        .ok_or(LogError::NotFound { id })
    }

    /// Set the pin flag. Runs under the database write lock, so it can never
    /// interleave with a purge deciding on the same row.
    pub fn set_locked(&self, id: i64, locked: bool) -> Result<LogEntry> {
        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(LogError::query("begin lock update"))?;

        let entry = tx
            .query_row(
                &format!(
                    "UPDATE Logs SET Locked = ?1 WHERE ID = ?2 RETURNING {}",
                    LOG_COLUMNS
                ),
                (locked, id),
                map_log_row,
            )
            .optional()
            .map_err(LogError::query("update lock"))?;

        tx.commit().map_err(LogError::query("commit lock update"))?;

        entry.ok_or(LogError::NotFound { id })
    }

    /// Bulk delete of unlocked rows matching the predicate. The lock check and the
    /// delete are one statement in one write transaction; the returned count is
    /// what was actually removed.
    pub fn delete_unlocked(&self, predicate: PurgePredicate) -> Result<usize> {
        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(LogError::query("begin purge"))?;

        let deleted = match predicate {
            PurgePredicate::OlderThan(cutoff) => tx.execute(
                "DELETE FROM Logs WHERE Locked = 0 AND Timestamp < ?1",
                [cutoff.timestamp_micros()],
            ),
            PurgePredicate::BeyondNewest(keep) => tx.execute(
                "DELETE FROM Logs
                 WHERE Locked = 0
                   AND ID NOT IN (
                       SELECT ID FROM Logs
                       WHERE Locked = 0
                       ORDER BY Timestamp DESC, ID DESC
                       LIMIT ?1)",
                [i64::try_from(keep).unwrap_or(i64::MAX)],
            ),
        }
        .map_err(LogError::query("purge logs"))?;

        tx.commit().map_err(LogError::query("commit purge"))?;

        debug!("Deleted {} log entries ({:?})", deleted, predicate);
        Ok(deleted)
    }

    /// Distinct non-empty tags, sorted
    pub fn list_tags(&self) -> Result<Vec<String>> {
        let conn = self.get_connection()?;
        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT Tag FROM Logs
                 WHERE Tag IS NOT NULL AND Tag != ''
                 ORDER BY Tag",
            )
            .map_err(LogError::query("list tags"))?;

        let tags = stmt
            .query_map([], |row| row.get(0))
            .map_err(LogError::query("list tags"))?;

        tags.collect::<rusqlite::Result<Vec<String>>>()
            .map_err(LogError::query("collect tags"))
    }

    /// One page of matching rows plus the total match count, both read from the
    /// same snapshot. Newest first, ties broken by descending ID.
    pub fn query_page(
        &self,
        filter: &LogFilter,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<LogEntry>, u64)> {
        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .map_err(LogError::query("begin log query"))?;

        let (where_clause, mut params) = filter_clause(filter);

        let total: i64 = {
            let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
            tx.query_row(
                &format!("SELECT COUNT(*) FROM Logs{}", where_clause),
                param_refs.as_slice(),
                |row| row.get(0),
            )
            .map_err(LogError::query("count logs"))?
        };
        let total = total.max(0) as u64;

        // An offset past i64 is necessarily past the end
        let Ok(offset) = i64::try_from(offset) else {
            return Ok((Vec::new(), total));
        };
        if offset as u64 >= total {
            return Ok((Vec::new(), total));
        }

        params.push(Box::new(i64::try_from(limit).unwrap_or(i64::MAX)));
        params.push(Box::new(offset));
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let entries = {
            let mut stmt = tx
                .prepare(&format!(
                    "SELECT {} FROM Logs{} ORDER BY Timestamp DESC, ID DESC LIMIT ? OFFSET ?",
                    LOG_COLUMNS, where_clause
                ))
                .map_err(LogError::query("query logs"))?;

            let rows = stmt
                .query_map(param_refs.as_slice(), map_log_row)
                .map_err(LogError::query("query logs"))?;

            rows.collect::<rusqlite::Result<Vec<LogEntry>>>()
                .map_err(LogError::query("collect log rows"))?
        };

        tx.commit().map_err(LogError::query("end log query"))?;

        Ok((entries, total))
    }
}

fn insert_entry(conn: &rusqlite::Connection, entry: &NewLogEntry) -> Result<i64> {
    let timestamp = entry.timestamp.unwrap_or_else(Utc::now);

    let response = entry
        .response
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|cause| LogError::Serialization {
            field: "response".to_string(),
            cause,
        })?;
    let metadata =
        serde_json::to_string(&entry.metadata).map_err(|cause| LogError::Serialization {
            field: "metadata".to_string(),
            cause,
        })?;

    conn.query_row(
        "INSERT INTO Logs (Timestamp, Model, Prompt, Response, Duration_Ms, Error, Metadata, Locked, Tag)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)
         RETURNING ID",
        (
            timestamp.timestamp_micros(),
            &entry.model,
            &entry.prompt,
            response,
            entry.duration_ms,
            &entry.error,
            metadata,
            &entry.tag,
        ),
        |row| row.get(0),
    )
    .map_err(LogError::query("insert log entry"))
}

fn filter_clause(filter: &LogFilter) -> (String, Vec<Box<dyn ToSql>>) {
    let mut conditions = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(tag) = &filter.tag {
        conditions.push("Tag = ?");
        params.push(Box::new(tag.clone()));
    }

    if let Some(start) = filter.start {
        conditions.push("Timestamp >= ?");
        params.push(Box::new(start.timestamp_micros()));
    }

    if let Some(end) = filter.end {
        conditions.push("Timestamp <= ?");
        params.push(Box::new(end.timestamp_micros()));
    }

    if conditions.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), params)
    }
}

fn map_log_row(row: &Row) -> rusqlite::Result<LogEntry> {
    let micros: i64 = row.get(1)?;
    let timestamp = DateTime::from_timestamp_micros(micros)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(1, micros))?;

    // Every writer stores JSON text; anything unparseable is kept as a plain string
    let response = row
        .get::<_, Option<String>>(4)?
        .map(|raw| serde_json::from_str(&raw).unwrap_or(Value::String(raw)));

    let metadata = row
        .get::<_, Option<String>>(7)?
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_else(|| Value::Object(Default::default()));

    Ok(LogEntry {
        id: row.get(0)?,
        timestamp,
        model: row.get(2)?,
        prompt: row.get(3)?,
        response,
        duration_ms: row.get(5)?,
        error: row.get(6)?,
        metadata,
        locked: row.get(8)?,
        tag: row.get(9)?,
    })
}

/// Add columns introduced after the first schema version
fn migrate_columns(conn: &rusqlite::Connection) -> Result<()> {
    let columns = {
        let mut stmt = conn
            .prepare("SELECT name FROM pragma_table_info('Logs')")
            .map_err(LogError::query("read Logs columns"))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(LogError::query("read Logs columns"))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(LogError::query("read Logs columns"))?;
        names
    };

    let has = |name: &str| columns.iter().any(|c| c.eq_ignore_ascii_case(name));

    if !has("Locked") {
        info!("Migrating Logs table: adding Locked column");
        conn.execute(
            "ALTER TABLE Logs ADD COLUMN Locked integer not null default 0",
            [],
        )
        .map_err(LogError::query("add Locked column"))?;
    }

    if !has("Tag") {
        info!("Migrating Logs table: adding Tag column");
        conn.execute("ALTER TABLE Logs ADD COLUMN Tag TEXT", [])
            .map_err(LogError::query("add Tag column"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup_test_store() -> LogStore {
        LogStore::open_and_setup(":memory:").unwrap()
    }

    fn entry(days_old: i64) -> NewLogEntry {
        NewLogEntry::success("openrouter:gpt-4o", "prompt", json!("answer"), 10.0)
            .at(Utc::now() - Duration::days(days_old))
    }

    #[test]
    fn test_setup_database_creates_schema() {
        let store = setup_test_store();
        let conn = store.get_connection().unwrap();
        let result = conn.prepare("SELECT ID, Timestamp, Locked, Tag FROM Logs");
        assert!(result.is_ok());
    }

    #[test]
    fn test_setup_database_is_idempotent() {
        let store = setup_test_store();
        store.setup_database().unwrap();
        store.setup_database().unwrap();
    }

    #[test]
    fn test_open_rejects_empty_path() {
        assert!(LogStore::open("").is_err());
    }

    #[test]
    fn test_migrates_table_without_lock_and_tag() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("old.db");
        {
            let conn = rusqlite::Connection::open(&db_path).unwrap();
            conn.execute_batch(
                "CREATE TABLE Logs(
                    ID integer not null primary key autoincrement,
                    Timestamp integer not null,
                    Model TEXT not null,
                    Prompt TEXT not null,
                    Response TEXT,
                    Duration_Ms REAL not null default 0,
                    Error TEXT,
                    Metadata TEXT not null default '{}');
                 INSERT INTO Logs (Timestamp, Model, Prompt, Response)
                    VALUES (1700000000000000, 'm', 'p', 'plain text');",
            )
            .unwrap();
        }

        let store = LogStore::open_and_setup(db_path.to_str().unwrap()).unwrap();
        let migrated = store.get(1).unwrap();

        assert!(!migrated.locked);
        assert!(migrated.tag.is_none());
        // Non-JSON response text falls back to a plain string
        assert_eq!(migrated.response, Some(json!("plain text")));
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let store = setup_test_store();
        let first = store.append(&entry(0)).unwrap();
        let second = store.append(&entry(0)).unwrap();
        assert!(first > 0);
        assert!(second > first);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let store = setup_test_store();
        store.append(&entry(0)).unwrap();
        let newest = store.append(&entry(0)).unwrap();

        store
            .delete_unlocked(PurgePredicate::BeyondNewest(0))
            .unwrap();

        let next = store.append(&entry(0)).unwrap();
        assert!(next > newest);
    }

    #[test]
    fn test_append_batch_inserts_all_in_order() {
        let store = setup_test_store();
        let ids = store
            .append_batch(&[entry(3), entry(2), entry(1)], || Ok(()))
            .unwrap();

        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        let (_, total) = store.query_page(&LogFilter::default(), 10, 0).unwrap();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_append_batch_rolls_back_when_hook_fails() {
        let store = setup_test_store();
        let result = store.append_batch(&[entry(1), entry(2)], || {
            Err(LogError::InvalidRequest("rename failed".to_string()))
        });

        assert!(result.is_err());
        let (rows, total) = store.query_page(&LogFilter::default(), 10, 0).unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn test_string_responses_that_look_like_json_stay_strings() {
        let store = setup_test_store();
        for text in ["42", "true", "null", "[1, 2]"] {
            let id = store
                .append(&NewLogEntry::success("m", "p", json!(text), 1.0))
                .unwrap();
            assert_eq!(store.get(id).unwrap().response, Some(json!(text)));
        }
    }

    #[test]
    fn test_get_round_trips_fields() {
        let store = setup_test_store();
        let new_entry = NewLogEntry::success(
            "ollama:llama3",
            "Generate a user profile",
            json!({"name": "Alice", "age": 30}),
            2100.25,
        )
        .with_metadata(json!({"format": "dict", "usage": {"total_tokens": 280}}))
        .with_tag("user-gen");

        let id = store.append(&new_entry).unwrap();
        let stored = store.get(id).unwrap();

        assert_eq!(stored.id, id);
        assert_eq!(stored.model, "ollama:llama3");
        assert_eq!(stored.response, Some(json!({"name": "Alice", "age": 30})));
        assert_eq!(stored.metadata["format"], "dict");
        assert_eq!(stored.duration_ms, 2100.25);
        assert_eq!(stored.tag.as_deref(), Some("user-gen"));
        assert!(stored.error.is_none());
        assert!(!stored.locked);
    }

    #[test]
    fn test_get_failure_entry_has_no_response() {
        let store = setup_test_store();
        let id = store
            .append(&NewLogEntry::failure("m", "p", "Context length exceeded", 5000.0))
            .unwrap();
        let stored = store.get(id).unwrap();
        assert!(stored.response.is_none());
        assert_eq!(stored.error.as_deref(), Some("Context length exceeded"));
    }

    #[test]
    fn test_get_missing_returns_not_found() {
        let store = setup_test_store();
        assert!(matches!(
            store.get(42),
            Err(LogError::NotFound { id: 42 })
        ));
    }

    #[test]
    fn test_set_locked_is_idempotent() {
        let store = setup_test_store();
        let id = store.append(&entry(0)).unwrap();

        assert!(store.set_locked(id, true).unwrap().locked);
        assert!(store.set_locked(id, true).unwrap().locked);
        assert!(store.get(id).unwrap().locked);

        assert!(!store.set_locked(id, false).unwrap().locked);
    }

    #[test]
    fn test_set_locked_missing_returns_not_found() {
        let store = setup_test_store();
        assert!(matches!(
            store.set_locked(7, true),
            Err(LogError::NotFound { id: 7 })
        ));
    }

    #[test]
    fn test_delete_older_than_skips_locked() {
        let store = setup_test_store();
        let old_locked = store.append(&entry(30)).unwrap();
        let old_unlocked = store.append(&entry(30)).unwrap();
        let fresh = store.append(&entry(1)).unwrap();
        store.set_locked(old_locked, true).unwrap();

        let deleted = store
            .delete_unlocked(PurgePredicate::OlderThan(Utc::now() - Duration::days(10)))
            .unwrap();

        assert_eq!(deleted, 1);
        assert!(store.get(old_locked).is_ok());
        assert!(matches!(
            store.get(old_unlocked),
            Err(LogError::NotFound { .. })
        ));
        assert!(store.get(fresh).is_ok());
    }

    #[test]
    fn test_delete_beyond_newest_ranks_unlocked_only() {
        let store = setup_test_store();
        let newest_locked = store.append(&entry(1)).unwrap();
        let second = store.append(&entry(2)).unwrap();
        let third = store.append(&entry(3)).unwrap();
        store.set_locked(newest_locked, true).unwrap();

        let deleted = store
            .delete_unlocked(PurgePredicate::BeyondNewest(1))
            .unwrap();

        assert_eq!(deleted, 1);
        assert!(store.get(newest_locked).is_ok());
        assert!(store.get(second).is_ok());
        assert!(store.get(third).is_err());
    }

    #[test]
    fn test_list_tags_distinct_and_sorted() {
        let store = setup_test_store();
        store.append(&entry(0).with_tag("physics-101")).unwrap();
        store.append(&entry(0).with_tag("geography")).unwrap();
        store.append(&entry(0).with_tag("physics-101")).unwrap();
        store.append(&entry(0)).unwrap();

        assert_eq!(
            store.list_tags().unwrap(),
            vec!["geography".to_string(), "physics-101".to_string()]
        );
    }

    #[test]
    fn test_query_page_orders_newest_first_with_id_tiebreak() {
        let store = setup_test_store();
        let instant = Utc::now() - Duration::hours(1);
        let older = store.append(&entry(5)).unwrap();
        let tie_a = store.append(&entry(0).at(instant)).unwrap();
        let tie_b = store.append(&entry(0).at(instant)).unwrap();

        let (rows, total) = store.query_page(&LogFilter::default(), 10, 0).unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

        assert_eq!(total, 3);
        assert_eq!(ids, vec![tie_b, tie_a, older]);
    }

    #[test]
    fn test_query_page_filters_by_tag_and_dates() {
        let store = setup_test_store();
        store.append(&entry(1).with_tag("a")).unwrap();
        store.append(&entry(20).with_tag("a")).unwrap();
        store.append(&entry(1).with_tag("b")).unwrap();

        let filter = LogFilter {
            tag: Some("a".to_string()),
            start: Some(Utc::now() - Duration::days(7)),
            end: None,
        };
        let (rows, total) = store.query_page(&filter, 10, 0).unwrap();

        assert_eq!(total, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tag.as_deref(), Some("a"));
    }

    #[test]
    fn test_query_page_offset_past_end_is_empty() {
        let store = setup_test_store();
        store.append(&entry(0)).unwrap();

        let (rows, total) = store
            .query_page(&LogFilter::default(), 10, u64::MAX)
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 1);
    }

    #[test]
    fn test_file_database_shared_across_pool() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("logs.db");
        let store = LogStore::open_and_setup(db_path.to_str().unwrap()).unwrap();

        let id = store.append(&entry(0)).unwrap();
        let clone = store.clone();
        let handle = std::thread::spawn(move || clone.get(id).unwrap());

        assert_eq!(handle.join().unwrap().id, id);
        assert_eq!(store.location(), db_path.to_str().unwrap());
    }
}
