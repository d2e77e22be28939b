use crate::models::log_entry::LogEntry;
use serde::{Deserialize, Serialize};

/// Pagination block returned alongside a page of log entries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    /// Always at least 1, even for an empty result
    pub pages: u64,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let pages = total.div_ceil(limit).max(1);
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

/// Response for GET /api/logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogPage {
    pub data: Vec<LogEntry>,
    pub pagination: Pagination,
}

/// Request body for PATCH /api/logs/<id>
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LockRequest {
    pub locked: bool,
}

/// Response for DELETE /api/logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeResponse {
    pub status: String,
    pub deleted: usize,
}

/// Response for POST /api/logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendResponse {
    pub status: String,
    pub id: i64,
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

/// Server-Sent Event data telling the UI the log table changed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEvent {
    Appended { id: i64, tag: Option<String> },
    LockChanged { id: i64, locked: bool },
    Purged { deleted: usize },
}
