use crate::models::api::{LogPage, Pagination};
use crate::models::error::{LogError, Result};
use crate::repo::sqlite::{LogFilter, LogStore};
use chrono::{DateTime, Utc};
use log::debug;

/// Validated page request
#[derive(Debug, Clone, PartialEq)]
pub struct LogQuery {
    pub page: u64,
    pub limit: u64,
    pub filter: LogFilter,
}

impl LogQuery {
    /// Validate raw request parameters. Missing page defaults to 1 and missing
    /// limit to `default_limit`; anything non-positive is rejected.
    pub fn from_params(
        page: Option<i64>,
        limit: Option<i64>,
        tag: Option<String>,
        start_date: Option<&str>,
        end_date: Option<&str>,
        default_limit: u64,
    ) -> Result<Self> {
        let page = positive("page", page.unwrap_or(1))?;
        let limit = match limit {
            Some(limit) => positive("limit", limit)?,
            None => default_limit.max(1),
        };

        let start = start_date.map(|d| parse_date("start_date", d)).transpose()?;
        let end = end_date.map(|d| parse_date("end_date", d)).transpose()?;
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(LogError::InvalidRequest(
                    "start_date must not be after end_date".to_string(),
                ));
            }
        }

        // An empty tag from the filter dropdown means "all tags"
        let tag = tag.filter(|t| !t.is_empty());

        Ok(Self {
            page,
            limit,
            filter: LogFilter { tag, start, end },
        })
    }

    /// Row offset of the first entry on this page, None if it cannot exist
    fn offset(&self) -> Option<u64> {
        (self.page - 1).checked_mul(self.limit)
    }
}

fn positive(name: &str, value: i64) -> Result<u64> {
    if value < 1 {
        return Err(LogError::InvalidRequest(format!(
            "{} must be a positive integer, got {}",
            name, value
        )));
    }
    Ok(value as u64)
}

/// Accepts RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` / `YYYY-MM-DD` read as UTC
fn parse_date(name: &str, value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Some(dt) =
        restore_offset_sign(value).and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
    {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(LogError::InvalidRequest(format!(
        "{} is not a valid date: {}",
        name, value
    )))
}

/// An unencoded `+` offset in a query string arrives as a space: `2024-01-01T10:00:00 02:00`
fn restore_offset_sign(value: &str) -> Option<String> {
    let (datetime, offset) = value.rsplit_once(' ')?;
    datetime
        .contains('T')
        .then(|| format!("{}+{}", datetime, offset))
}

/// Fetch one page. A page past the end is empty but still reports the true totals.
pub fn run_query(store: &LogStore, query: &LogQuery) -> Result<LogPage> {
    let (data, total) = match query.offset() {
        Some(offset) => store.query_page(&query.filter, query.limit, offset)?,
        None => {
            let (_, total) = store.query_page(&query.filter, 1, u64::MAX)?;
            (Vec::new(), total)
        }
    };

    debug!(
        "Log query page {} (limit {}, filter {:?}) returned {} of {}",
        query.page,
        query.limit,
        query.filter,
        data.len(),
        total
    );

    Ok(LogPage {
        data,
        pagination: Pagination::new(query.page, query.limit, total),
    })
}
