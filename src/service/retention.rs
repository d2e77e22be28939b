use crate::models::error::{LogError, Result};
use crate::repo::sqlite::{LogStore, PurgePredicate};
use chrono::{DateTime, Duration, Utc};
use log::info;
use std::fmt;

/// A bounded retention policy. Exactly one mode applies per purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Delete unlocked entries older than N days. An entry exactly N days old is kept.
    KeepDays(u32),
    /// Keep only the N newest unlocked entries. Locked entries are not ranked.
    KeepCount(u64),
}

impl RetentionPolicy {
    /// Build a policy from the two mutually exclusive request parameters
    pub fn from_params(days_to_keep: Option<i64>, count_to_keep: Option<i64>) -> Result<Self> {
        match (days_to_keep, count_to_keep) {
            (Some(_), Some(_)) => Err(LogError::InvalidRequest(
                "Provide only one of days_to_keep or count_to_keep".to_string(),
            )),
            (None, None) => Err(LogError::InvalidRequest(
                "Either days_to_keep or count_to_keep must be provided".to_string(),
            )),
            (Some(days), None) => u32::try_from(days).map(Self::KeepDays).map_err(|_| {
                LogError::InvalidRequest(format!(
                    "days_to_keep must be between 0 and {}, got {}",
                    u32::MAX,
                    days
                ))
            }),
            (None, Some(count)) => u64::try_from(count).map(Self::KeepCount).map_err(|_| {
                LogError::InvalidRequest(format!(
                    "count_to_keep must not be negative, got {}",
                    count
                ))
            }),
        }
    }

    /// Storage predicate for a purge evaluated at `now`
    pub fn predicate(&self, now: DateTime<Utc>) -> PurgePredicate {
        match *self {
            RetentionPolicy::KeepDays(days) => {
                let cutoff = now
                    .checked_sub_signed(Duration::days(i64::from(days)))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC);
                PurgePredicate::OlderThan(cutoff)
            }
            RetentionPolicy::KeepCount(count) => PurgePredicate::BeyondNewest(count),
        }
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetentionPolicy::KeepDays(days) => write!(f, "keep {} days", days),
            RetentionPolicy::KeepCount(count) => write!(f, "keep newest {} entries", count),
        }
    }
}

/// Run one purge with the current time
pub fn purge(store: &LogStore, policy: RetentionPolicy) -> Result<usize> {
    purge_at(store, policy, Utc::now())
}

/// Run one purge as of `now`. Locked entries always survive.
pub fn purge_at(store: &LogStore, policy: RetentionPolicy, now: DateTime<Utc>) -> Result<usize> {
    let predicate = policy.predicate(now);
    let deleted = store.delete_unlocked(predicate)?;
    info!("Purged {} log entries ({})", deleted, policy);
    Ok(deleted)
}
