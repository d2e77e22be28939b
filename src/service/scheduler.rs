use crate::api_state::AppState;
use crate::models::api::LogEvent;
use crate::models::config::AutoPurge;
use crate::models::error::{LogError, Result};
use crate::service::retention::{purge, RetentionPolicy};
use chrono::Utc;
use cron::Schedule;
use log::{info, warn};
use rocket::tokio::{select, task, time};
use rocket::Shutdown;
use std::str::FromStr;

/// A parsed auto-purge configuration
#[derive(Debug, Clone)]
pub struct PurgeSchedule {
    schedule: Schedule,
    policy: RetentionPolicy,
}

impl PurgeSchedule {
    pub fn from_config(auto_purge: &AutoPurge) -> Result<Self> {
        let schedule = Schedule::from_str(&auto_purge.schedule).map_err(|e| {
            LogError::InvalidConfig(format!(
                "Invalid cron expression in auto_purge.schedule: {}\nError: {}\nExample: '0 0 3 * * *' for daily at 3am",
                auto_purge.schedule, e
            ))
        })?;
        let policy =
            RetentionPolicy::from_params(auto_purge.days_to_keep, auto_purge.count_to_keep)
                .map_err(|e| LogError::InvalidConfig(format!("auto_purge: {}", e)))?;

        Ok(Self { schedule, policy })
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Time until the next scheduled run, None when the schedule has no future runs
    pub fn until_next(&self) -> Option<std::time::Duration> {
        let next = self.schedule.upcoming(Utc).next()?;
        Some(
            (next - Utc::now())
                .to_std()
                .unwrap_or(std::time::Duration::from_secs(0)),
        )
    }
}

/// Purge on a cron schedule until the server shuts down
pub async fn run_auto_purge(state: AppState, schedule: PurgeSchedule, mut shutdown: Shutdown) {
    info!("Starting scheduled purge ({})", schedule.policy());

    loop {
        let Some(wait) = schedule.until_next() else {
            warn!("No upcoming scheduled purge times found");
            break;
        };
        info!("Next purge in {} seconds", wait.as_secs());

        select! {
            _ = time::sleep(wait) => {}
            _ = &mut shutdown => break,
        }

        let store = state.store().clone();
        let policy = schedule.policy();
        match task::spawn_blocking(move || purge(&store, policy)).await {
            Ok(Ok(deleted)) => state.notify(LogEvent::Purged { deleted }),
            Ok(Err(e)) => warn!("Scheduled purge failed: {}", e),
            Err(e) => warn!("Scheduled purge task panicked: {}", e),
        }
    }

    info!("Purge scheduler stopped");
}
