//! Retention cleanup for the correlation log
//!
//! Age-based bulk deletion plus a background task that runs it once a day at
//! a configured hour.

use crate::error::StoreResult;
use crate::store::db::LogStore;
use anyhow::Result;
use chrono::{Datelike, Timelike};
use std::time::Duration;
use tokio::time;

/// Retention policy configuration.
#[derive(Debug, Clone, Copy)]
pub struct RetentionConfig {
    /// Entries older than this many days are deleted
    pub ttl_days: u32,

    /// Hour of day (0-23) at which the daily cleanup runs
    pub cleanup_hour: u32,

    /// How often the task checks whether it is cleanup time
    pub check_interval: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            ttl_days: 30,
            cleanup_hour: 3,
            check_interval: Duration::from_secs(3600),
        }
    }
}

impl LogStore {
    /// Delete every entry created strictly before `cutoff` (Unix ms).
    /// Entries created exactly at the cutoff are kept. Returns the number of
    /// entries removed.
    ///
    /// Safe to run concurrently with inserts. An insert racing the cleanup
    /// with a backdated creation time older than the cutoff may be deleted;
    /// that is accepted behavior under clock skew.
    pub async fn cleanup(&self, cutoff: u64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM correlation_logs WHERE created_at < ?")
            .bind(cutoff as i64)
            .execute(self.pool())
            .await?;

        let deleted = result.rows_affected();
        if deleted > 0 {
            crate::metrics::record_cleanup(deleted);
        }

        tracing::info!(cutoff = cutoff, deleted = deleted, "retention cleanup done");
        Ok(deleted)
    }
}

/// Spawn the daily retention task.
pub fn spawn_retention_task(
    store: LogStore,
    config: RetentionConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        retention_loop(store, config).await;
    })
}

async fn retention_loop(store: LogStore, config: RetentionConfig) {
    let mut interval = time::interval(config.check_interval);
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
    let mut last_cleanup_day: Option<u32> = None;

    loop {
        interval.tick().await;

        let now = chrono::Utc::now();
        let current_hour = now.hour();
        let current_day = now.ordinal();

        if current_hour == config.cleanup_hour && Some(current_day) != last_cleanup_day {
            match run_cleanup_now(&store, config.ttl_days).await {
                Ok(deleted) => {
                    tracing::info!(deleted = deleted, "scheduled cleanup completed");
                    last_cleanup_day = Some(current_day);
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduled cleanup failed");
                }
            }
        }
    }
}

/// Run the retention cleanup immediately with the given TTL.
pub async fn run_cleanup_now(store: &LogStore, ttl_days: u32) -> Result<u64> {
    let cutoff = chrono::Utc::now() - chrono::Duration::days(i64::from(ttl_days));
    let deleted = store.cleanup(cutoff.timestamp_millis() as u64).await?;
    Ok(deleted)
}
