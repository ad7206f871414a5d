//! Aggregate statistics over the correlation log
//!
//! Computed on demand, never persisted. Duration statistics ignore entries
//! recorded with zero duration ("duration unknown" by producer convention);
//! counts include every entry in the filtered range.

use crate::error::StoreResult;
use crate::store::db::LogStore;
use crate::store::query::{push_range, DateRange};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row};
use std::collections::HashMap;

/// Snapshot of aggregate statistics for a filtered subset of the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub total_count: u64,
    pub error_count: u64,
    pub success_count: u64,
    pub avg_duration_ms: f64,
    pub max_duration_ms: i64,
    pub min_duration_ms: i64,
    pub count_by_operation_type: HashMap<String, u64>,
    pub count_by_severity: HashMap<String, u64>,
    pub count_by_http_status: HashMap<i32, u64>,
}

impl LogStore {
    /// Compute statistics over all entries whose creation time falls in the
    /// range. `total_count == error_count + success_count` always holds.
    pub async fn statistics(&self, range: DateRange) -> StoreResult<StatisticsSnapshot> {
        let mut builder = QueryBuilder::new(
            "SELECT COUNT(*) AS total, \
             COALESCE(SUM(CASE WHEN is_success = 0 THEN 1 ELSE 0 END), 0) AS errors \
             FROM correlation_logs WHERE 1=1",
        );
        push_range(&mut builder, &range);
        let row = builder.build().fetch_one(self.pool()).await?;
        let total_count = row.get::<i64, _>("total") as u64;
        let error_count = row.get::<i64, _>("errors") as u64;
        let success_count = total_count - error_count;

        let mut builder = QueryBuilder::new(
            "SELECT AVG(duration_ms) AS avg_ms, MAX(duration_ms) AS max_ms, \
             MIN(duration_ms) AS min_ms \
             FROM correlation_logs WHERE duration_ms > 0",
        );
        push_range(&mut builder, &range);
        let row = builder.build().fetch_one(self.pool()).await?;
        let avg_duration_ms: f64 = row.get::<Option<f64>, _>("avg_ms").unwrap_or(0.0);
        let max_duration_ms: i64 = row.get::<Option<i64>, _>("max_ms").unwrap_or(0);
        let min_duration_ms: i64 = row.get::<Option<i64>, _>("min_ms").unwrap_or(0);

        let count_by_operation_type = self
            .group_counts("operation_type", &range, None)
            .await?
            .into_iter()
            .collect();

        let count_by_severity = self
            .group_counts("severity", &range, None)
            .await?
            .into_iter()
            .collect();

        let count_by_http_status: HashMap<i32, u64> = self
            .group_counts(
                "http_status_code",
                &range,
                Some(" AND http_status_code IS NOT NULL"),
            )
            .await?
            .into_iter()
            .filter_map(|(key, count)| key.parse::<i32>().ok().map(|k| (k, count)))
            .collect();

        Ok(StatisticsSnapshot {
            total_count,
            error_count,
            success_count,
            avg_duration_ms,
            max_duration_ms,
            min_duration_ms,
            count_by_operation_type,
            count_by_severity,
            count_by_http_status,
        })
    }

    async fn group_counts(
        &self,
        column: &str,
        range: &DateRange,
        extra_predicate: Option<&str>,
    ) -> StoreResult<Vec<(String, u64)>> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT CAST({} AS TEXT) AS grp, COUNT(*) AS cnt FROM correlation_logs WHERE 1=1",
            column
        ));
        if let Some(predicate) = extra_predicate {
            builder.push(predicate);
        }
        push_range(&mut builder, range);
        builder.push(format!(" GROUP BY {}", column));

        let rows = builder.build().fetch_all(self.pool()).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.get::<String, _>("grp"),
                    row.get::<i64, _>("cnt") as u64,
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::entry::{NewLogEntry, Severity};

    async fn create_test_store() -> LogStore {
        LogStore::in_memory().await.unwrap()
    }

    async fn seed(store: &LogStore) {
        // two successes with known durations
        let mut e = NewLogEntry::new("corr-1", "API_CALL", "GetOrder");
        e.duration_ms = 10;
        e.http_status_code = Some(200);
        e.created_at = 1000;
        store.insert(e).await.unwrap();

        let mut e = NewLogEntry::new("corr-2", "API_CALL", "ListOrders");
        e.duration_ms = 30;
        e.http_status_code = Some(200);
        e.created_at = 2000;
        store.insert(e).await.unwrap();

        // one failure
        let mut e = NewLogEntry::new("corr-3", "DATABASE_OPERATION", "UpdateStock");
        e.duration_ms = 50;
        e.is_success = false;
        e.severity = Severity::Error;
        e.created_at = 3000;
        store.insert(e).await.unwrap();

        // duration unknown, excluded from duration stats only
        let mut e = NewLogEntry::new("corr-4", "BUSINESS_OPERATION", "Reprice");
        e.duration_ms = 0;
        e.http_status_code = Some(500);
        e.created_at = 4000;
        store.insert(e).await.unwrap();
    }

    #[tokio::test]
    async fn test_counts_always_sum() {
        let store = create_test_store().await;
        seed(&store).await;

        let stats = store.statistics(DateRange::default()).await.unwrap();
        assert_eq!(stats.total_count, 4);
        assert_eq!(stats.error_count, 1);
        assert_eq!(stats.success_count, 3);
        assert_eq!(stats.total_count, stats.error_count + stats.success_count);
    }

    #[tokio::test]
    async fn test_duration_stats_exclude_zero() {
        let store = create_test_store().await;
        seed(&store).await;

        let stats = store.statistics(DateRange::default()).await.unwrap();
        assert_eq!(stats.min_duration_ms, 10);
        assert_eq!(stats.max_duration_ms, 50);
        assert!((stats.avg_duration_ms - 30.0).abs() < f64::EPSILON);
        assert!(stats.min_duration_ms as f64 <= stats.avg_duration_ms);
        assert!(stats.avg_duration_ms <= stats.max_duration_ms as f64);
    }

    #[tokio::test]
    async fn test_group_by_breakdowns() {
        let store = create_test_store().await;
        seed(&store).await;

        let stats = store.statistics(DateRange::default()).await.unwrap();
        assert_eq!(stats.count_by_operation_type.get("API_CALL"), Some(&2));
        assert_eq!(
            stats.count_by_operation_type.get("DATABASE_OPERATION"),
            Some(&1)
        );
        assert_eq!(stats.count_by_severity.get("Info"), Some(&3));
        assert_eq!(stats.count_by_severity.get("Error"), Some(&1));
        // only entries with a status code contribute
        assert_eq!(stats.count_by_http_status.get(&200), Some(&2));
        assert_eq!(stats.count_by_http_status.get(&500), Some(&1));
        assert_eq!(
            stats.count_by_http_status.values().sum::<u64>(),
            3
        );
    }

    #[tokio::test]
    async fn test_statistics_respect_date_range() {
        let store = create_test_store().await;
        seed(&store).await;

        let stats = store
            .statistics(DateRange::between(1500, 3500))
            .await
            .unwrap();
        assert_eq!(stats.total_count, 2);
        assert_eq!(stats.error_count, 1);
        assert_eq!(stats.success_count, 1);
        assert_eq!(stats.min_duration_ms, 30);
        assert_eq!(stats.max_duration_ms, 50);
    }

    #[tokio::test]
    async fn test_statistics_over_empty_store() {
        let store = create_test_store().await;
        let stats = store.statistics(DateRange::default()).await.unwrap();
        assert_eq!(stats.total_count, 0);
        assert_eq!(stats.error_count, 0);
        assert_eq!(stats.success_count, 0);
        assert_eq!(stats.avg_duration_ms, 0.0);
        assert!(stats.count_by_operation_type.is_empty());
    }
}
