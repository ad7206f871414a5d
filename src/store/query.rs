//! Query API for the correlation log store
//!
//! Finders for the common lookup shapes plus a general filtered, paginated
//! access path. Every finder re-executes its query on each call; results are
//! finite snapshots ordered by creation time.

use crate::error::StoreResult;
use crate::store::db::{row_to_entry, LogStore, COLUMNS};
use crate::store::entry::{LogEntry, Severity};
use sqlx::{QueryBuilder, Sqlite};

/// Optional creation-time bounds, Unix milliseconds, both inclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub since: Option<u64>,
    pub until: Option<u64>,
}

impl DateRange {
    pub fn between(since: u64, until: u64) -> Self {
        Self {
            since: Some(since),
            until: Some(until),
        }
    }
}

/// Pagination window.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub skip: u32,
    pub take: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, take: 50 }
    }
}

/// Sortable fields for the general query path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    DurationMs,
}

impl SortField {
    fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::DurationMs => "duration_ms",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Sort order; defaults to newest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Filter set for the general paginated query path.
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    pub correlation_id: Option<String>,
    pub operation_type: Option<String>,
    pub severity: Option<Severity>,
    pub is_success: Option<bool>,
    pub range: DateRange,
    pub page: Page,
    pub sort: Sort,
}

pub(crate) fn push_range(builder: &mut QueryBuilder<'_, Sqlite>, range: &DateRange) {
    if let Some(since) = range.since {
        builder.push(" AND created_at >= ").push_bind(since as i64);
    }
    if let Some(until) = range.until {
        builder.push(" AND created_at <= ").push_bind(until as i64);
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &LogQuery) {
    if let Some(correlation_id) = &query.correlation_id {
        builder
            .push(" AND correlation_id = ")
            .push_bind(correlation_id.clone());
    }
    if let Some(operation_type) = &query.operation_type {
        builder
            .push(" AND operation_type = ")
            .push_bind(operation_type.clone());
    }
    if let Some(severity) = query.severity {
        builder.push(" AND severity = ").push_bind(severity.as_str());
    }
    if let Some(is_success) = query.is_success {
        builder.push(" AND is_success = ").push_bind(is_success);
    }
    push_range(builder, &query.range);
}

impl LogStore {
    /// All entries sharing a correlation id, oldest first.
    pub async fn find_by_correlation_id(&self, correlation_id: &str) -> StoreResult<Vec<LogEntry>> {
        self.find_where(
            |b| {
                b.push(" AND correlation_id = ").push_bind(correlation_id.to_string());
            },
            "created_at ASC",
        )
        .await
    }

    /// Children of a correlation id, oldest first.
    pub async fn find_by_parent_correlation_id(
        &self,
        parent_correlation_id: &str,
    ) -> StoreResult<Vec<LogEntry>> {
        self.find_where(
            |b| {
                b.push(" AND parent_correlation_id = ")
                    .push_bind(parent_correlation_id.to_string());
            },
            "created_at ASC",
        )
        .await
    }

    /// Entries carrying a distributed trace id, oldest first.
    pub async fn find_by_trace_id(&self, trace_id: &str) -> StoreResult<Vec<LogEntry>> {
        self.find_where(
            |b| {
                b.push(" AND trace_id = ").push_bind(trace_id.to_string());
            },
            "created_at ASC",
        )
        .await
    }

    /// Entries for one user, newest first.
    pub async fn find_by_user_id(
        &self,
        user_id: &str,
        range: DateRange,
    ) -> StoreResult<Vec<LogEntry>> {
        self.find_where(
            |b| {
                b.push(" AND user_id = ").push_bind(user_id.to_string());
                push_range(b, &range);
            },
            "created_at DESC",
        )
        .await
    }

    /// Entries of one operation type, newest first.
    pub async fn find_by_operation_type(
        &self,
        operation_type: &str,
        range: DateRange,
    ) -> StoreResult<Vec<LogEntry>> {
        self.find_where(
            |b| {
                b.push(" AND operation_type = ")
                    .push_bind(operation_type.to_string());
                push_range(b, &range);
            },
            "created_at DESC",
        )
        .await
    }

    /// Entries at one severity, newest first.
    pub async fn find_by_severity(
        &self,
        severity: Severity,
        range: DateRange,
    ) -> StoreResult<Vec<LogEntry>> {
        self.find_where(
            |b| {
                b.push(" AND severity = ").push_bind(severity.as_str());
                push_range(b, &range);
            },
            "created_at DESC",
        )
        .await
    }

    /// Entries for one URL, newest first.
    pub async fn find_by_url(&self, url: &str, range: DateRange) -> StoreResult<Vec<LogEntry>> {
        self.find_where(
            |b| {
                b.push(" AND url = ").push_bind(url.to_string());
                push_range(b, &range);
            },
            "created_at DESC",
        )
        .await
    }

    /// Entries within a creation-time window, newest first.
    pub async fn find_by_date_range(&self, range: DateRange) -> StoreResult<Vec<LogEntry>> {
        self.find_where(|b| push_range(b, &range), "created_at DESC").await
    }

    /// Failed entries, newest first.
    pub async fn find_errors(&self, range: DateRange) -> StoreResult<Vec<LogEntry>> {
        self.find_where(
            |b| {
                b.push(" AND is_success = 0");
                push_range(b, &range);
            },
            "created_at DESC",
        )
        .await
    }

    /// Entries at or above the duration threshold, slowest first.
    pub async fn find_slow_operations(
        &self,
        min_duration_ms: i64,
        range: DateRange,
    ) -> StoreResult<Vec<LogEntry>> {
        self.find_where(
            |b| {
                b.push(" AND duration_ms >= ").push_bind(min_duration_ms);
                push_range(b, &range);
            },
            "duration_ms DESC",
        )
        .await
    }

    async fn find_where<F>(&self, apply: F, order_by: &str) -> StoreResult<Vec<LogEntry>>
    where
        F: FnOnce(&mut QueryBuilder<'_, Sqlite>),
    {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {} FROM correlation_logs WHERE 1=1",
            COLUMNS
        ));
        apply(&mut builder);
        builder.push(format!(" ORDER BY {}", order_by));

        let rows = builder.build().fetch_all(self.pool()).await?;
        Ok(rows.iter().map(row_to_entry).collect())
    }

    /// General filtered, paginated access path.
    ///
    /// Returns the page of items plus the total count matching the filter
    /// predicate before pagination.
    pub async fn query(&self, query: &LogQuery) -> StoreResult<(Vec<LogEntry>, u64)> {
        let mut count_builder =
            QueryBuilder::new("SELECT COUNT(*) FROM correlation_logs WHERE 1=1");
        push_filters(&mut count_builder, query);
        let total_count: i64 = count_builder
            .build_query_scalar()
            .fetch_one(self.pool())
            .await?;

        let mut builder = QueryBuilder::new(format!(
            "SELECT {} FROM correlation_logs WHERE 1=1",
            COLUMNS
        ));
        push_filters(&mut builder, query);
        builder.push(format!(
            " ORDER BY {} {}",
            query.sort.field.column(),
            query.sort.direction.keyword()
        ));
        builder
            .push(" LIMIT ")
            .push_bind(query.page.take as i64)
            .push(" OFFSET ")
            .push_bind(query.page.skip as i64);

        let rows = builder.build().fetch_all(self.pool()).await?;
        let items = rows.iter().map(row_to_entry).collect();

        Ok((items, total_count as u64))
    }

    /// Distinct correlation ids in the window, sorted ascending.
    pub async fn distinct_correlation_ids(&self, range: DateRange) -> StoreResult<Vec<String>> {
        let mut builder =
            QueryBuilder::new("SELECT DISTINCT correlation_id FROM correlation_logs WHERE 1=1");
        push_range(&mut builder, &range);
        builder.push(" ORDER BY correlation_id ASC");

        let ids: Vec<String> = builder.build_query_scalar().fetch_all(self.pool()).await?;
        Ok(ids)
    }
}
