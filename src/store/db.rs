//! SQLite persistence for correlation log entries
//!
//! WAL mode with a small connection pool: SQLite allows a single writer, so
//! the pool stays small while reads proceed concurrently with writes.

use crate::correlation::current_millis;
use crate::error::{StoreError, StoreResult};
use crate::store::entry::{LogEntry, LogEntryUpdate, NewLogEntry, Severity};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// Column list shared by every SELECT over `correlation_logs`.
pub(crate) const COLUMNS: &str = "id, correlation_id, parent_correlation_id, trace_id, span_id, \
     operation_type, operation_name, http_method, url, http_status_code, \
     request_data, response_data, error_message, stack_trace, duration_ms, \
     metadata, tenant_id, user_id, user_name, client_ip_address, user_agent, \
     application_name, environment, severity, is_success, created_at";

/// Handle to the correlation log store.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct LogStore {
    pool: SqlitePool,
}

impl LogStore {
    /// Open (creating if missing) the store at the given SQLite URL and run
    /// migrations.
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(StoreError::Storage)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("synchronous", "NORMAL");

        let store = Self::connect(options, 5).await?;
        tracing::info!(database_url = %database_url, "correlation log store ready");
        Ok(store)
    }

    /// Open an in-memory store (tests). A single connection: every pooled
    /// connection to `:memory:` would otherwise see its own empty database.
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(StoreError::Storage)?;
        Self::connect(options, 1).await
    }

    async fn connect(options: SqliteConnectOptions, max_connections: u32) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Persist a new entry, assigning the durable id and, when unset, the
    /// creation timestamp. Returns the stored record.
    pub async fn insert(&self, new_entry: NewLogEntry) -> StoreResult<LogEntry> {
        new_entry.validate()?;

        let entry = LogEntry {
            id: Uuid::new_v4().to_string(),
            correlation_id: new_entry.correlation_id,
            parent_correlation_id: new_entry.parent_correlation_id,
            trace_id: new_entry.trace_id,
            span_id: new_entry.span_id,
            operation_type: new_entry.operation_type,
            operation_name: new_entry.operation_name,
            http_method: new_entry.http_method,
            url: new_entry.url,
            http_status_code: new_entry.http_status_code,
            request_data: new_entry.request_data,
            response_data: new_entry.response_data,
            error_message: new_entry.error_message,
            stack_trace: new_entry.stack_trace,
            duration_ms: new_entry.duration_ms,
            metadata: new_entry.metadata,
            tenant_id: new_entry.tenant_id,
            user_id: new_entry.user_id,
            user_name: new_entry.user_name,
            client_ip_address: new_entry.client_ip_address,
            user_agent: new_entry.user_agent,
            application_name: new_entry.application_name,
            environment: new_entry.environment,
            severity: new_entry.severity,
            is_success: new_entry.is_success,
            created_at: if new_entry.created_at == 0 {
                current_millis()
            } else {
                new_entry.created_at
            },
        };

        sqlx::query(
            "INSERT INTO correlation_logs (id, correlation_id, parent_correlation_id, trace_id, span_id, \
             operation_type, operation_name, http_method, url, http_status_code, \
             request_data, response_data, error_message, stack_trace, duration_ms, \
             metadata, tenant_id, user_id, user_name, client_ip_address, user_agent, \
             application_name, environment, severity, is_success, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.correlation_id)
        .bind(&entry.parent_correlation_id)
        .bind(&entry.trace_id)
        .bind(&entry.span_id)
        .bind(&entry.operation_type)
        .bind(&entry.operation_name)
        .bind(&entry.http_method)
        .bind(&entry.url)
        .bind(entry.http_status_code)
        .bind(&entry.request_data)
        .bind(&entry.response_data)
        .bind(&entry.error_message)
        .bind(&entry.stack_trace)
        .bind(entry.duration_ms)
        .bind(&entry.metadata)
        .bind(&entry.tenant_id)
        .bind(&entry.user_id)
        .bind(&entry.user_name)
        .bind(&entry.client_ip_address)
        .bind(&entry.user_agent)
        .bind(&entry.application_name)
        .bind(&entry.environment)
        .bind(entry.severity.as_str())
        .bind(entry.is_success)
        .bind(entry.created_at as i64)
        .execute(&self.pool)
        .await?;

        crate::metrics::record_insert(&entry.operation_type, entry.severity.as_str());

        Ok(entry)
    }

    /// Fetch one entry by durable id.
    pub async fn get(&self, id: &str) -> StoreResult<LogEntry> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM correlation_logs WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_entry(&r))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Correct outcome fields of an existing entry. Immutable fields
    /// (correlation id, operation type/name, creation time) cannot be
    /// changed; see [`LogEntryUpdate::from_json`] for payload validation.
    pub async fn update(&self, id: &str, update: LogEntryUpdate) -> StoreResult<LogEntry> {
        update.validate()?;

        let mut entry = self.get(id).await?;
        update.apply(&mut entry);

        sqlx::query(
            "UPDATE correlation_logs SET response_data = ?, error_message = ?, stack_trace = ?, \
             duration_ms = ?, metadata = ?, http_status_code = ?, severity = ?, is_success = ? \
             WHERE id = ?",
        )
        .bind(&entry.response_data)
        .bind(&entry.error_message)
        .bind(&entry.stack_trace)
        .bind(entry.duration_ms)
        .bind(&entry.metadata)
        .bind(entry.http_status_code)
        .bind(entry.severity.as_str())
        .bind(entry.is_success)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Delete one entry. Idempotent: deleting an absent id succeeds.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM correlation_logs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            crate::metrics::record_delete(result.rows_affected());
        }

        Ok(())
    }
}

/// Map a result row to a [`LogEntry`].
pub(crate) fn row_to_entry(row: &SqliteRow) -> LogEntry {
    let severity: String = row.get("severity");

    LogEntry {
        id: row.get("id"),
        correlation_id: row.get("correlation_id"),
        parent_correlation_id: row.get("parent_correlation_id"),
        trace_id: row.get("trace_id"),
        span_id: row.get("span_id"),
        operation_type: row.get("operation_type"),
        operation_name: row.get("operation_name"),
        http_method: row.get("http_method"),
        url: row.get("url"),
        http_status_code: row.get("http_status_code"),
        request_data: row.get("request_data"),
        response_data: row.get("response_data"),
        error_message: row.get("error_message"),
        stack_trace: row.get("stack_trace"),
        duration_ms: row.get("duration_ms"),
        metadata: row.get("metadata"),
        tenant_id: row.get("tenant_id"),
        user_id: row.get("user_id"),
        user_name: row.get("user_name"),
        client_ip_address: row.get("client_ip_address"),
        user_agent: row.get("user_agent"),
        application_name: row.get("application_name"),
        environment: row.get("environment"),
        severity: Severity::parse(&severity).unwrap_or_default(),
        is_success: row.get("is_success"),
        created_at: row.get::<i64, _>("created_at") as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn create_test_store() -> LogStore {
        LogStore::in_memory().await.unwrap()
    }

    fn sample_entry(correlation_id: &str) -> NewLogEntry {
        let mut entry = NewLogEntry::new(correlation_id, "API_CALL", "GetOrder");
        entry.duration_ms = 42;
        entry
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_created_at() {
        let store = create_test_store().await;

        let stored = store.insert(sample_entry("corr-1")).await.unwrap();
        assert!(!stored.id.is_empty());
        assert!(stored.created_at > 0);
    }

    #[tokio::test]
    async fn test_insert_preserves_explicit_created_at() {
        let store = create_test_store().await;

        let mut entry = sample_entry("corr-1");
        entry.created_at = 12345;
        let stored = store.insert(entry).await.unwrap();
        assert_eq!(stored.created_at, 12345);
    }

    #[tokio::test]
    async fn test_insert_rejects_empty_required_fields() {
        let store = create_test_store().await;

        let result = store.insert(NewLogEntry::new("", "API_CALL", "GetOrder")).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_insert_then_get_round_trips_every_field() {
        let store = create_test_store().await;

        let mut entry = NewLogEntry::new("corr-1", "API_CALL", "GetOrder");
        entry.parent_correlation_id = Some("corr-0".to_string());
        entry.trace_id = Some("trace-1".to_string());
        entry.span_id = Some("span-1".to_string());
        entry.http_method = Some("GET".to_string());
        entry.url = Some("/api/orders/1".to_string());
        entry.http_status_code = Some(200);
        entry.request_data = Some("{}".to_string());
        entry.response_data = Some(r#"{"id":1}"#.to_string());
        entry.duration_ms = 42;
        entry.metadata = Some(r#"{"region":"eu"}"#.to_string());
        entry.tenant_id = Some("tenant-1".to_string());
        entry.user_id = Some("user-1".to_string());
        entry.user_name = Some("alice".to_string());
        entry.client_ip_address = Some("10.0.0.1".to_string());
        entry.user_agent = Some("curl/8".to_string());
        entry.application_name = Some("orders".to_string());
        entry.environment = Some("Production".to_string());
        entry.severity = Severity::Info;
        entry.is_success = true;

        let stored = store.insert(entry.clone()).await.unwrap();
        let fetched = store.get(&stored.id).await.unwrap();

        assert_eq!(fetched.correlation_id, entry.correlation_id);
        assert_eq!(fetched.parent_correlation_id, entry.parent_correlation_id);
        assert_eq!(fetched.trace_id, entry.trace_id);
        assert_eq!(fetched.span_id, entry.span_id);
        assert_eq!(fetched.operation_type, entry.operation_type);
        assert_eq!(fetched.operation_name, entry.operation_name);
        assert_eq!(fetched.http_method, entry.http_method);
        assert_eq!(fetched.url, entry.url);
        assert_eq!(fetched.http_status_code, entry.http_status_code);
        assert_eq!(fetched.request_data, entry.request_data);
        assert_eq!(fetched.response_data, entry.response_data);
        assert_eq!(fetched.duration_ms, entry.duration_ms);
        assert_eq!(fetched.metadata, entry.metadata);
        assert_eq!(fetched.tenant_id, entry.tenant_id);
        assert_eq!(fetched.user_id, entry.user_id);
        assert_eq!(fetched.user_name, entry.user_name);
        assert_eq!(fetched.client_ip_address, entry.client_ip_address);
        assert_eq!(fetched.user_agent, entry.user_agent);
        assert_eq!(fetched.application_name, entry.application_name);
        assert_eq!(fetched.environment, entry.environment);
        assert_eq!(fetched.severity, entry.severity);
        assert_eq!(fetched.is_success, entry.is_success);
        assert_eq!(fetched.created_at, stored.created_at);
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let store = create_test_store().await;
        let result = store.get("missing").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_corrects_outcome_fields() {
        let store = create_test_store().await;
        let stored = store.insert(sample_entry("corr-1")).await.unwrap();

        let update = LogEntryUpdate::from_json(json!({
            "is_success": false,
            "severity": "Error",
            "error_message": "upstream timeout",
            "duration_ms": 950,
            "http_status_code": 504
        }))
        .unwrap();

        let updated = store.update(&stored.id, update).await.unwrap();
        assert!(!updated.is_success);
        assert_eq!(updated.severity, Severity::Error);
        assert_eq!(updated.error_message, Some("upstream timeout".to_string()));
        assert_eq!(updated.duration_ms, 950);
        assert_eq!(updated.http_status_code, Some(504));
        // immutable fields untouched
        assert_eq!(updated.correlation_id, stored.correlation_id);
        assert_eq!(updated.created_at, stored.created_at);

        let fetched = store.get(&stored.id).await.unwrap();
        assert!(!fetched.is_success);
        assert_eq!(fetched.severity, Severity::Error);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let store = create_test_store().await;
        let result = store.update("missing", LogEntryUpdate::default()).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = create_test_store().await;
        let stored = store.insert(sample_entry("corr-1")).await.unwrap();

        store.delete(&stored.id).await.unwrap();
        assert!(matches!(
            store.get(&stored.id).await,
            Err(StoreError::NotFound(_))
        ));

        // second delete of the same id still succeeds
        store.delete(&stored.id).await.unwrap();
    }
}
