//! Log entry record types
//!
//! A [`LogEntry`] is the durable record of one tracked operation. Many
//! entries may share one correlation id; the durable `id` is distinct and
//! assigned by the store.

use crate::correlation::metadata::CorrelationMetadata;
use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};

/// Conventional operation type values. The field is an open string; these
/// are the values producers use by convention.
pub mod operation_type {
    pub const API_CALL: &str = "API_CALL";
    pub const DATABASE_OPERATION: &str = "DATABASE_OPERATION";
    pub const EXTERNAL_SERVICE_CALL: &str = "EXTERNAL_SERVICE_CALL";
    pub const BUSINESS_OPERATION: &str = "BUSINESS_OPERATION";
}

/// Severity of a tracked operation.
///
/// Producers conventionally record failed operations at Warning or above;
/// the store does not enforce that mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Critical => "Critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Info" => Some(Severity::Info),
            "Warning" => Some(Severity::Warning),
            "Error" => Some(Severity::Error),
            "Critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable record of one tracked operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Store-assigned durable id (UUID v4)
    pub id: String,
    pub correlation_id: String,
    pub parent_correlation_id: Option<String>,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    pub operation_type: String,
    pub operation_name: String,
    pub http_method: Option<String>,
    pub url: Option<String>,
    pub http_status_code: Option<i32>,
    pub request_data: Option<String>,
    pub response_data: Option<String>,
    pub error_message: Option<String>,
    pub stack_trace: Option<String>,
    pub duration_ms: i64,
    /// Free-form JSON
    pub metadata: Option<String>,
    pub tenant_id: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub client_ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub application_name: Option<String>,
    pub environment: Option<String>,
    pub severity: Severity,
    pub is_success: bool,
    /// Unix milliseconds, store-assigned when zero on insert
    pub created_at: u64,
}

/// Input record for [`crate::store::LogStore::insert`]. The store assigns the
/// durable id, and the creation time when `created_at` is zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLogEntry {
    pub correlation_id: String,
    pub parent_correlation_id: Option<String>,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    pub operation_type: String,
    pub operation_name: String,
    pub http_method: Option<String>,
    pub url: Option<String>,
    pub http_status_code: Option<i32>,
    pub request_data: Option<String>,
    pub response_data: Option<String>,
    pub error_message: Option<String>,
    pub stack_trace: Option<String>,
    pub duration_ms: i64,
    pub metadata: Option<String>,
    pub tenant_id: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub client_ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub application_name: Option<String>,
    pub environment: Option<String>,
    pub severity: Severity,
    pub is_success: bool,
    pub created_at: u64,
}

impl NewLogEntry {
    pub fn new(
        correlation_id: impl Into<String>,
        operation_type: impl Into<String>,
        operation_name: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            operation_type: operation_type.into(),
            operation_name: operation_name.into(),
            is_success: true,
            ..Default::default()
        }
    }

    /// Build an entry pre-filled from a correlation metadata snapshot.
    pub fn from_metadata(
        meta: &CorrelationMetadata,
        operation_type: impl Into<String>,
        operation_name: impl Into<String>,
    ) -> Self {
        let mut entry = Self::new(meta.correlation_id.clone(), operation_type, operation_name);
        entry.parent_correlation_id = meta.parent_correlation_id.clone();
        entry.trace_id = meta.trace_id.clone();
        entry.span_id = meta.span_id.clone();
        entry.user_id = meta.user_id.clone();
        entry.tenant_id = meta.tenant_id.clone();
        entry
    }

    /// Check the invariants the store enforces on insert.
    pub fn validate(&self) -> StoreResult<()> {
        if self.correlation_id.is_empty() {
            return Err(StoreError::Validation(
                "correlation_id must not be empty".to_string(),
            ));
        }
        if self.operation_type.is_empty() {
            return Err(StoreError::Validation(
                "operation_type must not be empty".to_string(),
            ));
        }
        if self.operation_name.is_empty() {
            return Err(StoreError::Validation(
                "operation_name must not be empty".to_string(),
            ));
        }
        if self.duration_ms < 0 {
            return Err(StoreError::Validation(
                "duration_ms must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update payload. Only correction of outcome fields is allowed;
/// correlation id, operation type/name and creation time are immutable
/// after insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogEntryUpdate {
    pub response_data: Option<String>,
    pub error_message: Option<String>,
    pub stack_trace: Option<String>,
    pub duration_ms: Option<i64>,
    pub metadata: Option<String>,
    pub http_status_code: Option<i32>,
    pub severity: Option<Severity>,
    pub is_success: Option<bool>,
}

impl LogEntryUpdate {
    /// Parse an update payload from JSON, rejecting any field that is not
    /// part of the mutable set (immutable fields included).
    pub fn from_json(value: serde_json::Value) -> StoreResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| StoreError::Validation(format!("invalid update payload: {}", e)))
    }

    pub fn validate(&self) -> StoreResult<()> {
        if let Some(duration_ms) = self.duration_ms {
            if duration_ms < 0 {
                return Err(StoreError::Validation(
                    "duration_ms must not be negative".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Apply the update on top of an existing entry.
    pub fn apply(&self, entry: &mut LogEntry) {
        if let Some(response_data) = &self.response_data {
            entry.response_data = Some(response_data.clone());
        }
        if let Some(error_message) = &self.error_message {
            entry.error_message = Some(error_message.clone());
        }
        if let Some(stack_trace) = &self.stack_trace {
            entry.stack_trace = Some(stack_trace.clone());
        }
        if let Some(duration_ms) = self.duration_ms {
            entry.duration_ms = duration_ms;
        }
        if let Some(metadata) = &self.metadata {
            entry.metadata = Some(metadata.clone());
        }
        if let Some(http_status_code) = self.http_status_code {
            entry.http_status_code = Some(http_status_code);
        }
        if let Some(severity) = self.severity {
            entry.severity = severity;
        }
        if let Some(is_success) = self.is_success {
            entry.is_success = is_success;
        }
    }
}
