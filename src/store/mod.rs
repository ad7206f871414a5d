//! Durable, queryable log of tracked operations
//!
//! SQLite-backed, append-mostly. Entries are written once at operation
//! completion; an update path exists for in-place correction of outcome
//! fields, and retention cleanup is the only bulk deletion.

pub mod cleanup;
pub mod db;
pub mod entry;
pub mod query;
pub mod stats;

pub use cleanup::{run_cleanup_now, spawn_retention_task, RetentionConfig};
pub use db::LogStore;
pub use entry::{operation_type, LogEntry, LogEntryUpdate, NewLogEntry, Severity};
pub use query::{DateRange, LogQuery, Page, Sort, SortDirection, SortField};
pub use stats::StatisticsSnapshot;
