//! correlog - correlation tracking core
//!
//! Propagates a nested chain of correlation identifiers across units of work
//! and keeps a durable, queryable log of every tracked operation:
//!
//! - [`correlation`]: per-flow identifier tracking, nested scopes,
//!   metadata snapshots, and header propagation helpers
//! - [`store`]: SQLite-backed log store with finders, a paginated query
//!   path, on-demand statistics, and retention cleanup
//! - [`recorder`]: the side-channel write path that never fails the
//!   operation it is observing
//!
//! ```ignore
//! let tracker = CorrelationTracker::new();
//! let scope = tracker.open_scope();
//! let meta = correlation::snapshot(&tracker, &NoContext, &NoContext);
//! recorder.record(NewLogEntry::from_metadata(&meta, "API_CALL", "GetOrder")).await?;
//! drop(scope); // restores the enclosing scope
//! ```

pub mod config;
pub mod correlation;
pub mod error;
pub mod metrics;
pub mod recorder;
pub mod store;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging. Call once at process start.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
