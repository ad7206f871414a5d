//! Point-in-time correlation metadata snapshots
//!
//! A snapshot bundles the flow's identifier pair with whatever distributed
//! tracing and actor context the surrounding process provides. Both are
//! external collaborators reached through traits; when absent, the
//! corresponding fields are simply empty.

use crate::correlation::context::CorrelationTracker;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Immutable snapshot of correlation state, taken once per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMetadata {
    pub correlation_id: String,
    pub parent_correlation_id: Option<String>,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    /// Snapshot time, Unix milliseconds
    pub timestamp: u64,
    pub user_id: Option<String>,
    pub tenant_id: Option<String>,
}

/// Distributed-tracing facility active in the surrounding process.
///
/// The core carries trace/span identifiers but never generates them.
pub trait TracingSource: Send + Sync {
    fn trace_id(&self) -> Option<String>;
    fn span_id(&self) -> Option<String>;
}

/// Actor/security context of the surrounding process.
pub trait ActorSource: Send + Sync {
    fn user_id(&self) -> Option<String>;
    fn tenant_id(&self) -> Option<String>;
}

/// No-op collaborator for processes without tracing or authentication.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContext;

impl TracingSource for NoContext {
    fn trace_id(&self) -> Option<String> {
        None
    }

    fn span_id(&self) -> Option<String> {
        None
    }
}

impl ActorSource for NoContext {
    fn user_id(&self) -> Option<String> {
        None
    }

    fn tenant_id(&self) -> Option<String> {
        None
    }
}

/// Capture a snapshot of the tracker plus external trace/actor context.
///
/// Pure and side-effect free; never fails. A tracker in the root state yields
/// an empty `correlation_id`.
pub fn snapshot(
    tracker: &CorrelationTracker,
    tracing_source: &dyn TracingSource,
    actor_source: &dyn ActorSource,
) -> CorrelationMetadata {
    CorrelationMetadata {
        correlation_id: tracker.current().unwrap_or_default(),
        parent_correlation_id: tracker.parent(),
        trace_id: tracing_source.trace_id(),
        span_id: tracing_source.span_id(),
        timestamp: current_millis(),
        user_id: actor_source.user_id(),
        tenant_id: actor_source.tenant_id(),
    }
}

/// Current time as Unix milliseconds, used for all timestamps in the core.
pub fn current_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_millis() as u64
}
