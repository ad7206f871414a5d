//! Flow-local correlation context
//!
//! A [`CorrelationTracker`] holds the `(current, parent)` identifier pair for
//! one logical execution flow (one request-handling task, one worker task).
//! Create one tracker per flow and keep it inside that flow: handles are
//! clones sharing the same state, so handing a clone to a sibling task would
//! break the isolation the tracker exists to provide. To propagate across a
//! spawn boundary, copy [`CorrelationTracker::current`] into the child flow's
//! own tracker (or into outbound headers, see [`crate::correlation::propagation`]).

use crate::correlation::id;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct TrackerState {
    current: Option<String>,
    parent: Option<String>,
}

/// Per-flow correlation identifier tracker.
///
/// All operations are synchronous in-memory reads/writes; none block beyond a
/// short mutex hold and none have a failure mode exposed to callers.
#[derive(Debug, Clone, Default)]
pub struct CorrelationTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl CorrelationTracker {
    /// Create a tracker in the root state (no current identifier).
    pub fn new() -> Self {
        Self::default()
    }

    /// The identifier of the active scope, if any.
    pub fn current(&self) -> Option<String> {
        self.state.lock().unwrap().current.clone()
    }

    /// The identifier of the enclosing scope, if any.
    pub fn parent(&self) -> Option<String> {
        self.state.lock().unwrap().parent.clone()
    }

    /// Overwrite the current identifier without touching the parent chain.
    ///
    /// An empty id is rejected silently (logged at warn): correlation
    /// tracking must never interrupt the operation it is observing.
    pub fn set_current(&self, correlation_id: impl Into<String>) {
        let correlation_id = correlation_id.into();
        if correlation_id.is_empty() {
            warn!("attempted to set empty correlation id");
            return;
        }

        debug!(correlation_id = %correlation_id, "correlation id set");
        self.state.lock().unwrap().current = Some(correlation_id);
    }

    /// Open a nested scope with a freshly generated identifier.
    ///
    /// The existing current id becomes the new scope's parent. The returned
    /// guard restores the pre-scope `(current, parent)` pair exactly when
    /// dropped. Scopes form a strict stack: guards must be dropped in reverse
    /// order of creation within the same flow, or parent/child linkage
    /// becomes inconsistent. Nesting depth is unbounded.
    pub fn open_scope(&self) -> CorrelationScope {
        let new_id = id::generate();

        let mut state = self.state.lock().unwrap();
        let saved_current = state.current.take();
        let saved_parent = state.parent.take();

        state.parent = saved_current.clone();
        state.current = Some(new_id.clone());
        drop(state);

        debug!(
            correlation_id = %new_id,
            parent_correlation_id = saved_current.as_deref().unwrap_or(""),
            "opened correlation scope"
        );

        CorrelationScope {
            tracker: self.clone(),
            correlation_id: new_id,
            saved_current,
            saved_parent,
        }
    }
}

/// Guard for a nested correlation scope.
///
/// Restores the tracker's pre-scope state on drop, on every exit path.
#[must_use = "dropping the scope immediately closes it"]
pub struct CorrelationScope {
    tracker: CorrelationTracker,
    correlation_id: String,
    saved_current: Option<String>,
    saved_parent: Option<String>,
}

impl CorrelationScope {
    /// The identifier generated for this scope.
    pub fn id(&self) -> &str {
        &self.correlation_id
    }
}

impl Drop for CorrelationScope {
    fn drop(&mut self) {
        let mut state = self.tracker.state.lock().unwrap();
        state.current = self.saved_current.take();
        state.parent = self.saved_parent.take();
        drop(state);

        debug!(correlation_id = %self.correlation_id, "closed correlation scope");
    }
}
