//! Correlation context tracking
//!
//! Nested correlation identifiers scoped to a single execution flow, plus
//! snapshotting and cross-process propagation helpers.

pub mod context;
pub mod id;
pub mod metadata;
pub mod propagation;

pub use context::{CorrelationScope, CorrelationTracker};
pub use metadata::{
    current_millis, snapshot, ActorSource, CorrelationMetadata, NoContext, TracingSource,
};
pub use propagation::{
    outbound_headers, seed_inbound, CORRELATION_ID_HEADER, SPAN_ID_HEADER, TRACE_ID_HEADER,
};
