//! Correlation propagation across process boundaries
//!
//! Thin helpers for the surrounding transport layer: seed a tracker from an
//! inbound request header, and collect the headers to attach to outbound
//! calls. The transport itself (routing, middleware wiring) lives outside
//! this crate.

use crate::correlation::context::CorrelationTracker;
use crate::correlation::id;
use crate::correlation::metadata::TracingSource;
use tracing::debug;

/// Header carrying the correlation identifier.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Header carrying the distributed trace identifier.
pub const TRACE_ID_HEADER: &str = "X-Trace-ID";

/// Header carrying the distributed span identifier.
pub const SPAN_ID_HEADER: &str = "X-Span-ID";

/// Seed the tracker from an inbound `X-Correlation-ID` header value.
///
/// If the header is present and non-empty its value becomes the current id;
/// otherwise a fresh root identifier is generated. Returns the identifier in
/// effect, which is also the value to echo back on the response when echoing
/// is configured.
pub fn seed_inbound(tracker: &CorrelationTracker, header_value: Option<&str>) -> String {
    match header_value {
        Some(value) if !value.is_empty() => {
            debug!(correlation_id = %value, "seeded correlation id from inbound header");
            tracker.set_current(value);
            value.to_string()
        }
        _ => {
            let generated = id::generate();
            debug!(correlation_id = %generated, "no inbound correlation id, generated root id");
            tracker.set_current(generated.clone());
            generated
        }
    }
}

/// Collect the headers to attach to an outbound call.
///
/// Always includes `X-Correlation-ID` when the flow has a current id;
/// includes trace/span headers only when a tracing span is active.
pub fn outbound_headers(
    tracker: &CorrelationTracker,
    tracing_source: &dyn TracingSource,
) -> Vec<(&'static str, String)> {
    let mut headers = Vec::with_capacity(3);

    if let Some(correlation_id) = tracker.current() {
        headers.push((CORRELATION_ID_HEADER, correlation_id));

        if let Some(trace_id) = tracing_source.trace_id() {
            headers.push((TRACE_ID_HEADER, trace_id));
        }
        if let Some(span_id) = tracing_source.span_id() {
            headers.push((SPAN_ID_HEADER, span_id));
        }
    }

    headers
}
