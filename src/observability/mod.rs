//! Observability features: metrics and tracing.
//!
//! - **Metrics**: Counters and histograms via `metrics-rs`
//! - **Tracing**: Structured logging and spans via `tracing`
//!
//! ## Metrics
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `audioconvert_buffers_converted` | Counter | Buffers run through the kernel |
//! | `audioconvert_gap_buffers` | Counter | Gap buffers filled with silence |
//! | `audioconvert_bytes_in` | Counter | Input bytes converted |
//! | `audioconvert_bytes_out` | Counter | Output bytes written |
//! | `audioconvert_processing_time_ns` | Histogram | Conversion time per buffer |
//! | `audioconvert_format_changes` | Counter | Conversion contexts configured |
//! | `audioconvert_errors` | Counter | Failures, labelled by kind |
//!
//! ## Tracing
//!
//! Spans are emitted for negotiation, format changes and, when enabled in
//! [`TracingConfig`], for every buffer.
//!
//! ## Example
//!
//! ```rust
//! use audioconvert::observability::init_metrics;
//!
//! // Initialize metrics (call once at startup)
//! init_metrics();
//!
//! // Metrics are recorded while converting.
//! // Use a metrics exporter (prometheus, statsd, etc.) to collect them
//! ```

mod metrics;
mod tracing_support;

pub use metrics::{ElementMetrics, TimerGuard, init_metrics, record_error, record_format_change};
pub use tracing_support::{
    TracingConfig, instrument_element, span_buffer, span_element, trace_buffer_converted,
    trace_error, trace_format_change,
};
