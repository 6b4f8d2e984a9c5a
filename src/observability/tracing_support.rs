//! Tracing integration for structured logging and spans.

use crate::format::AudioFormat;
use tracing::{Level, Span, span};

/// Configuration for tracing behavior.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Whether to create spans for negotiation and format changes.
    pub element_spans: bool,
    /// Whether to create spans for buffer processing.
    pub buffer_spans: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            element_spans: true,
            buffer_spans: false, // Can be expensive
        }
    }
}

impl TracingConfig {
    /// Create a new tracing config with all spans enabled.
    pub fn all() -> Self {
        Self {
            element_spans: true,
            buffer_spans: true,
        }
    }

    /// Disable all spans.
    pub fn none() -> Self {
        Self {
            element_spans: false,
            buffer_spans: false,
        }
    }
}

/// Create a span for element work.
///
/// # Example
///
/// ```rust
/// use audioconvert::observability::span_element;
///
/// let span = span_element("audioconvert0", "set_format");
/// let _guard = span.enter();
/// // Element work here...
/// ```
#[inline]
pub fn span_element(element: &str, operation: &str) -> Span {
    span!(
        Level::DEBUG,
        "element",
        element = %element,
        operation = %operation
    )
}

/// Create a span for one buffer.
#[inline]
pub fn span_buffer(element: &str, sequence: u64) -> Span {
    span!(Level::TRACE, "buffer", element = %element, sequence = sequence)
}

/// Instrument an element operation with tracing.
///
/// This is a convenience wrapper that enters a span and returns a guard.
pub fn instrument_element(element: &str, operation: &str) -> tracing::span::EnteredSpan {
    span_element(element, operation).entered()
}

/// Log a buffer being converted.
#[inline]
pub fn trace_buffer_converted(element: &str, size: usize, sequence: u64, gap: bool) {
    tracing::trace!(
        element = %element,
        size = size,
        sequence = sequence,
        gap = gap,
        "buffer converted"
    );
}

/// Log a newly configured format pair.
#[inline]
pub fn trace_format_change(element: &str, input: &AudioFormat, output: &AudioFormat) {
    tracing::info!(
        element = %element,
        input = %input,
        output = %output,
        "conversion configured"
    );
}

/// Log an error.
#[inline]
pub fn trace_error(element: &str, error: &dyn std::error::Error) {
    tracing::error!(
        element = %element,
        error = %error,
        "conversion error"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Endianness;

    #[test]
    fn test_tracing_config_default() {
        let config = TracingConfig::default();
        assert!(config.element_spans);
        assert!(!config.buffer_spans);
    }

    #[test]
    fn test_tracing_config_all() {
        let config = TracingConfig::all();
        assert!(config.element_spans);
        assert!(config.buffer_spans);
    }

    #[test]
    fn test_tracing_config_none() {
        let config = TracingConfig::none();
        assert!(!config.element_spans);
        assert!(!config.buffer_spans);
    }

    #[test]
    fn test_span_creation() {
        // These should not panic
        let _span = span_element("audioconvert0", "transform_caps");
        let _span = span_buffer("audioconvert0", 7);
        let _guard = instrument_element("audioconvert0", "set_format");
    }

    #[test]
    fn test_trace_functions() {
        // These should not panic even without a subscriber
        let format = AudioFormat::int(44100, 2, 16, 16, true, Endianness::Little);
        trace_buffer_converted("audioconvert0", 100, 0, false);
        trace_format_change("audioconvert0", &format, &format);
        trace_error("audioconvert0", &crate::Error::NotNegotiated);
    }
}
