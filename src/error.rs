//! Error types for audio format negotiation and conversion.

use thiserror::Error;

/// Result type alias using the crate's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Which side of a conversion a buffer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// The buffer being converted from.
    Input,
    /// The buffer being written to.
    Output,
}

impl std::fmt::Display for BufferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// Main error type for negotiation and conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// A format description cannot be resolved to a concrete format.
    #[error("invalid format: {0}")]
    Format(String),

    /// The conversion kernel refused a format pair.
    #[error("no converter: {0}")]
    Converter(String),

    /// A buffer is smaller than the conversion requires.
    #[error("{kind} buffer is of wrong size: {have} < {need}")]
    Size {
        /// Which buffer was too small.
        kind: BufferKind,
        /// Bytes available.
        have: usize,
        /// Bytes required.
        need: usize,
    },

    /// The conversion kernel failed on a buffer.
    #[error("error while converting: {0}")]
    Conversion(String),

    /// A buffer arrived before a format pair was configured.
    #[error("not negotiated: no format configured")]
    NotNegotiated,

    /// Unknown property or invalid property value.
    #[error("property '{name}': {reason}")]
    Property {
        /// Property name.
        name: String,
        /// Why the property could not be read or written.
        reason: String,
    },
}

impl Error {
    /// Shorthand for a [`Error::Format`] error.
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Whether this error only affects the current buffer.
    ///
    /// Size and conversion failures leave the configured context usable for
    /// subsequent buffers.
    pub fn is_per_buffer(&self) -> bool {
        matches!(self, Self::Size { .. } | Self::Conversion(_))
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Format(_) => "format",
            Self::Converter(_) => "converter",
            Self::Size { .. } => "size",
            Self::Conversion(_) => "conversion",
            Self::NotNegotiated => "not-negotiated",
            Self::Property { .. } => "property",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_error_message() {
        let err = Error::Size {
            kind: BufferKind::Output,
            have: 7,
            need: 8,
        };
        assert_eq!(err.to_string(), "output buffer is of wrong size: 7 < 8");
        assert!(err.is_per_buffer());
    }

    #[test]
    fn test_format_error_is_not_per_buffer() {
        let err = Error::format("missing field 'rate'");
        assert_eq!(err.to_string(), "invalid format: missing field 'rate'");
        assert!(!err.is_per_buffer());
    }
}
