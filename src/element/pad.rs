//! Pad directions and templates for the stage's input and output.

use crate::caps::AudioCaps;

/// Direction of a pad (input or output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadDirection {
    /// An input pad (receives buffers from upstream).
    Input,
    /// An output pad (sends buffers downstream).
    Output,
}

impl PadDirection {
    /// The pad on the other side of the element.
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

impl std::fmt::Display for PadDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => f.write_str("sink"),
            Self::Output => f.write_str("src"),
        }
    }
}

/// Template for an always-present pad.
///
/// The caps list every format the pad can ever carry.
#[derive(Debug, Clone)]
pub struct PadTemplate {
    /// Name of the pad.
    pub name: String,
    /// Direction of the pad.
    pub direction: PadDirection,
    /// Formats the pad accepts.
    pub caps: AudioCaps,
}

impl PadTemplate {
    /// Create a new pad template.
    pub fn new(name: impl Into<String>, direction: PadDirection, caps: AudioCaps) -> Self {
        Self {
            name: name.into(),
            direction,
            caps,
        }
    }

    /// Create a template for the input pad named "sink".
    pub fn sink(caps: AudioCaps) -> Self {
        Self::new("sink", PadDirection::Input, caps)
    }

    /// Create a template for the output pad named "src".
    pub fn src(caps: AudioCaps) -> Self {
        Self::new("src", PadDirection::Output, caps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps::pad_template;

    #[test]
    fn test_template_creation() {
        let sink = PadTemplate::sink(pad_template());
        assert_eq!(sink.name, "sink");
        assert_eq!(sink.direction, PadDirection::Input);
        assert_eq!(sink.caps.len(), 6);

        let src = PadTemplate::src(AudioCaps::new_empty());
        assert_eq!(src.name, "src");
        assert_eq!(src.direction, PadDirection::Output);
    }

    #[test]
    fn test_direction_opposite() {
        assert_eq!(PadDirection::Input.opposite(), PadDirection::Output);
        assert_eq!(PadDirection::Output.opposite(), PadDirection::Input);
        assert_eq!(PadDirection::Output.to_string(), "src");
    }
}
