//! Buffer metadata types.

use std::time::Duration;

/// Flags indicating buffer properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferFlags {
    /// Buffer follows a discontinuity in the stream.
    pub discont: bool,
    /// Buffer content is silence; the payload carries no samples.
    pub gap: bool,
}

impl BufferFlags {
    /// Set the gap flag.
    pub fn set_gap(&mut self, value: bool) {
        self.gap = value;
    }

    /// Check if gap flag is set.
    pub fn is_gap(&self) -> bool {
        self.gap
    }
}

/// Metadata associated with a buffer.
///
/// Carried through a conversion unchanged: the output buffer of a transform
/// gets a copy of its input's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Presentation timestamp.
    pub pts: Option<Duration>,

    /// Duration of this buffer's content.
    pub duration: Option<Duration>,

    /// Monotonic sequence number within a stream.
    pub sequence: u64,

    /// Offset of the first sample frame in the stream.
    pub offset: Option<u64>,

    /// Offset one past the last sample frame.
    pub offset_end: Option<u64>,

    /// Buffer flags.
    pub flags: BufferFlags,
}

impl Metadata {
    /// Create new metadata with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create metadata with a sequence number.
    pub fn with_sequence(sequence: u64) -> Self {
        Self {
            sequence,
            ..Default::default()
        }
    }

    /// Set the presentation timestamp.
    pub fn with_pts(mut self, pts: Duration) -> Self {
        self.pts = Some(pts);
        self
    }

    /// Set the duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Set the sample frame offsets.
    pub fn with_offsets(mut self, offset: u64, offset_end: u64) -> Self {
        self.offset = Some(offset);
        self.offset_end = Some(offset_end);
        self
    }

    /// Mark as a gap (silence) buffer.
    pub fn with_gap(mut self) -> Self {
        self.flags.gap = true;
        self
    }

    /// Mark as following a discontinuity.
    pub fn with_discont(mut self) -> Self {
        self.flags.discont = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_builder() {
        let meta = Metadata::with_sequence(42)
            .with_pts(Duration::from_millis(100))
            .with_duration(Duration::from_millis(20))
            .with_offsets(4410, 5292);

        assert_eq!(meta.sequence, 42);
        assert_eq!(meta.pts, Some(Duration::from_millis(100)));
        assert_eq!(meta.duration, Some(Duration::from_millis(20)));
        assert_eq!(meta.offset_end, Some(5292));
        assert!(!meta.flags.is_gap());
    }

    #[test]
    fn test_gap_flag() {
        let meta = Metadata::new().with_gap();
        assert!(meta.flags.is_gap());

        let mut flags = meta.with_discont().flags;
        flags.set_gap(false);
        assert!(!flags.is_gap());
        assert!(flags.discont);
    }
}
