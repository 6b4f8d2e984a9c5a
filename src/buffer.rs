//! Buffer type: shared sample bytes plus metadata.
//!
//! A [`Buffer`] owns its bytes through an `Arc`, so cloning a buffer is cheap
//! and shares the payload. A buffer is *writable* only while its payload is
//! not shared; that is what allows a conversion to work in place.

use crate::metadata::Metadata;
use std::sync::Arc;

/// A buffer containing sample bytes and metadata.
///
/// # Example
///
/// ```rust
/// use audioconvert::buffer::Buffer;
/// use audioconvert::metadata::Metadata;
///
/// let mut buffer = Buffer::new(vec![0u8; 16], Metadata::with_sequence(0));
/// assert!(buffer.is_writable());
///
/// let shared = buffer.clone();
/// assert!(!buffer.is_writable());
/// assert!(buffer.as_mut_bytes().is_none());
/// drop(shared);
/// assert!(buffer.as_mut_bytes().is_some());
/// ```
#[derive(Clone)]
pub struct Buffer {
    /// Payload bytes, shared between clones.
    memory: Arc<Vec<u8>>,
    /// Buffer metadata.
    metadata: Metadata,
}

impl Buffer {
    /// Create a new buffer.
    pub fn new(data: Vec<u8>, metadata: Metadata) -> Self {
        Self {
            memory: Arc::new(data),
            metadata,
        }
    }

    /// Create a zero-filled buffer of `len` bytes.
    pub fn zeroed(len: usize, metadata: Metadata) -> Self {
        Self::new(vec![0; len], metadata)
    }

    /// Create a buffer with default metadata.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::new(data.into(), Metadata::default())
    }

    /// Get a reference to the buffer's metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Get a mutable reference to the buffer's metadata.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Get the buffer data as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.memory
    }

    /// Get the buffer data mutably, if the payload is not shared.
    pub fn as_mut_bytes(&mut self) -> Option<&mut [u8]> {
        Arc::get_mut(&mut self.memory).map(Vec::as_mut_slice)
    }

    /// Get the buffer data mutably, copying it first if shared.
    pub fn make_mut(&mut self) -> &mut [u8] {
        Arc::make_mut(&mut self.memory).as_mut_slice()
    }

    /// Whether the payload is uniquely owned.
    pub fn is_writable(&self) -> bool {
        Arc::strong_count(&self.memory) == 1 && Arc::weak_count(&self.memory) == 0
    }

    /// Whether the buffer is flagged as a gap.
    pub fn is_gap(&self) -> bool {
        self.metadata.flags.is_gap()
    }

    /// Get the length of the buffer data.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Take the payload, copying only if it is still shared.
    pub fn into_bytes(self) -> Vec<u8> {
        Arc::try_unwrap(self.memory).unwrap_or_else(|shared| shared.as_ref().clone())
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.len())
            .field("writable", &self.is_writable())
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = Buffer::new(vec![1, 2, 3, 4], Metadata::with_sequence(42));
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.metadata().sequence, 42);
        assert_eq!(buffer.as_bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_buffer_clone_shares_memory() {
        let mut buffer = Buffer::zeroed(8, Metadata::new());
        let clone = buffer.clone();

        assert!(!buffer.is_writable());
        assert!(buffer.as_mut_bytes().is_none());

        // Copy-on-write leaves the clone untouched
        buffer.make_mut()[0] = 7;
        assert_eq!(buffer.as_bytes()[0], 7);
        assert_eq!(clone.as_bytes()[0], 0);
        assert!(buffer.is_writable());
    }

    #[test]
    fn test_buffer_gap() {
        let buffer = Buffer::new(vec![0; 4], Metadata::new().with_gap());
        assert!(buffer.is_gap());
        assert!(!Buffer::from_bytes([0u8; 4]).is_gap());
    }

    #[test]
    fn test_into_bytes() {
        let buffer = Buffer::from_bytes(vec![9u8, 8]);
        let shared = buffer.clone();
        assert_eq!(buffer.into_bytes(), vec![9, 8]);
        assert_eq!(shared.into_bytes(), vec![9, 8]);
    }
}
