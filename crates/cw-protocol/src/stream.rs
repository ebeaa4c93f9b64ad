//! Stream index type

use std::fmt;

/// Index of a protocol stream (clipboard transfers, file uploads, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamIndex(pub u32);

impl StreamIndex {
    /// Create a new stream index
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index value
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Parse the wire representation
    pub fn parse(value: &str) -> Option<Self> {
        value.parse().ok().map(Self)
    }
}

impl fmt::Display for StreamIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for StreamIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

/// Hands out stream indices for outbound streams, lowest first.
#[derive(Debug, Default)]
pub struct StreamAllocator {
    next: u32,
}

impl StreamAllocator {
    /// Create a new allocator
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocate the next stream index
    pub fn allocate(&mut self) -> StreamIndex {
        let index = StreamIndex(self.next);
        self.next = self.next.wrapping_add(1);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_index_display() {
        assert_eq!(StreamIndex::new(7).to_string(), "7");
        assert_eq!(StreamIndex::parse("12"), Some(StreamIndex(12)));
        assert_eq!(StreamIndex::parse("-1"), None);
    }

    #[test]
    fn test_allocator_increments() {
        let mut alloc = StreamAllocator::new();
        assert_eq!(alloc.allocate(), StreamIndex(0));
        assert_eq!(alloc.allocate(), StreamIndex(1));
    }
}
