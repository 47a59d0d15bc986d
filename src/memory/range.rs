// Mon Feb 02 2026 - Alex

use crate::memory::Address;
use std::fmt;

/// Half-open `[start, end)` span of an address space.
///
/// Validity (`start <= end`) is not enforced at construction; region
/// producers parse bounds from external sources and the scan planner
/// rejects malformed spans with a proper error instead of a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryRange {
    start: Address,
    end: Address,
}

impl MemoryRange {
    pub fn new(start: Address, end: Address) -> Self {
        Self { start, end }
    }

    pub fn from_start_size(start: Address, size: u64) -> Self {
        Self::new(start, start + size)
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn end(&self) -> Address {
        self.end
    }

    pub fn size(&self) -> u64 {
        self.end.as_u64().saturating_sub(self.start.as_u64())
    }

    pub fn contains(&self, addr: Address) -> bool {
        addr.is_within_range(self.start, self.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start.as_u64() >= self.end.as_u64()
    }

    /// False when `end` sits below `start`.
    pub fn is_valid(&self) -> bool {
        self.start.as_u64() <= self.end.as_u64()
    }
}

impl fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
