// Mon Feb 02 2026 - Alex

use crate::memory::MemoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Chunk size must be greater than zero")]
    InvalidChunkSize,
    #[error("Overlap 0x{overlap:x} must be smaller than chunk size 0x{chunk_size:x}")]
    OverlapExceedsChunk { overlap: u64, chunk_size: u64 },
    #[error("Malformed region bounds: start 0x{start:x} past end 0x{end:x}")]
    InvalidRegion { start: u64, end: u64 },
    #[error(transparent)]
    Memory(#[from] MemoryError),
}
