// Mon Feb 02 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Process not found: {0}")]
    ProcessNotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Read failed at address 0x{0:x}")]
    ReadFailed(u64),
    #[error("Out of bounds: address 0x{0:x} not in any mapped region")]
    OutOfBounds(u64),
    #[error("Malformed maps entry: {0}")]
    InvalidMaps(String),
    #[error("Image file is empty: {0}")]
    EmptyImage(String),
}
