// Mon Feb 02 2026 - Alex

use crate::memory::{Address, MemoryError, MemoryRegion};

/// One address-space layer: raw bytes plus the regions mapped into it.
///
/// The scan driver only ever asks a layer for bytes at an offset; region
/// enumeration feeds the planner once per scan.
pub trait MemoryReader: Send + Sync {
    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError>;
    fn get_regions(&self) -> Result<Vec<MemoryRegion>, MemoryError>;
    fn layer_name(&self) -> &str;
}
