// Tue Feb 03 2026 - Alex

use crate::memory::{Address, MemoryError, MemoryRange, MemoryReader, MemoryRegion, Protection};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Raw memory dump mapped as a single-region layer.
///
/// The whole file is treated as one readable region starting at the
/// configured base address (zero by default, matching flat dumps).
pub struct ImageMemory {
    map: Mmap,
    base: u64,
    layer_name: String,
}

impl ImageMemory {
    pub fn open(path: &Path) -> Result<Self, MemoryError> {
        Self::open_at(path, 0)
    }

    pub fn open_at(path: &Path, base: u64) -> Result<Self, MemoryError> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len == 0 {
            return Err(MemoryError::EmptyImage(path.display().to_string()));
        }
        // Read-only map of an already-captured image.
        let map = unsafe { Mmap::map(&file)? };
        let layer_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { map, base, layer_name })
    }

    pub fn len(&self) -> u64 {
        self.map.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl MemoryReader for ImageMemory {
    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        let offset = addr
            .as_u64()
            .checked_sub(self.base)
            .ok_or_else(|| MemoryError::OutOfBounds(addr.as_u64()))?;
        let end = offset
            .checked_add(len as u64)
            .ok_or_else(|| MemoryError::OutOfBounds(addr.as_u64()))?;
        if end > self.len() {
            return Err(MemoryError::OutOfBounds(addr.as_u64()));
        }
        Ok(self.map[offset as usize..end as usize].to_vec())
    }

    fn get_regions(&self) -> Result<Vec<MemoryRegion>, MemoryError> {
        let range = MemoryRange::from_start_size(Address::new(self.base), self.len());
        Ok(vec![MemoryRegion::new(
            range,
            Protection::Read,
            self.layer_name.clone(),
        )])
    }

    fn layer_name(&self) -> &str {
        &self.layer_name
    }
}
