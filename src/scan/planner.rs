// Mon Feb 02 2026 - Alex

use crate::memory::MemoryRegion;
use crate::scan::ScanError;

/// Read geometry required by the rule engine: every scan call wants
/// `chunk_size` bytes, and consecutive windows re-read `overlap` trailing
/// bytes so a pattern of length <= `overlap` that straddles a chunk
/// boundary appears whole in at least one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanParameters {
    chunk_size: u64,
    overlap: u64,
}

impl ScanParameters {
    /// Rejects `chunk_size == 0` and `overlap >= chunk_size` up front;
    /// an overlap reaching the chunk size would make windows overlap by
    /// a full chunk or more and defeat the bounded-work guarantee.
    pub fn new(chunk_size: u64, overlap: u64) -> Result<Self, ScanError> {
        if chunk_size == 0 {
            return Err(ScanError::InvalidChunkSize);
        }
        if overlap >= chunk_size {
            return Err(ScanError::OverlapExceedsChunk { overlap, chunk_size });
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn overlap(&self) -> u64 {
        self.overlap
    }

    /// Bytes read per non-final scan unit.
    pub fn window(&self) -> u64 {
        self.chunk_size + self.overlap
    }
}

/// One byte slice to read from a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceRequest {
    pub layer: String,
    pub offset: u64,
    pub length: u64,
}

/// One unit of work for the scan driver: the slices to read together,
/// and the address up to which the owning region counts as covered once
/// this unit has been matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanUnit {
    pub slices: Vec<SliceRequest>,
    pub logical_end: u64,
}

/// Turn region extents into a lazy sequence of overlap-aware scan units.
///
/// Regions are consumed in the order supplied; no sortedness or
/// disjointness is assumed. Each region independently produces windows of
/// `chunk_size + overlap` bytes advancing by `chunk_size`, then one
/// unconditional remainder (possibly shorter than a chunk, possibly
/// empty), so every region contributes at least one unit and the union of
/// a region's slices covers it exactly. A region whose end sits below its
/// start yields a validation error when it is reached, after which the
/// plan terminates.
pub fn plan<I>(regions: I, layer: &str, params: ScanParameters) -> ChunkPlan<I::IntoIter>
where
    I: IntoIterator<Item = MemoryRegion>,
{
    ChunkPlan {
        regions: regions.into_iter(),
        layer: layer.to_string(),
        params,
        current: None,
        failed: false,
    }
}

/// Lazy iterator behind [`plan`]. Holds at most the bounds of the region
/// in progress; dropping it early abandons all remaining work.
pub struct ChunkPlan<I> {
    regions: I,
    layer: String,
    params: ScanParameters,
    /// Cursor and end of the region currently being windowed.
    current: Option<(u64, u64)>,
    failed: bool,
}

impl<I> ChunkPlan<I> {
    fn unit(&self, offset: u64, length: u64, logical_end: u64) -> ScanUnit {
        ScanUnit {
            slices: vec![SliceRequest {
                layer: self.layer.clone(),
                offset,
                length,
            }],
            logical_end,
        }
    }
}

impl<I> Iterator for ChunkPlan<I>
where
    I: Iterator<Item = MemoryRegion>,
{
    type Item = Result<ScanUnit, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if let Some((cursor, end)) = self.current {
                let window = self.params.window();
                if end - cursor > window {
                    let unit = self.unit(cursor, window, cursor + window);
                    self.current = Some((cursor + self.params.chunk_size(), end));
                    return Some(Ok(unit));
                }
                // Remainder is emitted unconditionally, even when empty.
                self.current = None;
                return Some(Ok(self.unit(cursor, end - cursor, end)));
            }

            let region = self.regions.next()?;
            let (start, end) = (region.start().as_u64(), region.end().as_u64());
            if end < start {
                self.failed = true;
                return Some(Err(ScanError::InvalidRegion { start, end }));
            }
            self.current = Some((start, end));
        }
    }
}
