// Tue Feb 03 2026 - Alex

use crate::memory::{Address, MemoryReader};
use crate::rules::CompiledRules;
use crate::scan::{ScanError, ScanUnit};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

/// One reported match at an absolute address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleMatch {
    pub address: u64,
    pub rule: String,
}

/// Executes a chunk plan against one layer: reads the planned slices,
/// runs the compiled rules over the bytes and translates hits back to
/// absolute addresses.
pub struct ScanDriver<'r> {
    reader: &'r dyn MemoryReader,
    rules: &'r CompiledRules,
    max_address: Option<u64>,
}

impl<'r> ScanDriver<'r> {
    pub fn new(reader: &'r dyn MemoryReader, rules: &'r CompiledRules) -> Self {
        Self {
            reader,
            rules,
            max_address: None,
        }
    }

    /// Bound how far into the layer the scan reaches; slices starting at
    /// or past the bound are skipped, slices crossing it are clamped.
    pub fn with_max_address(mut self, max_address: Option<u64>) -> Self {
        self.max_address = max_address;
        self
    }

    /// Lazily scan a plan. Unreadable slices are skipped (logged at
    /// debug level); planner validation errors come through as `Err`.
    pub fn scan<I>(&self, plan: I) -> MatchStream<'_, 'r, I>
    where
        I: Iterator<Item = Result<ScanUnit, ScanError>>,
    {
        MatchStream {
            driver: self,
            plan,
            pending: VecDeque::new(),
            seen: HashSet::new(),
        }
    }

    /// Drain a plan into a match list, failing on the first plan error.
    pub fn scan_to_vec<I>(&self, plan: I) -> Result<Vec<RuleMatch>, ScanError>
    where
        I: Iterator<Item = Result<ScanUnit, ScanError>>,
    {
        self.scan(plan).collect()
    }

    /// Read and match one unit, appending fresh matches to `pending`.
    fn process_unit(
        &self,
        unit: &ScanUnit,
        seen: &mut HashSet<(u64, String)>,
        pending: &mut VecDeque<RuleMatch>,
    ) {
        let mut buffer = Vec::new();
        let base = match unit.slices.first() {
            Some(slice) => slice.offset,
            None => return,
        };

        for slice in &unit.slices {
            let (offset, length) = match self.clamp(slice.offset, slice.length) {
                Some(bounds) => bounds,
                None => {
                    log::trace!(
                        "slice at 0x{:x} past scan bound, skipping unit",
                        slice.offset
                    );
                    return;
                }
            };
            match self.reader.read_bytes(Address::new(offset), length as usize) {
                Ok(bytes) => buffer.extend(bytes),
                Err(e) => {
                    // Unreadable memory contributes no matches.
                    log::debug!(
                        "skipping unreadable slice at 0x{:x} (+0x{:x}): {}",
                        offset,
                        length,
                        e
                    );
                    return;
                }
            }
        }

        for hit in self.rules.scan(&buffer) {
            let address = base + hit.offset as u64;
            if address >= unit.logical_end {
                // The descriptor only covers the region up to logical_end.
                continue;
            }
            if let Some(max) = self.max_address {
                if address >= max {
                    continue;
                }
            }
            if seen.insert((address, hit.rule.clone())) {
                pending.push_back(RuleMatch {
                    address,
                    rule: hit.rule,
                });
            }
        }
    }

    fn clamp(&self, offset: u64, length: u64) -> Option<(u64, u64)> {
        match self.max_address {
            Some(max) if offset >= max => None,
            Some(max) => Some((offset, length.min(max - offset))),
            None => Some((offset, length)),
        }
    }
}

/// Lazy match stream over a chunk plan. Overlapping windows can surface
/// the same physical occurrence twice; a per-scan seen-set keeps each
/// `(address, rule)` pair to a single report.
pub struct MatchStream<'d, 'r, I> {
    driver: &'d ScanDriver<'r>,
    plan: I,
    pending: VecDeque<RuleMatch>,
    seen: HashSet<(u64, String)>,
}

impl<'d, 'r, I> Iterator for MatchStream<'d, 'r, I>
where
    I: Iterator<Item = Result<ScanUnit, ScanError>>,
{
    type Item = Result<RuleMatch, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(m) = self.pending.pop_front() {
                return Some(Ok(m));
            }
            match self.plan.next()? {
                Ok(unit) => {
                    self.driver
                        .process_unit(&unit, &mut self.seen, &mut self.pending);
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryError, MemoryRange, MemoryRegion, Protection};
    use crate::rules::RuleSource;
    use crate::scan::{plan, ScanParameters};
    use std::ops::Range;

    /// In-memory layer with optional unreadable holes.
    struct MockLayer {
        data: Vec<u8>,
        holes: Vec<Range<u64>>,
    }

    impl MockLayer {
        fn new(data: Vec<u8>) -> Self {
            Self { data, holes: Vec::new() }
        }

        fn with_hole(mut self, hole: Range<u64>) -> Self {
            self.holes.push(hole);
            self
        }
    }

    impl MemoryReader for MockLayer {
        fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
            let start = addr.as_u64();
            let end = start + len as u64;
            if self.holes.iter().any(|h| start < h.end && end > h.start) {
                return Err(MemoryError::ReadFailed(start));
            }
            if end > self.data.len() as u64 {
                return Err(MemoryError::OutOfBounds(start));
            }
            Ok(self.data[start as usize..end as usize].to_vec())
        }

        fn get_regions(&self) -> Result<Vec<MemoryRegion>, MemoryError> {
            Ok(vec![MemoryRegion::new(
                MemoryRange::from_start_size(Address::zero(), self.data.len() as u64),
                Protection::Read,
                "mock".to_string(),
            )])
        }

        fn layer_name(&self) -> &str {
            "mock"
        }
    }

    fn rules_for(text: &str) -> CompiledRules {
        CompiledRules::compile(&RuleSource::Inline {
            text: text.to_string(),
            case_insensitive: false,
            wide: false,
        })
        .unwrap()
    }

    fn region(start: u64, end: u64) -> MemoryRegion {
        MemoryRegion::new(
            MemoryRange::new(Address::new(start), Address::new(end)),
            Protection::Read,
            format!("region_{:x}", start),
        )
    }

    #[test]
    fn test_straddling_pattern_reported_once() {
        // chunk 16, overlap 8: windows [0,24), [16,40), ... A needle
        // fully inside the overlap zone [16,24) shows up in both.
        let mut data = vec![0u8; 64];
        data[17..23].copy_from_slice(b"needle");
        let layer = MockLayer::new(data);
        let rules = rules_for("needle")
            .with_parameters(ScanParameters::new(16, 8).unwrap());

        let driver = ScanDriver::new(&layer, &rules);
        let plan = plan(vec![region(0, 64)], "mock", rules.parameters());
        let matches = driver.scan_to_vec(plan).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].address, 17);
        assert_eq!(matches[0].rule, "r1");
    }

    #[test]
    fn test_pattern_across_chunk_boundary_found() {
        // Without overlap the needle at [14,20) would be cut at 16.
        let mut data = vec![0u8; 64];
        data[14..20].copy_from_slice(b"needle");
        let layer = MockLayer::new(data);
        let rules = rules_for("needle")
            .with_parameters(ScanParameters::new(16, 8).unwrap());

        let driver = ScanDriver::new(&layer, &rules);
        let plan = plan(vec![region(0, 64)], "mock", rules.parameters());
        let matches = driver.scan_to_vec(plan).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].address, 14);
    }

    #[test]
    fn test_unreadable_slice_is_skipped() {
        let mut data = vec![0u8; 96];
        data[4..10].copy_from_slice(b"needle");
        data[68..74].copy_from_slice(b"needle");
        // Hole knocks out the window containing the first needle.
        let layer = MockLayer::new(data).with_hole(0..32);
        let rules = rules_for("needle")
            .with_parameters(ScanParameters::new(32, 8).unwrap());

        let driver = ScanDriver::new(&layer, &rules);
        let plan = plan(vec![region(0, 96)], "mock", rules.parameters());
        let matches = driver.scan_to_vec(plan).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].address, 68);
    }

    #[test]
    fn test_max_address_bounds_scan() {
        let mut data = vec![0u8; 64];
        data[8..14].copy_from_slice(b"needle");
        data[40..46].copy_from_slice(b"needle");
        let layer = MockLayer::new(data);
        let rules = rules_for("needle")
            .with_parameters(ScanParameters::new(16, 8).unwrap());

        let driver = ScanDriver::new(&layer, &rules).with_max_address(Some(32));
        let plan = plan(vec![region(0, 64)], "mock", rules.parameters());
        let matches = driver.scan_to_vec(plan).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].address, 8);
    }

    #[test]
    fn test_matches_from_multiple_regions() {
        let mut data = vec![0u8; 128];
        data[2..8].copy_from_slice(b"needle");
        data[100..106].copy_from_slice(b"needle");
        let layer = MockLayer::new(data);
        let rules = rules_for("needle")
            .with_parameters(ScanParameters::new(32, 8).unwrap());

        let driver = ScanDriver::new(&layer, &rules);
        let plan = plan(
            vec![region(96, 128), region(0, 32)],
            "mock",
            rules.parameters(),
        );
        let matches = driver.scan_to_vec(plan).unwrap();

        // Region order is preserved; both occurrences reported once.
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].address, 100);
        assert_eq!(matches[1].address, 2);
    }

    #[test]
    fn test_empty_region_produces_no_matches() {
        let layer = MockLayer::new(vec![0u8; 16]);
        let rules = rules_for("needle")
            .with_parameters(ScanParameters::new(16, 8).unwrap());
        let driver = ScanDriver::new(&layer, &rules);
        let plan = plan(vec![region(4, 4)], "mock", rules.parameters());
        assert!(driver.scan_to_vec(plan).unwrap().is_empty());
    }

    #[test]
    fn test_plan_error_propagates() {
        let layer = MockLayer::new(vec![0u8; 16]);
        let rules = rules_for("needle")
            .with_parameters(ScanParameters::new(16, 8).unwrap());
        let driver = ScanDriver::new(&layer, &rules);

        let bad = MemoryRegion::new(
            MemoryRange::new(Address::new(8), Address::new(4)),
            Protection::Read,
            "bad".to_string(),
        );
        let plan = plan(vec![bad], "mock", rules.parameters());
        assert!(matches!(
            driver.scan_to_vec(plan),
            Err(ScanError::InvalidRegion { .. })
        ));
    }
}
