// Wed Feb 04 2026 - Alex

use crate::scan::LayerMatches;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFormat {
    Hex16,
    Hex8,
    Decimal,
}

/// Streams matches as a fixed-column `[Offset, Rule]` table.
pub struct MatchTable {
    address_format: AddressFormat,
}

impl MatchTable {
    pub fn new() -> Self {
        Self {
            address_format: AddressFormat::Hex16,
        }
    }

    pub fn with_address_format(mut self, format: AddressFormat) -> Self {
        self.address_format = format;
        self
    }

    pub fn format_address(&self, address: u64) -> String {
        match self.address_format {
            AddressFormat::Hex16 => format!("0x{:016x}", address),
            AddressFormat::Hex8 => format!("0x{:08x}", address),
            AddressFormat::Decimal => format!("{}", address),
        }
    }

    pub fn write_all<W: Write>(&self, out: &mut W, results: &[LayerMatches]) -> io::Result<()> {
        writeln!(out, "{:<20} {}", "Offset", "Rule")?;
        for layer in results {
            for m in &layer.matches {
                writeln!(out, "{:<20} {}", self.format_address(m.address), m.rule)?;
            }
        }
        Ok(())
    }

    pub fn render(&self, results: &[LayerMatches]) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_all(&mut buffer, results);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Default for MatchTable {
    fn default() -> Self {
        Self::new()
    }
}
