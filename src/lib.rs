// Mon Feb 02 2026 - Alex

#![allow(dead_code)]

pub mod config;
pub mod memory;
pub mod output;
pub mod rules;
pub mod scan;
pub mod utils;

pub use config::ScanConfig;
pub use memory::{Address, ImageMemory, MemoryReader, MemoryRegion, ProcessMemory};
pub use rules::{CompiledRules, RuleSource};
pub use scan::{plan, LayerMatches, RuleMatch, ScanDriver, ScanParameters, ScanSession};
