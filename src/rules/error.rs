// Tue Feb 03 2026 - Alex

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Failed to read rule file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid rule syntax: {0}")]
    Parse(String),
    #[error("Invalid hex pattern: {0}")]
    InvalidHex(String),
    #[error("Invalid regex pattern: {0}")]
    Regex(#[from] regex::Error),
    #[error("Modifier '{modifier}' cannot be applied to {kind} strings")]
    InvalidModifier {
        modifier: &'static str,
        kind: &'static str,
    },
    #[error("Rule file contains no rules: {0}")]
    EmptyRuleFile(PathBuf),
    #[error("Invalid scan geometry: {0}")]
    Geometry(#[from] crate::scan::ScanError),
}
