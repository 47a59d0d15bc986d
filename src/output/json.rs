// Wed Feb 04 2026 - Alex

use crate::scan::LayerMatches;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Dump results as pretty JSON, one entry per scanned layer.
pub fn save_results(results: &[LayerMatches], path: &Path) -> io::Result<()> {
    let json = serde_json::to_string_pretty(results)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::RuleMatch;

    #[test]
    fn test_save_results_round_trips() {
        let results = vec![LayerMatches {
            pid: Some(7),
            source: "init".to_string(),
            matches: vec![RuleMatch {
                address: 0x40,
                rule: "r1".to_string(),
            }],
        }];
        let path = std::env::temp_dir().join(format!("vadscan_{}_results.json", std::process::id()));
        save_results(&results, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"rule\": \"r1\""));
        assert!(text.contains("\"address\": 64"));
        std::fs::remove_file(path).ok();
    }
}
