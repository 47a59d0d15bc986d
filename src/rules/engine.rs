// Wed Feb 04 2026 - Alex

use crate::rules::{
    parse_rules, BytePattern, Condition, Rule, RuleError, RuleString, StringBody, StringModifiers,
};
use crate::scan::ScanParameters;
use indexmap::IndexMap;
use regex::bytes::Regex;
use std::fs;
use std::path::PathBuf;

/// Default read geometry handed to the planner: 16 MiB chunks with one
/// page of overlap. The overlap is raised when a rule carries a longer
/// fixed pattern, so boundary-straddling literals stay whole.
pub const DEFAULT_CHUNK_SIZE: u64 = 0x100_0000;
pub const DEFAULT_OVERLAP: u64 = 0x1000;

/// Name given to the single rule compiled from inline pattern text.
pub const INLINE_RULE_NAME: &str = "r1";

/// Where the rules come from: exactly one of inline text or a rule file.
#[derive(Debug, Clone)]
pub enum RuleSource {
    Inline {
        text: String,
        case_insensitive: bool,
        wide: bool,
    },
    File(PathBuf),
}

/// One raw engine hit, offset relative to the scanned buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineHit {
    pub offset: usize,
    pub rule: String,
}

enum StringMatcher {
    /// Literal alternatives (ascii and/or wide variants of one string).
    Patterns(Vec<BytePattern>),
    Regex(Regex),
}

struct CompiledString {
    ident: String,
    matcher: StringMatcher,
}

struct CompiledRule {
    condition: Condition,
    strings: Vec<CompiledString>,
}

/// Rule set compiled for scanning, together with the read geometry the
/// planner must honor.
pub struct CompiledRules {
    rules: IndexMap<String, CompiledRule>,
    params: ScanParameters,
}

impl CompiledRules {
    pub fn compile(source: &RuleSource) -> Result<Self, RuleError> {
        let parsed = match source {
            RuleSource::Inline {
                text,
                case_insensitive,
                wide,
            } => vec![inline_rule(text, *case_insensitive, *wide)],
            RuleSource::File(path) => {
                let src = fs::read_to_string(path).map_err(|e| RuleError::Io {
                    path: path.clone(),
                    source: e,
                })?;
                let rules = parse_rules(&src)?;
                if rules.is_empty() {
                    return Err(RuleError::EmptyRuleFile(path.clone()));
                }
                rules
            }
        };

        let mut rules = IndexMap::new();
        for rule in parsed {
            if let Condition::Custom(text) = &rule.condition {
                log::debug!(
                    "rule '{}': condition '{}' not supported, treating as 'any of them'",
                    rule.name,
                    text
                );
            }
            let mut strings = Vec::new();
            for s in &rule.strings {
                strings.push(compile_string(&rule.name, s)?);
            }
            rules.insert(
                rule.name,
                CompiledRule {
                    condition: rule.condition,
                    strings,
                },
            );
        }

        let overlap = overlap_for(&rules);
        let params = ScanParameters::new(DEFAULT_CHUNK_SIZE, overlap)?;

        Ok(Self { rules, params })
    }

    /// Read geometry the planner should use for this rule set.
    pub fn parameters(&self) -> ScanParameters {
        self.params
    }

    /// Override the read geometry (smaller windows for tests or
    /// constrained targets).
    pub fn with_parameters(mut self, params: ScanParameters) -> Self {
        self.params = params;
        self
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule over one buffer and report raw hits in offset order.
    pub fn scan(&self, data: &[u8]) -> Vec<EngineHit> {
        let mut hits = Vec::new();

        for (name, rule) in &self.rules {
            let mut per_string: Vec<Vec<usize>> = Vec::with_capacity(rule.strings.len());
            for s in &rule.strings {
                per_string.push(string_occurrences(s, data));
            }

            let satisfied = match rule.condition {
                Condition::All => per_string.iter().all(|offs| !offs.is_empty()),
                _ => true,
            };
            if !satisfied {
                continue;
            }

            for offs in per_string {
                for offset in offs {
                    hits.push(EngineHit {
                        offset,
                        rule: name.clone(),
                    });
                }
            }
        }

        hits.sort_by_key(|h| h.offset);
        hits
    }
}

fn string_occurrences(s: &CompiledString, data: &[u8]) -> Vec<usize> {
    let mut offsets = match &s.matcher {
        StringMatcher::Patterns(patterns) => {
            let mut all = Vec::new();
            for pattern in patterns {
                all.extend(pattern.find_all_in(data));
            }
            all
        }
        StringMatcher::Regex(re) => re.find_iter(data).map(|m| m.start()).collect(),
    };
    // Wide and ascii variants can land on the same offset.
    offsets.sort_unstable();
    offsets.dedup();
    offsets
}

/// Build the implicit single-string rule compiled from inline text:
/// `{`-prefixed text is a hex pattern, `/`-prefixed text is a regex,
/// anything else a plain string. `wide` implies the ascii fallback.
fn inline_rule(text: &str, case_insensitive: bool, wide: bool) -> Rule {
    let trimmed = text.trim();
    let body = if let Some(stripped) = trimmed.strip_prefix('{') {
        StringBody::Hex(stripped.trim_end_matches('}').trim().to_string())
    } else if let Some(stripped) = trimmed.strip_prefix('/') {
        StringBody::Regex(stripped.trim_end_matches('/').to_string())
    } else {
        StringBody::Text(trimmed.to_string())
    };

    Rule {
        name: INLINE_RULE_NAME.to_string(),
        strings: vec![RuleString {
            ident: "a".to_string(),
            body,
            modifiers: StringModifiers {
                nocase: case_insensitive,
                wide,
                ascii: wide,
            },
        }],
        condition: Condition::Any,
    }
}

fn compile_string(rule_name: &str, s: &RuleString) -> Result<CompiledString, RuleError> {
    let matcher = match &s.body {
        StringBody::Text(text) => {
            let mut base = BytePattern::from_bytes(text.as_bytes());
            if s.modifiers.nocase {
                base = base.nocase();
            }
            let mut variants = Vec::new();
            if s.modifiers.wide {
                variants.push(base.widen());
                if s.modifiers.ascii {
                    variants.push(base);
                }
            } else {
                variants.push(base);
            }
            StringMatcher::Patterns(variants)
        }
        StringBody::Hex(body) => {
            if s.modifiers.nocase {
                return Err(RuleError::InvalidModifier {
                    modifier: "nocase",
                    kind: "hex",
                });
            }
            if s.modifiers.wide {
                return Err(RuleError::InvalidModifier {
                    modifier: "wide",
                    kind: "hex",
                });
            }
            StringMatcher::Patterns(vec![BytePattern::from_hex_body(body)?])
        }
        StringBody::Regex(body) => {
            if s.modifiers.wide {
                log::warn!(
                    "rule '{}': 'wide' is not supported on regex strings, ignoring",
                    rule_name
                );
            }
            // Byte semantics: disable unicode so classes stay per-byte.
            let flags = if s.modifiers.nocase { "(?i-u)" } else { "(?-u)" };
            StringMatcher::Regex(Regex::new(&format!("{}{}", flags, body))?)
        }
    };

    Ok(CompiledString {
        ident: s.ident.clone(),
        matcher,
    })
}

/// One page of overlap, or the longest fixed pattern when a rule exceeds
/// it; always kept below the chunk size so the planner accepts it.
fn overlap_for(rules: &IndexMap<String, CompiledRule>) -> u64 {
    let longest = rules
        .values()
        .flat_map(|r| r.strings.iter())
        .filter_map(|s| match &s.matcher {
            StringMatcher::Patterns(patterns) => patterns.iter().map(|p| p.len() as u64).max(),
            StringMatcher::Regex(_) => None,
        })
        .max()
        .unwrap_or(0);

    DEFAULT_OVERLAP.max(longest).min(DEFAULT_CHUNK_SIZE - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn inline(text: &str, case_insensitive: bool, wide: bool) -> CompiledRules {
        CompiledRules::compile(&RuleSource::Inline {
            text: text.to_string(),
            case_insensitive,
            wide,
        })
        .unwrap()
    }

    fn temp_rules(name: &str, source: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("vadscan_{}_{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(source.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_inline_text_rule() {
        let rules = inline("needle", false, false);
        assert_eq!(rules.rule_names().collect::<Vec<_>>(), vec![INLINE_RULE_NAME]);
        let hits = rules.scan(b"xxneedleyyneedle");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].offset, 2);
        assert_eq!(hits[1].offset, 10);
        assert_eq!(hits[0].rule, "r1");
    }

    #[test]
    fn test_inline_nocase() {
        let rules = inline("NeEdLe", true, false);
        assert_eq!(rules.scan(b"xxNEEDLEyy").len(), 1);
        let strict = inline("NeEdLe", false, false);
        assert!(strict.scan(b"xxNEEDLEyy").is_empty());
    }

    #[test]
    fn test_inline_hex_rule() {
        let rules = inline("{ 90 ?? 91 }", false, false);
        let hits = rules.scan(&[0x00, 0x90, 0x55, 0x91, 0x00]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].offset, 1);
    }

    #[test]
    fn test_inline_regex_rule() {
        let rules = inline("/ab+c/", false, false);
        let hits = rules.scan(b"xabbbcx abc");
        assert_eq!(hits.iter().map(|h| h.offset).collect::<Vec<_>>(), vec![1, 8]);
    }

    #[test]
    fn test_inline_wide_has_ascii_fallback() {
        let rules = inline("hi", false, true);
        let hits = rules.scan(b"..hi..h\0i\0..");
        assert_eq!(hits.iter().map(|h| h.offset).collect::<Vec<_>>(), vec![2, 6]);
    }

    #[test]
    fn test_file_compilation() {
        let path = temp_rules(
            "two_rules.yar",
            r#"
rule alpha { strings: $a = "alpha" condition: any of them }
rule beta { strings: $b = { DE AD BE EF } condition: any of them }
"#,
        );
        let rules = CompiledRules::compile(&RuleSource::File(path.clone())).unwrap();
        assert_eq!(rules.len(), 2);
        let hits = rules.scan(b"..alpha..\xde\xad\xbe\xef..");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].rule, "alpha");
        assert_eq!(hits[1].rule, "beta");
        assert_eq!(hits[1].offset, 9);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = RuleSource::File(std::path::PathBuf::from("/nonexistent/rules.yar"));
        assert!(matches!(
            CompiledRules::compile(&source),
            Err(RuleError::Io { .. })
        ));
    }

    #[test]
    fn test_empty_rule_file_rejected() {
        let path = temp_rules("empty.yar", "// nothing here\n");
        assert!(matches!(
            CompiledRules::compile(&RuleSource::File(path.clone())),
            Err(RuleError::EmptyRuleFile(_))
        ));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_all_condition_requires_every_string() {
        let path = temp_rules(
            "all.yar",
            r#"
rule pair {
  strings:
    $a = "first"
    $b = "second"
  condition:
    all of them
}
"#,
        );
        let rules = CompiledRules::compile(&RuleSource::File(path.clone())).unwrap();
        assert!(rules.scan(b"only first here").is_empty());
        let hits = rules.scan(b"first and second");
        assert_eq!(hits.len(), 2);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_hex_rejects_nocase() {
        let path = temp_rules(
            "badmod.yar",
            "rule bad { strings: $a = { 90 90 } nocase condition: any of them }",
        );
        assert!(matches!(
            CompiledRules::compile(&RuleSource::File(path.clone())),
            Err(RuleError::InvalidModifier { .. })
        ));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_default_geometry() {
        let rules = inline("short", false, false);
        let params = rules.parameters();
        assert_eq!(params.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(params.overlap(), DEFAULT_OVERLAP);
    }

    #[test]
    fn test_overlap_raised_for_long_pattern() {
        let long = "A".repeat(0x2000);
        let rules = inline(&long, false, false);
        assert_eq!(rules.parameters().overlap(), 0x2000);
    }
}
