// Tue Feb 03 2026 - Alex

pub mod engine;
pub mod error;
pub mod pattern;
pub mod rule;

pub use engine::{
    CompiledRules, EngineHit, RuleSource, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP, INLINE_RULE_NAME,
};
pub use error::RuleError;
pub use pattern::BytePattern;
pub use rule::{parse_rules, Condition, Rule, RuleString, StringBody, StringModifiers};
