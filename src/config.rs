// Mon Feb 02 2026 - Alex

use crate::rules::RuleSource;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No rule text or rule file was given; pass --rule or --rule-file")]
    MissingRuleSource,
    #[error("Both rule text and a rule file were given; pass exactly one")]
    AmbiguousRuleSource,
    #[error("--nocase and --wide only apply to inline rule text")]
    ModifierWithoutInlineRule,
    #[error("Thread count must be greater than 0")]
    InvalidThreads,
}

/// Everything one scan run needs, validated before any scanning starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub rule_text: Option<String>,
    pub rule_file: Option<PathBuf>,
    pub case_insensitive: bool,
    pub wide: bool,
    pub pid: Option<i32>,
    pub max_size: Option<u64>,
    pub image: Option<PathBuf>,
    pub parallel: bool,
    pub max_threads: usize,
    pub show_progress: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            rule_text: None,
            rule_file: None,
            case_insensitive: false,
            wide: false,
            pid: None,
            max_size: None,
            image: None,
            parallel: true,
            max_threads: num_cpus::get(),
            show_progress: true,
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule_text(mut self, text: String) -> Self {
        self.rule_text = Some(text);
        self
    }

    pub fn with_rule_file(mut self, path: PathBuf) -> Self {
        self.rule_file = Some(path);
        self
    }

    pub fn with_pid(mut self, pid: i32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.rule_text, &self.rule_file) {
            (None, None) => return Err(ConfigError::MissingRuleSource),
            (Some(_), Some(_)) => return Err(ConfigError::AmbiguousRuleSource),
            _ => {}
        }
        if self.rule_file.is_some() && (self.case_insensitive || self.wide) {
            return Err(ConfigError::ModifierWithoutInlineRule);
        }
        if self.max_threads == 0 {
            return Err(ConfigError::InvalidThreads);
        }
        Ok(())
    }

    /// The validated rule source; call after `validate()`.
    pub fn rule_source(&self) -> Result<RuleSource, ConfigError> {
        match (&self.rule_text, &self.rule_file) {
            (Some(text), None) => Ok(RuleSource::Inline {
                text: text.clone(),
                case_insensitive: self.case_insensitive,
                wide: self.wide,
            }),
            (None, Some(path)) => Ok(RuleSource::File(path.clone())),
            (None, None) => Err(ConfigError::MissingRuleSource),
            (Some(_), Some(_)) => Err(ConfigError::AmbiguousRuleSource),
        }
    }
}
