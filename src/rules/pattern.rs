// Tue Feb 03 2026 - Alex

use crate::rules::RuleError;
use std::fmt;

/// Byte pattern with a wildcard mask, searched naively with a first
/// significant byte prefilter.
#[derive(Debug, Clone)]
pub struct BytePattern {
    bytes: Vec<u8>,
    mask: Vec<bool>,
    nocase: bool,
}

impl BytePattern {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            mask: vec![true; bytes.len()],
            nocase: false,
        }
    }

    /// Parse the body of a hex string: pairs of hex digits or `??`
    /// wildcards, whitespace separated or packed.
    pub fn from_hex_body(body: &str) -> Result<Self, RuleError> {
        let cleaned: String = body.chars().filter(|c| !c.is_whitespace()).collect();
        if cleaned.is_empty() || cleaned.len() % 2 != 0 {
            return Err(RuleError::InvalidHex(body.trim().to_string()));
        }

        let mut bytes = Vec::new();
        let mut mask = Vec::new();
        let chars: Vec<char> = cleaned.chars().collect();
        for pair in chars.chunks(2) {
            match (pair[0], pair[1]) {
                ('?', '?') => {
                    bytes.push(0);
                    mask.push(false);
                }
                (hi, lo) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                    let mut value = String::new();
                    value.push(hi);
                    value.push(lo);
                    let byte = u8::from_str_radix(&value, 16)
                        .map_err(|_| RuleError::InvalidHex(body.trim().to_string()))?;
                    bytes.push(byte);
                    mask.push(true);
                }
                _ => return Err(RuleError::InvalidHex(body.trim().to_string())),
            }
        }

        Ok(Self { bytes, mask, nocase: false })
    }

    pub fn nocase(mut self) -> Self {
        self.nocase = true;
        self
    }

    /// UTF-16LE variant: every pattern byte followed by a significant
    /// zero byte; wildcard bytes stay wildcards on both halves.
    pub fn widen(&self) -> Self {
        let mut bytes = Vec::with_capacity(self.bytes.len() * 2);
        let mut mask = Vec::with_capacity(self.mask.len() * 2);
        for (&b, &m) in self.bytes.iter().zip(self.mask.iter()) {
            bytes.push(b);
            mask.push(m);
            bytes.push(0);
            mask.push(m);
        }
        Self { bytes, mask, nocase: self.nocase }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_nocase(&self) -> bool {
        self.nocase
    }

    fn byte_eq(&self, a: u8, b: u8) -> bool {
        if self.nocase {
            a.eq_ignore_ascii_case(&b)
        } else {
            a == b
        }
    }

    pub fn matches_at(&self, data: &[u8]) -> bool {
        if data.len() < self.bytes.len() {
            return false;
        }
        self.bytes
            .iter()
            .zip(self.mask.iter())
            .zip(data.iter())
            .all(|((&pattern_byte, &significant), &data_byte)| {
                !significant || self.byte_eq(pattern_byte, data_byte)
            })
    }

    pub fn find_all_in(&self, data: &[u8]) -> Vec<usize> {
        let mut results = Vec::new();
        if self.bytes.is_empty() || data.len() < self.bytes.len() {
            return results;
        }

        let first_significant = self.mask.iter().position(|&m| m).unwrap_or(0);
        let first_byte = self.bytes[first_significant];

        for i in 0..=(data.len() - self.bytes.len()) {
            if self.byte_eq(data[i + first_significant], first_byte) && self.matches_at(&data[i..]) {
                results.push(i);
            }
        }

        results
    }
}

impl fmt::Display for BytePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: Vec<String> = self
            .bytes
            .iter()
            .zip(self.mask.iter())
            .map(|(b, &m)| if m { format!("{:02X}", b) } else { "??".to_string() })
            .collect();
        write!(f, "{}", hex.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_body_with_wildcards() {
        let pattern = BytePattern::from_hex_body("48 8B ?? 89").unwrap();
        assert_eq!(pattern.len(), 4);
        assert_eq!(pattern.find_all_in(&[0x48, 0x8b, 0xff, 0x89]), vec![0]);
        assert_eq!(pattern.find_all_in(&[0x48, 0x8b, 0x00, 0x88]), Vec::<usize>::new());
    }

    #[test]
    fn test_hex_body_rejects_garbage() {
        assert!(BytePattern::from_hex_body("4G").is_err());
        assert!(BytePattern::from_hex_body("4").is_err());
        assert!(BytePattern::from_hex_body("").is_err());
    }

    #[test]
    fn test_nocase_matching() {
        let pattern = BytePattern::from_bytes(b"MalWare").nocase();
        assert_eq!(pattern.find_all_in(b"xxmalwareyy"), vec![2]);
        let strict = BytePattern::from_bytes(b"MalWare");
        assert!(strict.find_all_in(b"xxmalwareyy").is_empty());
    }

    #[test]
    fn test_widen_layout() {
        let wide = BytePattern::from_bytes(b"hi").widen();
        assert_eq!(wide.len(), 4);
        assert_eq!(wide.find_all_in(b"xh\0i\0x"), vec![1]);
        assert!(wide.find_all_in(b"hi").is_empty());
    }

    #[test]
    fn test_find_all_multiple_occurrences() {
        let pattern = BytePattern::from_bytes(b"ab");
        assert_eq!(pattern.find_all_in(b"ababab"), vec![0, 2, 4]);
    }
}
