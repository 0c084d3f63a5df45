//! Encoded instruction text.
//!
//! An instruction is a colon-delimited string, `NAME:arg1:arg2:...`. The name
//! is case-insensitive and stored upper-cased; arguments keep their case and
//! are interpreted by each effect or condition.
//!
//! Instructions are split once when loaded and reused for every invocation.
//! Token indices follow the data format: token 0 is the name, token 1 the
//! first argument.
//!
//! ```
//! use enchant_engine::grammar::EncodedInstruction;
//!
//! let ins = EncodedInstruction::parse("potion:SPEED:2:30");
//! assert_eq!(ins.name(), "POTION");
//! assert_eq!(ins.token(1), Some("SPEED"));
//! assert_eq!(ins.u32_or(2, 1), 2);
//! assert_eq!(ins.u32_or(9, 7), 7);
//! assert_eq!(ins.as_str(), "potion:SPEED:2:30");
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Token separator.
pub const DELIMITER: char = ':';

/// A parsed, immutable instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EncodedInstruction {
    raw: String,
    tokens: SmallVec<[String; 6]>,
}

impl EncodedInstruction {
    /// Split raw instruction text into tokens.
    ///
    /// Never fails: empty text yields an instruction with an empty name,
    /// which no registry entry matches.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut tokens: SmallVec<[String; 6]> =
            raw.trim().split(DELIMITER).map(|t| t.trim().to_string()).collect();
        if let Some(name) = tokens.first_mut() {
            *name = name.to_ascii_uppercase();
        }
        Self { raw, tokens }
    }

    /// The original text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Upper-cased instruction name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.tokens.first().map_or("", String::as_str)
    }

    /// Token at `index` (0 is the name).
    #[must_use]
    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// Number of tokens including the name.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name().is_empty()
    }

    /// Numeric token, or `default` when missing or unparseable.
    #[must_use]
    pub fn parse_or<T: FromStr>(&self, index: usize, default: T) -> T {
        self.token(index)
            .and_then(|t| t.parse().ok())
            .unwrap_or(default)
    }

    #[must_use]
    pub fn i64_or(&self, index: usize, default: i64) -> i64 {
        self.parse_or(index, default)
    }

    #[must_use]
    pub fn u32_or(&self, index: usize, default: u32) -> u32 {
        self.parse_or(index, default)
    }

    #[must_use]
    pub fn f64_or(&self, index: usize, default: f64) -> f64 {
        self.token(index)
            .and_then(|t| t.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(default)
    }

    /// Whether the token at `index` equals `keyword`, ignoring case.
    #[must_use]
    pub fn is_keyword(&self, index: usize, keyword: &str) -> bool {
        self.token(index).is_some_and(|t| t.eq_ignore_ascii_case(keyword))
    }
}

impl From<String> for EncodedInstruction {
    fn from(value: String) -> Self {
        Self::parse(value)
    }
}

impl From<&str> for EncodedInstruction {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<EncodedInstruction> for String {
    fn from(value: EncodedInstruction) -> Self {
        value.raw
    }
}

impl std::fmt::Display for EncodedInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
