//! EthClip - Address module
//!
//! Detects Ethereum-style addresses and renders them in a canonical form

mod checksum;

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use checksum::to_checksum;

/// Full-string address pattern: `0x` followed by exactly 40 hex digits
static ADDRESS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("address pattern is a valid regex")
});

/// Canonical textual form applied to detected addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMode {
    /// All hex digits lowercased
    #[default]
    Lowercase,
    /// EIP-55 mixed-case checksum
    Checksum,
}

impl NormalizationMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            NormalizationMode::Lowercase => NormalizationMode::Checksum,
            NormalizationMode::Checksum => NormalizationMode::Lowercase,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizationMode::Lowercase => "lowercase",
            NormalizationMode::Checksum => "checksum",
        }
    }

    /// Label used by the tray menu
    pub fn label(&self) -> &'static str {
        match self {
            NormalizationMode::Lowercase => "Lowercase",
            NormalizationMode::Checksum => "Checksum",
        }
    }
}

impl fmt::Display for NormalizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the trimmed text is exactly one address token
pub fn is_address(text: &str) -> bool {
    ADDRESS_PATTERN.is_match(text.trim())
}

/// Render an address in the given mode
///
/// Callers must only pass text accepted by [`is_address`]; surrounding
/// whitespace is dropped.
pub fn normalize(address: &str, mode: NormalizationMode) -> String {
    let address = address.trim();
    match mode {
        NormalizationMode::Lowercase => address.to_ascii_lowercase(),
        NormalizationMode::Checksum => to_checksum(address),
    }
}

/// Normalized form of `text`, or `None` when it is not an address
pub fn normalized(text: &str, mode: NormalizationMode) -> Option<String> {
    if is_address(text) {
        Some(normalize(text, mode))
    } else {
        None
    }
}
