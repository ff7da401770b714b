use crate::error::{LtpError, Result};
use std::collections::HashMap;

const SUPPORTED_PAIRS: [(&str, &str); 3] = [
    ("BTC/USD", "XXBTZUSD"),
    ("BTC/EUR", "XXBTZEUR"),
    ("BTC/CHF", "XBTCHF"),
];

/// Bidirectional lookup between canonical pairs ("BTC/USD") and Kraken
/// pair codes ("XXBTZUSD"). Built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct PairTranslator {
    to_upstream: HashMap<String, String>,
    to_canonical: HashMap<String, String>,
}

impl PairTranslator {
    pub fn new() -> Self {
        Self::from_entries(SUPPORTED_PAIRS.iter().copied())
    }

    fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut to_upstream = HashMap::new();
        let mut to_canonical = HashMap::new();
        for (pair, code) in entries {
            to_upstream.insert(pair.to_string(), code.to_string());
            to_canonical.insert(code.to_string(), pair.to_string());
        }
        Self {
            to_upstream,
            to_canonical,
        }
    }

    pub fn to_upstream_code(&self, pair: &str) -> Result<&str> {
        self.to_upstream
            .get(pair)
            .map(String::as_str)
            .ok_or_else(|| LtpError::UnsupportedPair(pair.to_string()))
    }

    pub fn to_canonical_pair(&self, code: &str) -> Result<&str> {
        self.to_canonical
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| LtpError::UnsupportedPair(code.to_string()))
    }

    pub fn supported_pairs(&self) -> impl Iterator<Item = &str> {
        self.to_upstream.keys().map(String::as_str)
    }
}

impl Default for PairTranslator {
    fn default() -> Self {
        Self::new()
    }
}
