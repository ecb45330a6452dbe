//! Bigram map: `"w1@w2" -> joint frequency` (C2).
//!
//! Reference: `original_source/pycseg/data_store.py::BiDictionary`.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// The separator the reference implementation joins bigram keys with.
pub const WORD_SEPARATOR: char = '@';

#[derive(Debug, Default)]
pub struct BigramDict {
    counts: HashMap<String, u64>,
}

impl BigramDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a `bigramDict.dct`-shaped file: `w1@w2<WS>freq` per line.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading bigram file {}", path.display()))?;
        let mut dict = Self::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            if let (Some(key), Some(freq)) = (parts.next(), parts.next()) {
                if let Ok(freq) = freq.parse::<u64>() {
                    dict.counts.insert(key.to_string(), freq);
                }
            }
        }
        tracing::debug!(path = %path.display(), pairs = dict.counts.len(), "loaded bigram dictionary");
        Ok(dict)
    }

    /// Joint frequency of `w1` followed by `w2`, keyed `"w1@w2"`. Missing
    /// entries default to 0 (a lookup miss, not an error — §7).
    pub fn get(&self, w1: &str, w2: &str) -> u64 {
        let key = format!("{w1}{WORD_SEPARATOR}{w2}");
        self.counts.get(&key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
