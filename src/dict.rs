//! Core dictionary: trie of words to `(frequency, pos)` rows (C1).
//!
//! Reference: `original_source/pycseg/data_store.py::Dictionary`.

use crate::trie::Trie;
use anyhow::{Context, Result};
use std::path::Path;

/// A single dictionary row: a frequency observed under a given POS-code.
/// `pos == 0` is the aggregate ("any POS") row some loaders add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub freq: i64,
    pub pos: i64,
}

/// `word -> [(freq, pos), ...]` prefix dictionary, loaded from a `.dct`
/// file: one `word freq pos` row per line, multiple rows per word allowed.
#[derive(Debug, Default)]
pub struct Dictionary {
    trie: Trie<Vec<Entry>>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self { trie: Trie::new() }
    }

    /// Load a dictionary from a `.dct` text file (§6 format).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading dictionary file {}", path.display()))?;
        let mut dict = Self::new();
        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let (word, freq, pos) = match (parts.next(), parts.next(), parts.next()) {
                (Some(w), Some(f), Some(p)) => (w, f, p),
                _ => continue,
            };
            let freq: i64 = freq
                .parse()
                .with_context(|| format!("{}:{}: bad frequency {freq:?}", path.display(), lineno + 1))?;
            let pos: i64 = pos
                .parse()
                .with_context(|| format!("{}:{}: bad pos code {pos:?}", path.display(), lineno + 1))?;
            dict.insert(word, freq, pos);
        }
        tracing::debug!(path = %path.display(), "loaded dictionary");
        Ok(dict)
    }

    /// Add one `(freq, pos)` row for `word`.
    pub fn insert(&mut self, word: &str, freq: i64, pos: i64) {
        self.trie
            .get_or_insert_with(word, Vec::new)
            .push(Entry { freq, pos });
    }

    /// All rows stored for `word`, or `&[]` if absent.
    pub fn rows(&self, word: &str) -> &[Entry] {
        self.trie.get(word).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, word: &str) -> bool {
        self.trie.contains(word)
    }

    pub fn longest_prefix(&self, word: &str) -> usize {
        self.trie.longest_prefix(word)
    }

    pub fn longest_key(&self, word: &str) -> usize {
        self.trie.longest_key(word)
    }

    /// `get_frequency(k, p)`: the matching-row sum for `word` under POS `p`,
    /// or the aggregate over every row when `p == 0`.
    pub fn get_frequency(&self, word: &str, pos: i64) -> i64 {
        self.rows(word)
            .iter()
            .filter(|e| pos == 0 || e.pos == 0 || e.pos == pos)
            .map(|e| e.freq)
            .sum()
    }

    /// Walk the trie one atom at a time starting from `atoms[0]`, returning
    /// every prefix that terminates at a valued node as
    /// `(matched_text, rows)`, in order of increasing length.
    ///
    /// Reference: `Dictionary.matches` in `data_store.py`.
    pub fn matches<S: AsRef<str>>(&self, atoms: &[S]) -> Vec<(String, &[Entry])> {
        self.trie
            .walk_symbols(atoms)
            .into_iter()
            .map(|(len, rows)| {
                let text: String = atoms[..len].iter().map(|a| a.as_ref()).collect();
                (text, rows.as_slice())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_frequency_aggregates_or_filters() {
        let mut d = Dictionary::new();
        d.insert("镇", 10, 100);
        d.insert("镇", 5, 200);
        assert_eq!(d.get_frequency("镇", 0), 15);
        assert_eq!(d.get_frequency("镇", 100), 10);
        assert_eq!(d.get_frequency("镇", 999), 0);
    }

    #[test]
    fn matches_walks_one_atom_at_a_time() {
        let mut d = Dictionary::new();
        d.insert("北", 5, 1);
        d.insert("北京", 20, 2);
        d.insert("北京大学", 8, 3);
        let atoms = vec!["北".to_string(), "京".to_string(), "大".to_string(), "学".to_string()];
        let m = d.matches(&atoms);
        let words: Vec<&str> = m.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["北", "北京", "北京大学"]);
    }

    #[test]
    fn load_parses_word_freq_pos_lines() {
        let tmp = std::env::temp_dir().join("hanseg_dict_test.dct");
        std::fs::write(&tmp, "北京 20 8756\n北京 5 0\n").unwrap();
        let d = Dictionary::load(&tmp).unwrap();
        assert_eq!(d.get_frequency("北京", 0), 25);
        let _ = std::fs::remove_file(tmp);
    }
}
