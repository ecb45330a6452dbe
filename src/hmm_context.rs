//! HMM context: smoothed start/transition probabilities over a fixed state
//! set, loaded from a `.ctx` file (C3).
//!
//! Reference: `original_source/pycseg/data_store.py::Context`. States are
//! represented as `i64` since every context in this crate keys on either a
//! packed POS code ([`crate::poscode`]) or an OOV role code
//! ([`crate::oov::oov_tag_decode`]) — both plain integers.

use anyhow::{bail, Context as _, Result};
use std::collections::HashMap;
use std::path::Path;

/// A loaded, fully-smoothed HMM context: states, their observed
/// frequencies, add-one-smoothed start probabilities, and smoothed
/// transition probabilities.
#[derive(Debug, Default, Clone)]
pub struct Context {
    states: Vec<i64>,
    total_freq: i64,
    state_freq: HashMap<i64, i64>,
    start_prob: HashMap<i64, f64>,
    trans_prob: HashMap<i64, HashMap<i64, f64>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the reference six-part `.ctx` text format:
    /// 1. state count `n`
    /// 2. the `n` state codes
    /// 3. a reserved line (ignored)
    /// 4. total frequency across all states
    /// 5. per-state frequency, `n` values in the same order as line 2
    /// 6. `n` further lines, each `n` transition counts for that state's row
    ///
    /// `transition_smoothing` is the interpolation weight between the
    /// per-state MLE transition estimate and the unigram state-frequency
    /// fallback ([`crate::config::Config::oov_smoothing`] — the reference
    /// hardcodes this same `0.1` at every HMM smoothing site in the crate).
    pub fn load(path: impl AsRef<Path>, transition_smoothing: f64) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading context file {}", path.display()))?;
        let mut lines = content.lines();

        let n: usize = lines
            .next()
            .with_context(|| format!("{}: missing state-count line", path.display()))?
            .trim()
            .parse()
            .with_context(|| format!("{}: bad state-count line", path.display()))?;

        let states: Vec<i64> = lines
            .next()
            .with_context(|| format!("{}: missing state-code line", path.display()))?
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .with_context(|| format!("{}: bad state-code line", path.display()))?;
        if states.len() != n {
            bail!("{}: expected {n} states, found {}", path.display(), states.len());
        }

        let _reserved = lines
            .next()
            .with_context(|| format!("{}: missing reserved line", path.display()))?;

        let total_freq: i64 = lines
            .next()
            .with_context(|| format!("{}: missing total-frequency line", path.display()))?
            .trim()
            .parse()
            .with_context(|| format!("{}: bad total-frequency line", path.display()))?;

        let freqs: Vec<i64> = lines
            .next()
            .with_context(|| format!("{}: missing per-state frequency line", path.display()))?
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .with_context(|| format!("{}: bad per-state frequency line", path.display()))?;
        if freqs.len() != n {
            bail!("{}: expected {n} frequencies, found {}", path.display(), freqs.len());
        }

        let state_freq: HashMap<i64, i64> =
            states.iter().copied().zip(freqs.iter().copied()).collect();

        let start_prob: HashMap<i64, f64> = states
            .iter()
            .copied()
            .zip(freqs.iter().copied())
            .map(|(s, f)| (s, (f as f64 + 1.0) / (total_freq as f64 + n as f64)))
            .collect();

        let mut trans_prob: HashMap<i64, HashMap<i64, f64>> = HashMap::new();
        for (i, &s) in states.iter().enumerate() {
            let counts: Vec<i64> = lines
                .next()
                .with_context(|| format!("{}: missing transition row {i}", path.display()))?
                .split_whitespace()
                .map(str::parse)
                .collect::<Result<_, _>>()
                .with_context(|| format!("{}: bad transition row {i}", path.display()))?;
            if counts.len() != n {
                bail!("{}: transition row {i} has {} entries, expected {n}", path.display(), counts.len());
            }
            let freq_i = freqs[i];
            let mut row = HashMap::new();
            for (j, &s2) in states.iter().enumerate() {
                let p = if freq_i == 0 {
                    0.0
                } else {
                    (1.0 - transition_smoothing) * counts[j] as f64 / freq_i as f64
                        + transition_smoothing * freq_i as f64 / total_freq as f64
                };
                row.insert(s2, p);
            }
            trans_prob.insert(s, row);
        }

        tracing::debug!(path = %path.display(), states = n, "loaded hmm context");

        Ok(Self {
            states,
            total_freq,
            state_freq,
            start_prob,
            trans_prob,
        })
    }

    pub fn states(&self) -> &[i64] {
        &self.states
    }

    pub fn start_prob(&self) -> &HashMap<i64, f64> {
        &self.start_prob
    }

    pub fn trans_prob(&self) -> &HashMap<i64, HashMap<i64, f64>> {
        &self.trans_prob
    }

    pub fn state_freq(&self, state: i64) -> i64 {
        self.state_freq.get(&state).copied().unwrap_or(0)
    }

    pub fn total_freq(&self) -> i64 {
        self.total_freq
    }

    /// Invert a smoothed probability back into an equivalent frequency
    /// count, over the add-one-smoothed total `total_freq + states.len()`.
    pub fn prob_to_frequence(&self, prob: f64) -> f64 {
        prob * (self.total_freq as f64 + self.states.len() as f64)
    }
}
