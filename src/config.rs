//! Ambient configuration (§6.1 **[AMBIENT]**), grounded in the teacher's
//! `lib.rs::Config` (`load_toml`/`save_toml`/`from_toml_str`/`to_toml_string`
//! shape), trimmed to this domain's five tunables.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The distilled spec's literal constants, threaded through as real
/// parameters instead of scattered as magic numbers through
/// `lattice.rs`/`hmm_context.rs`/`oov.rs`/`pos_tag.rs`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// The emission-smoothing weight shared by [`crate::oov::oov_tagging`],
    /// [`crate::pos_tag::tag`], and [`crate::hmm_context::Context::load`]'s
    /// transition smoothing (§4.6) — the reference hardcodes this same
    /// `0.1` at all three sites as `smoothing_param`.
    pub oov_smoothing: f64,
    /// The `a` weight in [`crate::lattice::calculate_bigram_weight`] (§4.3).
    pub bigram_smoothing: f64,
    /// `MAX_FREQUENCE` — the frequency-normalising constant passed into
    /// [`crate::lattice::calculate_bigram_weight`] (§4.3).
    pub max_frequency: f64,
    /// `K` for `Pipeline::process`'s public path (§4.8).
    pub default_k: usize,
    /// `K` for the segmenter-test path (§4.8).
    pub test_k: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oov_smoothing: 0.1,
            bigram_smoothing: 0.1,
            max_frequency: crate::lattice::MAX_FREQUENCE,
            default_k: 1,
            test_k: 3,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("reading config file {}: {e}", path.as_ref().display()))?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
