//! `DataStore` (§4.9 **[AMBIENT]**) and the segmentation/tagging orchestrator
//! (C10, §4.8).
//!
//! Reference: `original_source/pycseg/data_store.py::DataStore.load` and
//! `original_source/pycseg/__init__.py::Pycseg`.

use crate::atomize::{atomize, match_words};
use crate::bigram::BigramDict;
use crate::config::Config;
use crate::dict::Dictionary;
use crate::error::SegmentError;
use crate::hmm_context::Context;
use crate::lattice::Word;
use crate::oov::{self, OovModel};
use crate::pos_tag;
use crate::poscode;
use anyhow::{Context as _, Result};
use std::path::Path;

const SENTENCE_DELIMITERS: &[char] = &['。', '！', '？', '：', '；', '…'];

/// Every dictionary/context artifact the pipeline needs, loaded once and
/// shared read-only (§5) across any number of `Pipeline::process` calls.
#[derive(Debug)]
pub struct DataStore {
    pub core_dict: Dictionary,
    pub bigram_dict: BigramDict,
    pub lexical_ctx: Context,
    pub nr_dict: Dictionary,
    pub nr_ctx: Context,
    pub ns_dict: Dictionary,
    pub ns_ctx: Context,
    pub tr_dict: Dictionary,
    pub tr_ctx: Context,
}

impl DataStore {
    /// Load all nine artifacts from `data_dir`. Fatal on the first missing
    /// or malformed file — no partial load (§7 "Load failure"). `config`
    /// supplies the transition-smoothing weight baked into every loaded
    /// [`Context`] at parse time ([`Config::oov_smoothing`]).
    pub fn load(data_dir: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let dir = data_dir.as_ref();
        let smoothing = config.oov_smoothing;
        let core_dict = Dictionary::load(dir.join("coreDict.dct")).context("loading coreDict.dct")?;
        let bigram_dict = BigramDict::load(dir.join("bigramDict.dct")).context("loading bigramDict.dct")?;
        let lexical_ctx = Context::load(dir.join("lexical.ctx"), smoothing).context("loading lexical.ctx")?;
        let nr_dict = Dictionary::load(dir.join("nr.dct")).context("loading nr.dct")?;
        let nr_ctx = Context::load(dir.join("nr.ctx"), smoothing).context("loading nr.ctx")?;
        let ns_dict = Dictionary::load(dir.join("ns.dct")).context("loading ns.dct")?;
        let ns_ctx = Context::load(dir.join("ns.ctx"), smoothing).context("loading ns.ctx")?;
        let tr_dict = Dictionary::load(dir.join("tr.dct")).context("loading tr.dct")?;
        let tr_ctx = Context::load(dir.join("tr.ctx"), smoothing).context("loading tr.ctx")?;

        tracing::info!(data_dir = %dir.display(), "data store loaded");

        Ok(Self {
            core_dict,
            bigram_dict,
            lexical_ctx,
            nr_dict,
            nr_ctx,
            ns_dict,
            ns_ctx,
            tr_dict,
            tr_ctx,
        })
    }
}

/// `(words, POS-tag strings)`, sentinels already stripped.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProcessResult {
    pub words: Vec<String>,
    pub tags: Vec<String>,
}

/// Owns a loaded [`DataStore`] and exposes the segmentation/tagging entry
/// points. Cheap to construct repeatedly over a shared `Arc<DataStore>` —
/// see §5 for the sharing contract.
pub struct Pipeline {
    store: DataStore,
    config: Config,
}

impl Pipeline {
    pub fn new(store: DataStore) -> Self {
        Self { store, config: Config::default() }
    }

    pub fn with_config(store: DataStore, config: Config) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Split `content` into delimiter-terminated sentences (§6, delimiter
    /// kept on the left sentence) and process each with `K = config.default_k`.
    pub fn process(&self, content: &str) -> Result<ProcessResult, SegmentError> {
        let mut result = ProcessResult::default();
        for sentence in split_sentences(content) {
            let r = self.process_sentence(&sentence, self.config.default_k)?;
            result.words.extend(r.words);
            result.tags.extend(r.tags);
        }
        Ok(result)
    }

    /// Process one sentence with an explicit `K` (the segmenter-test path
    /// uses `K = config.test_k`; the public path always calls through
    /// [`Pipeline::process`], which pins `K = config.default_k`).
    pub fn process_sentence(&self, sentence: &str, k: usize) -> Result<ProcessResult, SegmentError> {
        let mut graph = atomize(sentence);
        match_words(&mut graph, &self.store.core_dict);

        // Empty lattice: no non-sentinel atoms at all (§7).
        if graph.n() <= 2 {
            return Ok(ProcessResult::default());
        }
        tracing::debug!(atoms = graph.n(), "atomized sentence");

        let model = OovModel {
            nr_dct: &self.store.nr_dict,
            nr_ctx: &self.store.nr_ctx,
            tr_dct: &self.store.tr_dict,
            tr_ctx: &self.store.tr_ctx,
            ns_dct: &self.store.ns_dict,
            ns_ctx: &self.store.ns_ctx,
        };
        oov::detect(&mut graph, &self.store.bigram_dict, &self.store.core_dict, &model, &self.config);

        let dag = graph.generate_words_dag(&self.store.bigram_dict, self.config.bigram_smoothing, self.config.max_frequency);
        tracing::debug!(words = dag.len(), "word dag rebuilt after oov detection");
        let candidates = graph.words_segment(&dag, k);

        if candidates.is_empty() {
            return Err(SegmentError::Inconsistent(format!(
                "no path from start to end atom for sentence {sentence:?}"
            )));
        }

        // Open question (§9): the reference initialises the rolling maximum
        // at 0 and only keeps candidates scoring strictly above it, even
        // though the Σlog(trans/start) term can be legitimately negative —
        // reproduced verbatim, not corrected to `f64::NEG_INFINITY`.
        let mut best_score = 0.0_f64;
        let mut best: Option<(Vec<Word>, Vec<i64>)> = None;
        for (_, _, words) in candidates {
            let tags = pos_tag::tag(&words, &self.store.core_dict, &self.store.lexical_ctx, self.config.oov_smoothing);
            let score = compute_possibility(&words, &tags, &self.store.lexical_ctx);
            if score > best_score {
                best_score = score;
                best = Some((words, tags));
            }
        }

        tracing::debug!(score = best_score, "winning candidate scored");

        let Some((words, tags)) = best else {
            // Every candidate scored <= 0 under the rolling-max bug above —
            // a legitimately reachable outcome of §9's open question, not an
            // internal inconsistency.
            return Ok(ProcessResult::default());
        };

        let n = words.len();
        let result = ProcessResult {
            words: words[1..n - 1].iter().map(|w| w.content.clone()).collect(),
            tags: tags[1..n - 1].iter().map(|&t| poscode::decode(t as i32)).collect(),
        };
        Ok(result)
    }

    /// Render as `w/p w/p ...`.
    pub fn format_result(result: &ProcessResult) -> String {
        result
            .words
            .iter()
            .zip(&result.tags)
            .map(|(w, p)| format!("{w}/{p}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `Σ word.weight + Σ_i (log(trans[tag_i][tag_{i+1}]) - log(start[tag_i]))`.
fn compute_possibility(words: &[Word], tags: &[i64], lexical_ctx: &Context) -> f64 {
    let mut poss: f64 = words.iter().map(|w| w.weight).sum();
    for i in 0..tags.len().saturating_sub(1) {
        let trans = lexical_ctx
            .trans_prob()
            .get(&tags[i])
            .and_then(|row| row.get(&tags[i + 1]))
            .copied()
            .unwrap_or(0.0);
        let start = lexical_ctx.start_prob().get(&tags[i]).copied().unwrap_or(0.0);
        poss += trans.max(f64::MIN_POSITIVE).ln() - start.max(f64::MIN_POSITIVE).ln();
    }
    poss
}

/// Split on `。！？：；…`, keeping the delimiter with the sentence to its
/// left. A trailing fragment with no delimiter is kept as its own sentence.
pub fn split_sentences(content: &str) -> Vec<String> {
    let chars: Vec<char> = content.chars().collect();
    let mut results = Vec::new();
    let mut begin = 0;
    for (pos, &c) in chars.iter().enumerate() {
        if SENTENCE_DELIMITERS.contains(&c) {
            results.push(chars[begin..=pos].iter().collect());
            begin = pos + 1;
        }
    }
    if begin < chars.len() {
        results.push(chars[begin..].iter().collect());
    }
    results
}
