//! POS tagger (C9): HMM-tag one candidate segmentation's word list.
//!
//! Reference: `original_source/pycseg/pos_tagging.py::generate_hmm_model`/
//! `generate_pos_tags`.

use crate::dict::Dictionary;
use crate::hmm;
use crate::hmm_context::Context;
use crate::lattice::Word;
use crate::poscode;
use std::collections::HashMap;

/// Build the POS-code emission table for `words` against `core_dct`'s rows
/// (keyed by `word.alias`) and `lexical_ctx`, run Viterbi, and return the
/// winning POS-code sequence (raw integers, one per word, in input order).
///
/// Every `(state, alias)` pair is pre-filled with the uniform smoothing
/// floor, then overwritten per dictionary row under that row's own POS —
/// except a row's `pos == 2` ("use the word's own feature"), which resolves
/// to `word.pos` instead (the alias's shared ambiguous-word statistics
/// don't apply; this word already carries its own resolved tag, e.g. from
/// an OOV merge). `smoothing` is the emission-smoothing weight
/// ([`crate::config::Config::oov_smoothing`]).
pub fn tag(words: &[Word], core_dct: &Dictionary, lexical_ctx: &Context, smoothing: f64) -> Vec<i64> {
    let states = lexical_ctx.states().to_vec();
    let total_freq = lexical_ctx.total_freq().max(1) as f64;
    let observations: Vec<String> = words.iter().map(|w| w.alias.clone()).collect();

    let mut emit: HashMap<i64, HashMap<String, f64>> = HashMap::new();

    for word in words {
        for &p in &states {
            emit.entry(p).or_default().entry(word.alias.clone()).or_insert(smoothing / total_freq);
        }

        for entry in core_dct.rows(&word.alias) {
            let resolved_pos = if entry.pos == 2 { word.pos } else { entry.pos };
            let state_freq = lexical_ctx.state_freq(resolved_pos).max(1) as f64;
            let e = (1.0 - smoothing) * (entry.freq as f64 + 0.1) / state_freq + smoothing / total_freq;
            emit.entry(resolved_pos).or_default().insert(word.alias.clone(), e);
        }
    }

    let (_, path) = hmm::viterbi(&observations, &states, lexical_ctx.start_prob(), lexical_ctx.trans_prob(), &emit);
    path
}

/// POS-code sequence rendered as tag strings.
pub fn tag_strings(words: &[Word], core_dct: &Dictionary, lexical_ctx: &Context, smoothing: f64) -> Vec<String> {
    tag(words, core_dct, lexical_ctx, smoothing).into_iter().map(|p| poscode::decode(p as i32)).collect()
}
