//! Atom/word lattice: the shared structure atomization, OOV detection, and
//! path search all build on top of (C6).
//!
//! Reference: `original_source/pycseg/data_store.py::Atom`, `Word`,
//! `AtomsDAG`, `WordsDAG`, `WordsGraph`, and `calculate_bigram_weight`.

use crate::bigram::BigramDict;
use crate::graph::Graph;
use std::collections::HashMap;

/// Sentinel and OOV alias words. `definitions.py` in the original carries
/// more alias constants than the distilled dictionary-matching/OOV passes
/// actually consume (`T`/`NT`/`NZ` have no current caller) — kept here as a
/// complete set since a later OOV pass may want them, per §3 [SUPPLEMENT].
pub mod alias {
    pub const SENTENCE_BEGIN: &str = "始##始";
    pub const SENTENCE_END: &str = "末##末";
    pub const OOV_NR: &str = "未##人";
    pub const OOV_NS: &str = "未##地";
    pub const OOV_NX: &str = "未##串";
    pub const OOV_M: &str = "未##数";
    pub const OOV_T: &str = "未##时";
    pub const OOV_NT: &str = "未##它";
    pub const OOV_NZ: &str = "未##团";
}

/// `MAX_FREQUENCE` from `definitions.py`: the frequency normalising constant
/// baked into `calculate_bigram_weight`.
pub const MAX_FREQUENCE: f64 = 2_079_997.0;

/// The smallest indivisible unit of a sentence: one Han character,
/// punctuation mark, or an already-merged run of ASCII letters/digits.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub content: String,
    pub char_type: i32,
}

/// A candidate word spanning one or more atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub content: String,
    /// Raw packed POS code, or an OOV role code while still mid-detection.
    pub pos: i64,
    /// Bigram-chain weight. Starts as the raw dictionary frequency for a
    /// word matched directly off the atom stream, and is overwritten with
    /// the `-log` chained score by [`WordsGraph::generate_words_dag`].
    pub weight: f64,
    /// The lexical form used for POS-tag HMM lookups — equal to `content`
    /// except for OOV words, which alias to one of the `alias` constants
    /// above so they observe the same dictionary/context rows as every
    /// other instance of that entity class.
    pub alias: String,
}

impl Word {
    pub fn new(content: impl Into<String>, pos: i64, weight: f64) -> Self {
        let content = content.into();
        Self { alias: content.clone(), content, pos, weight }
    }
}

/// A packed `(left, right)` atom-boundary pair, used both as a word-node id
/// in the bigram-weighted DAG and as the edge-removal key in Yen's search.
/// `pack`/`unpack` preserve the reference implementation's
/// `l*(n+1)+r` encoding (see design note on packed indices) while giving
/// call sites a named struct instead of bare arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedEdge {
    pub l: usize,
    pub r: usize,
}

impl PackedEdge {
    pub fn pack(self, n: usize) -> usize {
        index_encode(self.l, self.r, n)
    }

    pub fn unpack(idx: usize, n: usize) -> Self {
        let (l, r) = index_decode(idx, n);
        Self { l, r }
    }
}

pub fn index_encode(l: usize, r: usize, n: usize) -> usize {
    l * (n + 1) + r
}

pub fn index_decode(idx: usize, n: usize) -> (usize, usize) {
    (idx / (n + 1), idx % (n + 1))
}

/// `weight = -log(a*(1+prev_weight)/(max_frequency+80000) + (1-a)*((1-d)*bi_freq/(prev_weight+1) + d))`,
/// with `a = bigram_smoothing`, `d = 1/max_frequency`. Ported verbatim from
/// `data_store.py::calculate_bigram_weight`, with `a`/`MAX_FREQUENCE` taken
/// as parameters ([`crate::config::Config::bigram_smoothing`] /
/// [`crate::config::Config::max_frequency`]) instead of hardcoded.
pub fn calculate_bigram_weight(prev_weight: f64, bi_freq: u64, bigram_smoothing: f64, max_frequency: f64) -> f64 {
    let d = 1.0 / max_frequency;
    let term1 = bigram_smoothing * (1.0 + prev_weight) / (max_frequency + 80_000.0);
    let term2 = (1.0 - bigram_smoothing) * ((1.0 - d) * bi_freq as f64 / (prev_weight + 1.0) + d);
    -(term1 + term2).ln()
}

/// The atom stream plus every candidate word recognised over it, keyed by
/// the atom-index span it covers: `words[left][right]`.
#[derive(Debug, Default)]
pub struct WordsGraph {
    pub atoms: Vec<Atom>,
    words: HashMap<usize, HashMap<usize, Word>>,
}

impl WordsGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_atom(&mut self, content: impl Into<String>, char_type: i32) -> usize {
        self.atoms.push(Atom { content: content.into(), char_type });
        self.atoms.len() - 1
    }

    pub fn n(&self) -> usize {
        self.atoms.len()
    }

    pub fn insert_word(&mut self, left: usize, right: usize, word: Word) {
        self.words.entry(left).or_default().insert(right, word);
    }

    pub fn get_word(&self, left: usize, right: usize) -> Option<&Word> {
        self.words.get(&left).and_then(|row| row.get(&right))
    }

    pub fn get_word_mut(&mut self, left: usize, right: usize) -> Option<&mut Word> {
        self.words.get_mut(&left).and_then(|row| row.get_mut(&right))
    }

    /// Every span starting at `left`, as `(right, &Word)`.
    pub fn spans_from(&self, left: usize) -> impl Iterator<Item = (usize, &Word)> {
        self.words.get(&left).into_iter().flat_map(|row| row.iter().map(|(&r, w)| (r, w)))
    }

    /// Replace the bigram-chain weight of each word-span, and return the
    /// fully-weighted word-to-word DAG ready for [`crate::graph::yen_ksp`].
    ///
    /// Spans are a topological order by construction (`left < right`
    /// always), so processing them in order of increasing `right` boundary
    /// guarantees every predecessor span is already resolved. A span's own
    /// `weight` becomes the *minimum* over all edges into it (the single
    /// best-scoring predecessor, chained Viterbi-style) — but every
    /// predecessor edge, not just the winning one, is still recorded in the
    /// returned DAG, so k-shortest-paths search can recover alternate
    /// segmentations through non-winning predecessors.
    pub fn generate_words_dag(&mut self, bigram: &BigramDict, bigram_smoothing: f64, max_frequency: f64) -> Graph<usize> {
        let n = self.n();
        let mut dag: Graph<usize> = Graph::new();

        let mut spans: Vec<(usize, usize)> = self
            .words
            .iter()
            .flat_map(|(&l, row)| row.keys().copied().map(move |r| (l, r)))
            .collect();
        spans.sort_by_key(|&(_, r)| r);

        for (l, r) in spans {
            if l == 0 {
                // Sentence root: no predecessor, keep the seed weight the
                // matcher already assigned (the word's raw frequency).
                continue;
            }

            let this_content = self.words[&l][&r].content.clone();

            let predecessors: Vec<(usize, String, f64)> = self
                .words
                .iter()
                .filter_map(|(&pl, row)| row.get(&l).map(|w| (pl, w.content.clone(), w.weight)))
                .collect();

            let mut best: Option<f64> = None;
            for (pl, prev_content, prev_weight) in predecessors {
                let bi_freq = bigram.get(&prev_content, &this_content);
                let weight = calculate_bigram_weight(prev_weight, bi_freq, bigram_smoothing, max_frequency);
                let from = PackedEdge { l: pl, r: l }.pack(n);
                let to = PackedEdge { l, r }.pack(n);
                dag.entry(from).or_default().insert(to, weight);
                best = Some(best.map_or(weight, |b: f64| b.min(weight)));
            }

            if let Some(w) = best {
                if let Some(word) = self.words.get_mut(&l).and_then(|m| m.get_mut(&r)) {
                    word.weight = w;
                }
            }
        }

        dag
    }

    /// The `k` lowest-cost segmentations of the whole atom stream, each as
    /// `(total weight, atom-boundary spans, words)` left-to-right,
    /// including the sentence begin/end sentinels.
    ///
    /// Assumes atom 0 is `SENTENCE_BEGIN` and atom `n-1` is `SENTENCE_END`,
    /// each matched as a length-1 word — true by construction for every
    /// atom stream produced by [`crate::atomize::atomize`].
    pub fn words_segment(&self, dag: &Graph<usize>, k: usize) -> Vec<(f64, Vec<(usize, usize)>, Vec<Word>)> {
        let n = self.n();
        if n < 2 {
            return Vec::new();
        }
        let src = PackedEdge { l: 0, r: 1 }.pack(n);
        let dst = PackedEdge { l: n - 1, r: n }.pack(n);

        crate::graph::yen_ksp(dag, &src, &dst, k)
            .into_iter()
            .filter_map(|(node_path, cost)| {
                let spans: Vec<(usize, usize)> =
                    node_path.iter().map(|&idx| { let e = PackedEdge::unpack(idx, n); (e.l, e.r) }).collect();
                let words: Option<Vec<Word>> =
                    spans.iter().map(|&(l, r)| self.get_word(l, r).cloned()).collect();
                words.map(|w| (cost, spans, w))
            })
            .collect()
    }

    /// Reconstruct the literal surface text spanning atoms `[left, right)`.
    pub fn text_span(&self, left: usize, right: usize) -> String {
        self.atoms[left..right].iter().map(|a| a.content.as_str()).collect()
    }
}
