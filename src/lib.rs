//! hanseg
//!
//! A Chinese word segmenter with HMM-based POS tagging and named-entity OOV
//! recognition, modeled after the ICTCLAS/NShort-path approach: dictionary
//! lookup builds a word lattice over a sentence's atoms, bigram weighting
//! and Yen's k-shortest-paths enumerate candidate segmentations, a
//! three-pass HMM detector merges unrecognized person/place names into the
//! lattice, and a final HMM pass assigns part-of-speech tags to the
//! highest-scoring candidate.
//!
//! Public API:
//! - [`DataStore`] / [`DataStore::load`] — load the nine dictionary/context
//!   artifacts a segmentation run needs.
//! - [`Pipeline`] — owns a loaded `DataStore` and exposes
//!   [`Pipeline::process`] / [`Pipeline::process_sentence`] /
//!   [`Pipeline::format_result`].
//! - [`Config`] — the ambient tunables (§6.1); `Config::default()`
//!   reproduces the reference's literal constants exactly.

pub mod poscode;

pub mod trie;

pub mod dict;
pub use dict::Dictionary;

pub mod bigram;
pub use bigram::BigramDict;

pub mod hmm_context;
pub use hmm_context::Context;

pub mod hmm;

pub mod graph;

pub mod lattice;
pub use lattice::{Atom, Word, WordsGraph};

pub mod atomize;

pub mod oov;

pub mod pos_tag;

pub mod pipeline;
pub use pipeline::{DataStore, Pipeline, ProcessResult};

pub mod config;
pub use config::Config;

pub mod error;
pub use error::SegmentError;

/// Small text helpers shared across modules.
pub mod utils;
