//! Char-class atomization and dictionary word matching (C7).
//!
//! Reference: `original_source/pycseg/segment.py::Segment.atom_segment` /
//! `word_match`.

use crate::dict::{Dictionary, Entry};
use crate::lattice::{alias, Word, WordsGraph};
use crate::poscode;
use crate::utils::normalize;

/// Char-type codes from `definitions.py`. `CT_SINGLE`/`CT_INDEX`/`CT_OTHER`
/// are carried over for completeness (ambient supplement, §3) but unused by
/// this crate's atomizer, which only ever emits the six classes below.
pub const CT_SENTENCE_BEGIN: i32 = 1;
pub const CT_SENTENCE_END: i32 = 4;
pub const CT_SINGLE: i32 = 5;
pub const CT_DELIMITER: i32 = 6;
pub const CT_CHINESE: i32 = 7;
pub const CT_LETTER: i32 = 8;
pub const CT_NUM: i32 = 9;
pub const CT_INDEX: i32 = 10;
pub const CT_OTHER: i32 = 17;

const DELIMITERS: &[char] = &[
    '。', '！', '？', '：', '；', '…', ',', '.', '!', '?', ';', ':', '、', '，', '“', '”', '‘',
    '’', '(', ')', '（', '）',
];

/// Classify one already-normalized character.
pub fn char_type(c: char) -> i32 {
    if c.is_ascii_alphabetic() {
        CT_LETTER
    } else if c.is_ascii_digit() {
        CT_NUM
    } else if DELIMITERS.contains(&c) {
        CT_DELIMITER
    } else {
        CT_CHINESE
    }
}

/// Split `sentence` into atoms: NFC-normalize, then walk char by char,
/// merging consecutive runs of the same `CT_LETTER`/`CT_NUM` class into one
/// atom and leaving everything else as its own single-character atom.
/// Brackets the stream with `SENTENCE_BEGIN`/`SENTENCE_END` sentinel atoms.
pub fn atomize(sentence: &str) -> WordsGraph {
    let normalized = normalize(sentence);
    let mut graph = WordsGraph::new();
    graph.append_atom(alias::SENTENCE_BEGIN, CT_SENTENCE_BEGIN);

    let mut pending: Option<(String, i32)> = None;
    for c in normalized.chars() {
        let ct = char_type(c);
        let mergeable = ct == CT_LETTER || ct == CT_NUM;
        if mergeable {
            if let Some((buf, t)) = pending.as_mut() {
                if *t == ct {
                    buf.push(c);
                    continue;
                }
            }
            if let Some((buf, t)) = pending.take() {
                graph.append_atom(buf, t);
            }
            pending = Some((c.to_string(), ct));
        } else {
            if let Some((buf, t)) = pending.take() {
                graph.append_atom(buf, t);
            }
            graph.append_atom(c.to_string(), ct);
        }
    }
    if let Some((buf, t)) = pending.take() {
        graph.append_atom(buf, t);
    }

    graph.append_atom(alias::SENTENCE_END, CT_SENTENCE_END);
    graph
}

/// POS-code resolution for a dictionary match (§4.2): an unambiguous single
/// row keeps that row's own POS; two or more rows (or none) resolve to `0`
/// ("ambiguous").
fn resolve_pos(rows: &[Entry]) -> i64 {
    if rows.len() == 1 {
        rows[0].pos
    } else {
        0
    }
}

/// True for a resolved POS that's actually one of the reserved
/// character-class codes (`CT_*`, 1-20) or the `2` ("use the word's own
/// feature") placeholder — never a real two-character POS tag, which always
/// packs to `>= 256` ([`crate::poscode::encode`]). A match resolving to one
/// of these isn't a usable POS and must be skipped rather than inserted.
fn is_reserved(pos: i64) -> bool {
    pos > 0 && pos < 256
}

/// Populate `graph`'s word spans from `dict`. Every atom position gets at
/// least one outgoing word so the lattice stays fully connected
/// (§8 completeness property):
/// - sentinel atoms match their own dictionary row directly;
/// - a merged `CT_NUM`/`CT_LETTER` run can never descend the trie (atoms
///   are indivisible, see [`crate::trie::Trie::walk_symbols`]), so it
///   always becomes a single OOV word aliased to `未##数`/`未##串`
///   (`m`/`nx`), exactly matching the reference's digit/letter fallback;
/// - everything else is walked through the dictionary trie one atom at a
///   time. Each matched length gets the resolved POS from `resolve_pos`,
///   skipped entirely when that POS falls in the reserved range checked by
///   `is_reserved` — a plain dictionary match can never carry one of those
///   codes as a real tag. If every length at this position is filtered (or
///   none matched at all), the atom still falls back to a bare single-atom
///   word (weight 1) so the position never loses its only outgoing edge.
pub fn match_words(graph: &mut WordsGraph, dict: &Dictionary) {
    let n = graph.n();
    for i in 0..n {
        let (content, ct) = {
            let atom = &graph.atoms[i];
            (atom.content.clone(), atom.char_type)
        };

        match ct {
            CT_SENTENCE_BEGIN | CT_SENTENCE_END => {
                let rows = dict.rows(&content);
                let pos = resolve_pos(rows);
                if is_reserved(pos) {
                    continue;
                }
                let weight: i64 = rows.iter().map(|e| e.freq).sum();
                graph.insert_word(i, i + 1, Word::new(content, pos, (weight as f64).max(1.0)));
            }
            CT_NUM => {
                let weight = dict.get_frequency(alias::OOV_M, 0) as f64;
                let mut w = Word::new(content, poscode::encode("m") as i64, weight.max(1.0));
                w.alias = alias::OOV_M.to_string();
                graph.insert_word(i, i + 1, w);
            }
            CT_LETTER => {
                let weight = dict.get_frequency(alias::OOV_NX, 0) as f64;
                let mut w = Word::new(content, poscode::encode("nx") as i64, weight.max(1.0));
                w.alias = alias::OOV_NX.to_string();
                graph.insert_word(i, i + 1, w);
            }
            _ => {
                let atoms: Vec<String> = (i..n).map(|j| graph.atoms[j].content.clone()).collect();
                let matches = dict.matches(&atoms);
                let mut inserted_any = false;
                for (text, rows) in matches {
                    let pos = resolve_pos(rows);
                    if is_reserved(pos) {
                        continue;
                    }
                    let len = text.chars().count();
                    let weight: i64 = rows.iter().map(|e| e.freq).sum();
                    graph.insert_word(i, i + len, Word::new(text, pos, (weight as f64).max(1.0)));
                    inserted_any = true;
                }
                if !inserted_any {
                    graph.insert_word(i, i + 1, Word::new(content, 0, 1.0));
                }
            }
        }
    }
}
