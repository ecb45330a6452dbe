//! Whole-pipeline property tests (round-trip concatenation, atom stability,
//! lattice completeness, determinism, the ICTCLAS-style end-to-end scenario,
//! and OOV precedence) — the properties a per-module unit test can't see
//! because they only hold once atomization, dictionary matching, OOV
//! detection, and POS tagging are wired together.
//!
//! We don't ship the real ICTCLAS data files (hundreds of megabytes, not
//! part of this crate), so every fixture below is a small hand-written
//! dictionary/context pair, built the same way `src/oov.rs`'s and
//! `src/hmm_context.rs`'s own unit tests build theirs. Style follows
//! `core/tests/ported_ngram_tests.rs`: plain `#[test]` functions, one
//! scenario each, assertions with a message explaining what failed.

use hanseg::atomize::{atomize, match_words};
use hanseg::lattice::alias;
use hanseg::oov::{self, OovModel};
use hanseg::{poscode, BigramDict, Config, Context, DataStore, Dictionary, Pipeline};
use std::path::{Path, PathBuf};

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap_or_else(|e| panic!("writing {name}: {e}"));
}

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hanseg_pipeline_test_{tag}"));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// One state, one transition row, uniform by construction — trivial enough
/// that a context with no real training data still parses and drives
/// Viterbi without panicking (§7 requires at least one state).
fn single_state_ctx_text() -> &'static str {
    "1\n0\n0\n10\n10\n10\n"
}

/// A `DataStore` with just enough content to atomize and POS-tag "你好"
/// unambiguously: two single-char dictionary words, one lexical state, and
/// inert (empty, single-state) OOV contexts so no entity merging happens.
///
/// Takes a caller-chosen `tag` so concurrently-running tests each get their
/// own temp directory — tests run in parallel by default, and two tests
/// writing the same nine files at once would race.
fn minimal_data_store(tag: &str) -> DataStore {
    let dir = temp_dir(tag);
    write(
        &dir,
        "coreDict.dct",
        "始##始 1 0\n末##末 1 0\n你 10 24832\n好 10 24832\n",
    );
    write(&dir, "bigramDict.dct", "");
    write(&dir, "lexical.ctx", "1\n24832\n0\n10\n10\n10\n");
    for name in ["nr.dct", "tr.dct", "ns.dct"] {
        write(&dir, name, "");
    }
    for name in ["nr.ctx", "tr.ctx", "ns.ctx"] {
        write(&dir, name, single_state_ctx_text());
    }
    DataStore::load(&dir, &Config::default()).expect("minimal data store should load")
}

#[test]
fn round_trip_concatenation_preserves_every_input_character() {
    let store = minimal_data_store("round_trip");
    let pipeline = Pipeline::new(store);
    let result = pipeline.process_sentence("你好", pipeline.config().test_k).unwrap();

    let reconstructed: String = result.words.concat();
    assert_eq!(reconstructed, "你好", "every input character must survive into some output token");
    assert_eq!(result.words.len(), result.tags.len(), "one tag per word");
}

#[test]
fn atom_stability_repeated_atomization_is_identical() {
    let first = atomize("你好，世界123abc");
    let second = atomize("你好，世界123abc");
    let contents_eq = first
        .atoms
        .iter()
        .map(|a| a.content.as_str())
        .eq(second.atoms.iter().map(|a| a.content.as_str()));
    assert!(contents_eq, "atomizing the same sentence twice must yield the same atom stream");
}

#[test]
fn lattice_completeness_every_atom_reaches_the_terminal() {
    let mut dict = Dictionary::new();
    dict.insert(alias::SENTENCE_BEGIN, 1, 0);
    dict.insert(alias::SENTENCE_END, 1, 0);
    dict.insert("你", 10, 24832);
    dict.insert("好", 10, 24832);

    let mut graph = atomize("你好");
    match_words(&mut graph, &dict);

    // Every atom position has at least one outgoing word, so the DAG built
    // from them must carry a path from the first atom to the last.
    for i in 0..graph.n() - 1 {
        assert!(
            graph.spans_from(i).next().is_some(),
            "atom {i} has no outgoing word span"
        );
    }

    let bigram = BigramDict::new();
    let config = Config::default();
    let dag = graph.generate_words_dag(&bigram, config.bigram_smoothing, config.max_frequency);
    let paths = graph.words_segment(&dag, 1);
    assert!(!paths.is_empty(), "no path from the first atom to the last — lattice is disconnected");
}

#[test]
fn determinism_process_sentence_is_a_pure_function() {
    let store = minimal_data_store("determinism");
    let pipeline = Pipeline::new(store);
    let a = pipeline.process_sentence("你好", pipeline.config().test_k).unwrap();
    let b = pipeline.process_sentence("你好", pipeline.config().test_k).unwrap();
    assert_eq!(a, b, "processing the same sentence twice must produce the same result");
}

/// Fixture tuned so the OOV HMM's Viterbi path reduces to a per-word
/// argmax: every state in a context shares the same frequency, so the
/// smoothed transition probability comes out identical for every
/// (state, state) pair, and start probabilities are likewise uniform. That
/// leaves emission strength as the only thing distinguishing states at each
/// position, which is what the frequency values below are chosen to pin.
fn uniform_ctx_text(states: &[i64]) -> String {
    let n = states.len();
    let codes: String = states.iter().map(i64::to_string).collect::<Vec<_>>().join(" ");
    let freqs: String = states.iter().map(|_| "10").collect::<Vec<_>>().join(" ");
    let row: String = states.iter().map(|_| "5").collect::<Vec<_>>().join(" ");
    let mut body = format!("{n}\n{codes}\n0\n{}\n{freqs}\n", n * 10);
    for _ in states {
        body.push_str(&row);
        body.push('\n');
    }
    body
}

/// End-to-end stand-in for the ICTCLAS "张华平/nr 北京/ns" scenario: two
/// unrecognized two-character spans, one resolving through the `nr` (person
/// name) pass and one through the `ns` (place name) pass, merged back into
/// the lattice by `oov::detect` in a single call.
#[test]
fn end_to_end_scenario_merges_unknown_person_and_place_names() {
    let dir = temp_dir("entity_scenario");

    let mut core_dict = Dictionary::new();
    core_dict.insert(alias::SENTENCE_BEGIN, 1, 0);
    core_dict.insert(alias::SENTENCE_END, 1, 0);
    for ch in ["张", "三", "到", "北", "京", "。"] {
        core_dict.insert(ch, 10, 24832);
    }

    let mut graph = atomize("张三到北京。");
    match_words(&mut graph, &core_dict);
    // BEGIN, 张, 三, 到, 北, 京, 。, END — one atom per word, no ambiguity.
    assert_eq!(graph.n(), 8);

    let mut nr_dict = Dictionary::new();
    nr_dict.insert("张", 1000, oov::oov_tag_encode('B'));
    nr_dict.insert("三", 1000, oov::oov_tag_encode('E'));
    write(&dir, "nr.ctx", &uniform_ctx_text(&[0, 1, 4]));
    let nr_ctx = Context::load(dir.join("nr.ctx"), 0.1).unwrap();

    let mut ns_dict = Dictionary::new();
    ns_dict.insert("北", 1000, oov::oov_tag_encode('B'));
    ns_dict.insert("京", 1000, oov::oov_tag_encode('D'));
    write(&dir, "ns.ctx", &uniform_ctx_text(&[0, 1, 3]));
    let ns_ctx = Context::load(dir.join("ns.ctx"), 0.1).unwrap();

    let tr_dict = Dictionary::new();
    write(&dir, "tr.ctx", &uniform_ctx_text(&[0]));
    let tr_ctx = Context::load(dir.join("tr.ctx"), 0.1).unwrap();

    let model = OovModel {
        nr_dct: &nr_dict,
        nr_ctx: &nr_ctx,
        tr_dct: &tr_dict,
        tr_ctx: &tr_ctx,
        ns_dct: &ns_dict,
        ns_ctx: &ns_ctx,
    };
    let bigram = BigramDict::new();
    oov::detect(&mut graph, &bigram, &core_dict, &model, &Config::default());

    let person = graph.get_word(1, 3).expect("张三 should have been merged as a single word");
    assert_eq!(person.content, "张三");
    assert_eq!(poscode::decode(person.pos as i32), "nr", "merged person name should carry the nr tag");
    assert_eq!(person.alias, alias::OOV_NR);

    let place = graph.get_word(4, 6).expect("北京 should have been merged as a single word");
    assert_eq!(place.content, "北京");
    assert_eq!(poscode::decode(place.pos as i32), "ns", "merged place name should carry the ns tag");
    assert_eq!(place.alias, alias::OOV_NS);
}

/// OOV precedence (§8, property 10): when two passes' patterns cover the
/// same span, the merge with the strictly lower weight wins, and a later
/// pass that ties the already-installed weight must not replace it.
#[test]
fn oov_precedence_lower_weight_wins_ties_favor_earlier_pass() {
    let mut graph = hanseg::WordsGraph::new();
    graph.append_atom(alias::SENTENCE_BEGIN, 1);
    graph.append_atom("甲", 7);
    graph.append_atom("乙", 7);
    graph.append_atom(alias::SENTENCE_END, 4);

    let seg_index = [(0, 1), (1, 2), (2, 3), (3, 4)];
    let words = vec![
        hanseg::Word::new(alias::SENTENCE_BEGIN, 0, 0.0),
        hanseg::Word::new("甲", 0, 0.0),
        hanseg::Word::new("乙", 0, 0.0),
        hanseg::Word::new(alias::SENTENCE_END, 0, 0.0),
    ];

    let dir = temp_dir("precedence");
    // Uniform start probabilities across roles B/C/D/E so the `nr` pass's
    // "BE" match and the `ns` pass's "BD" match score identically apart
    // from the nr pass's extra `-ln(nr_factor)` prior term.
    write(&dir, "oov.ctx", &uniform_ctx_text(&[1, 2, 3, 4]));
    let ctx = Context::load(dir.join("oov.ctx"), 0.1).unwrap();

    let mut dict = Dictionary::new();
    dict.insert("甲", 100, oov::oov_tag_encode('B'));
    dict.insert("乙", 100, oov::oov_tag_encode('D'));
    dict.insert("乙", 100, oov::oov_tag_encode('E'));

    // nr pass: "BE" over 甲乙, weight = -ln(nr_factor("BE")) + poss.
    oov::generate_oov_words(&mut graph, "nr", "ABEA", &seg_index, &words, &dict, &ctx, alias::OOV_NR);
    let after_nr = graph.get_word(1, 3).expect("nr pass should have merged 甲乙").clone();
    assert_eq!(poscode::decode(after_nr.pos as i32), "nr");

    // ns pass: "BD" over the same span, weight = poss (no prior term) — the
    // identical `poss` by construction makes this strictly lower than the
    // nr pass's weight, so it must replace.
    oov::generate_oov_words(&mut graph, "ns", "ABDA", &seg_index, &words, &dict, &ctx, alias::OOV_NS);
    let after_ns = graph.get_word(1, 3).expect("ns pass should still have a word here").clone();
    assert!(after_ns.weight < after_nr.weight, "the lower-weight ns merge should win over the nr merge");
    assert_eq!(poscode::decode(after_ns.pos as i32), "ns");
    assert_eq!(after_ns.alias, alias::OOV_NS);

    // Repeating the exact same ns pass ties the installed weight exactly —
    // strict `<` must reject it, leaving the first ns merge untouched.
    oov::generate_oov_words(&mut graph, "ns", "ABDA", &seg_index, &words, &dict, &ctx, alias::OOV_NS);
    let after_repeat = graph.get_word(1, 3).unwrap();
    assert_eq!(after_repeat.weight, after_ns.weight, "a tied weight must not replace the earlier merge");
}
