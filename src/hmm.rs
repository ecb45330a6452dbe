//! Generic discrete Viterbi decoder (C4).
//!
//! Multiplicative (non-log) form, matching `original_source/pycseg/utils/hmm.py`.
//! Long observation sequences can underflow `f64` this way; see design note
//! on floating underflow. This crate's sequences are one sentence's worth of
//! words, which in practice stays well clear of that limit, and the
//! multiplicative form is what the §8.5 test vector pins.
//!
//! The decoder does no smoothing of its own: missing start/transition/
//! emission entries are the caller's responsibility to pre-fill (§4.5
//! contract).

use std::collections::HashMap;
use std::hash::Hash;

/// Run Viterbi over `states` given `observations`, returning the most
/// likely state sequence and its probability.
///
/// `start[s]`, `trans[s][s']`, and `emit[s][o]` are all assumed fully
/// populated by the caller for every `(state, state)` / `(state, obs)` pair
/// that can occur — a missing entry is read as probability `0.0`, not
/// smoothed on the fly here.
pub fn viterbi<S, O>(
    observations: &[O],
    states: &[S],
    start: &HashMap<S, f64>,
    trans: &HashMap<S, HashMap<S, f64>>,
    emit: &HashMap<S, HashMap<O, f64>>,
) -> (f64, Vec<S>)
where
    S: Eq + Hash + Clone,
    O: Eq + Hash,
{
    assert!(!observations.is_empty(), "viterbi requires a non-empty observation sequence");

    let prob_of = |m: &HashMap<S, f64>, s: &S| m.get(s).copied().unwrap_or(0.0);
    let emit_of = |s: &S, o: &O| -> f64 {
        emit.get(s).and_then(|row| row.get(o)).copied().unwrap_or(0.0)
    };

    let mut v: HashMap<S, f64> = HashMap::new();
    let mut path: HashMap<S, Vec<S>> = HashMap::new();

    for s in states {
        v.insert(s.clone(), prob_of(start, s) * emit_of(s, &observations[0]));
        path.insert(s.clone(), vec![s.clone()]);
    }

    for obs in &observations[1..] {
        let mut next_v: HashMap<S, f64> = HashMap::new();
        let mut next_path: HashMap<S, Vec<S>> = HashMap::new();

        for s in states {
            let mut best: Option<(f64, &S)> = None;
            for s0 in states {
                let trans_p = trans.get(s0).map(|row| prob_of(row, s)).unwrap_or(0.0);
                let p = v[s0] * trans_p * emit_of(s, obs);
                if best.map(|(bp, _)| p > bp).unwrap_or(true) {
                    best = Some((p, s0));
                }
            }
            let (best_p, best_prev) = best.expect("states is non-empty");
            next_v.insert(s.clone(), best_p);
            let mut extended = path[best_prev].clone();
            extended.push(s.clone());
            next_path.insert(s.clone(), extended);
        }

        v = next_v;
        path = next_path;
    }

    let (best_state, best_prob) = states
        .iter()
        .map(|s| (s, v[s]))
        .fold(None, |acc: Option<(&S, f64)>, (s, p)| match acc {
            Some((_, bp)) if bp >= p => acc,
            _ => Some((s, p)),
        })
        .expect("states is non-empty");

    (best_prob, path[best_state].clone())
}
