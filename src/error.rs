//! The one place this crate defines its own error type (§7 **[AMBIENT]**).
//!
//! Everything else — data-file loading, malformed `.dct`/`.ctx` files — is
//! `anyhow::Result`, matching the teacher's own mix of bare `anyhow::Result`
//! and one-off concrete error types per module (`userdict.rs` has its own
//! `redb::Error`-flavoured API; `ngram.rs`/`interpolation.rs` use anyhow).
//! A load failure has no useful "caller can recover" story, but a
//! degenerate-graph failure inside `process_sentence` is a distinct,
//! nameable condition worth matching on.

use std::fmt;

/// An internal-inconsistency diagnostic: the k-shortest-paths search could
/// not reach the terminal atom from the start, which §7 calls "should be
/// impossible after matcher fallback to single-atom words" — surfaced
/// rather than panicked on, since a caller may want to log and skip the
/// offending sentence instead of aborting a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    Inconsistent(String),
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentError::Inconsistent(msg) => write!(f, "segmentation lattice inconsistency: {msg}"),
        }
    }
}

impl std::error::Error for SegmentError {}
