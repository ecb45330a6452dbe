//! POS-code encoding.
//!
//! A POS-code packs a 1- or 2-character tag string into a single integer:
//! `code = ord(c1)*256 + (c2 ? ord(c2) : 0)`. The numeric ranges carry
//! different meanings depending on where they fall, so callers should go
//! through [`PosCode`] rather than compare raw integers directly.
//!
//! Reference: `original_source/pycseg/data_store.py::Feature`.

/// A POS-code, tagged by what its numeric value actually means.
///
/// - `code <= 20` is a character-class tag (`CT_*` from atomisation).
/// - `code == 0` means "ambiguous" — aggregate across all POS rows.
/// - `code == 2` means "use the word's own feature" (proper-noun placeholder;
///   the alias carries the real tag via the merged word's `Word::feature`).
/// - everything else (`>= 256`) is an ordinary 1-2 character POS tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PosCode {
    CharClass(i32),
    Ambiguous,
    UseWordFeature,
    Pos(i32),
}

impl PosCode {
    /// Wrap a raw code into its tagged variant.
    pub fn from_raw(code: i32) -> Self {
        match code {
            0 => PosCode::Ambiguous,
            2 => PosCode::UseWordFeature,
            c if c > 0 && c <= 20 => PosCode::CharClass(c),
            c => PosCode::Pos(c),
        }
    }

    /// The raw integer this variant carries, for dictionary-key and
    /// HashMap-key purposes (POS-codes are used directly as keys).
    pub fn raw(self) -> i32 {
        match self {
            PosCode::CharClass(c) => c,
            PosCode::Ambiguous => 0,
            PosCode::UseWordFeature => 2,
            PosCode::Pos(c) => c,
        }
    }

    /// Build a POS-code from a 1- or 2-character tag string, e.g. "nr", "a".
    pub fn encode(tag: &str) -> Self {
        PosCode::Pos(encode(tag))
    }

    /// Decode back to the tag string this code represents.
    pub fn decode(self) -> String {
        decode(self.raw())
    }
}

/// Encode a 1- or 2-character tag string into its raw integer code.
///
/// `encode("a") == 24832`, `encode("ad") == 24932`.
pub fn encode(tag: &str) -> i32 {
    let mut chars = tag.chars();
    let c1 = chars.next();
    let c2 = chars.next();
    match c1 {
        None => 0,
        Some(c1) => match c2 {
            Some(c2) => (c1 as i32) * 256 + (c2 as i32),
            None => (c1 as i32) * 256,
        },
    }
}

/// Decode a raw integer code back into its tag string.
///
/// Bytes below 65 (`'A'`) are dropped — they're the "no second character"
/// filler, not a real letter.
pub fn decode(code: i32) -> String {
    if code < 256 {
        return code.to_string();
    }
    let tag_1 = code / 256;
    let tag_2 = code % 256;
    let mut s = String::new();
    if tag_1 >= 65 {
        if let Some(c) = char::from_u32(tag_1 as u32) {
            s.push(c);
        }
    }
    if tag_2 >= 65 {
        if let Some(c) = char::from_u32(tag_2 as u32) {
            s.push(c);
        }
    }
    s
}
