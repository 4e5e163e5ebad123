//! The locked vocabulary: words that bypass segmentation.
//!
//! C keywords, preprocessor directive names, a handful of libc and
//! fixed-width typedef names, and a curated set of domain nouns. Membership
//! is case-insensitive; the segmenter emits a locked word as a single
//! canonicalized token no matter what the entropy model thinks of its
//! interior.
//!
//! The list also seeds the bigram model: [`pretrain`] runs several passes
//! over it before any real input so that ordinary English/C transitions do
//! not look surprising to a cold model.

use crate::ngram::BigramModel;

/// Longest word the membership test will consider. Anything at or past
/// this length is definitionally not locked.
const MAX_LOCKED_LEN: usize = 64;

/// Reserved words, sorted by their case-folded byte representation for
/// binary search. Stored pre-folded.
pub const LOCKED_VOCAB: &[&str] = &[
    "auto", "bool", "break", "buffer", "case", "char", "const", "continue", "count", "cursor",
    "data", "default", "define", "do", "double", "else", "endif", "enum", "extern", "false",
    "file", "float", "for", "free", "goto", "if", "ifdef", "ifndef", "include", "int", "length",
    "long", "malloc", "node", "null", "offset", "parser", "path", "printf", "register", "return",
    "root", "short", "signed", "size_t", "sizeof", "static", "struct", "switch", "tree", "true",
    "typedef", "uint16_t", "uint32_t", "uint8_t", "union", "unsigned", "void", "volatile",
    "while",
];

/// Case-insensitive membership test against the locked vocabulary.
///
/// Folds the candidate into a fixed stack buffer (words of length >= 64
/// are rejected outright) and binary-searches the sorted list.
pub fn is_locked(word: &[u8]) -> bool {
    if word.len() >= MAX_LOCKED_LEN {
        return false;
    }
    let mut buf = [0u8; MAX_LOCKED_LEN];
    for (dst, &src) in buf.iter_mut().zip(word) {
        *dst = src.to_ascii_lowercase();
    }
    let folded = &buf[..word.len()];
    LOCKED_VOCAB
        .binary_search_by(|probe| probe.as_bytes().cmp(folded))
        .is_ok()
}

/// Seed `model` with `passes` training passes over the locked vocabulary.
///
/// Each word is trained independently; no cross-word transitions are
/// recorded.
pub fn pretrain(model: &mut BigramModel, passes: u32) {
    for _ in 0..passes {
        for word in LOCKED_VOCAB {
            model.train(word.as_bytes());
        }
    }
}
