//! Append-only token arena with the symbol-eater lookahead.
//!
//! Every token passes through [`TokenArena::push`] on its way out of the
//! pipeline. The push looks ahead in the source for the next
//! non-whitespace byte; if that byte is absorbable punctuation, the
//! corresponding metadata bit is set on the token before it lands. The
//! traversal completes the contract by dropping the punctuation leaf when
//! it sees the bit on the most recent token.

use sift_core::{is_space, AtomToken, TokenMeta};
use tracing::debug;

use crate::registry::Registry;

/// Bounded, append-only sequence of atomic tokens for one source file.
///
/// Capacity is fixed at construction (one slot per source byte is always
/// sufficient, since every token spans at least one byte). Pushes beyond
/// capacity are dropped.
pub struct TokenArena {
    tokens: Vec<AtomToken>,
    capacity: usize,
}

impl TokenArena {
    /// Create an arena holding at most `capacity` tokens.
    pub fn with_capacity(capacity: usize) -> TokenArena {
        TokenArena {
            tokens: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Absorb trailing punctuation into `token`, record its id, append.
    ///
    /// Scans forward from the end of the span over whitespace; if the
    /// first non-whitespace byte is one of `; , ( ) *`, the matching
    /// metadata bit is set. Only that first byte is consulted, so at most
    /// one absorbed-symbol bit is ever set. The token's root id and text
    /// are handed to the registry before the append.
    pub fn push(&mut self, mut token: AtomToken, source: &[u8], registry: &mut Registry) {
        if self.tokens.len() >= self.capacity {
            debug!(offset = token.offset, "arena full; token dropped");
            return;
        }
        let mut next = token.end() as usize;
        while next < source.len() && is_space(source[next]) {
            next += 1;
        }
        if next < source.len() {
            if let Some(flag) = TokenMeta::absorb_flag(source[next]) {
                token.meta.set(flag);
            }
        }
        registry.record(token.root_id, token.text(source));
        self.tokens.push(token);
    }

    /// The most recently pushed token.
    pub fn last(&self) -> Option<&AtomToken> {
        self.tokens.last()
    }

    /// Mutable access to the most recently pushed token. The segmenter
    /// uses this to set the joiner bit after an underscore.
    pub fn last_mut(&mut self) -> Option<&mut AtomToken> {
        self.tokens.last_mut()
    }

    /// Number of tokens pushed so far.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if no tokens have been pushed.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The tokens, in push order.
    pub fn tokens(&self) -> &[AtomToken] {
        &self.tokens
    }
}
