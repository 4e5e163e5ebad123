//! Per-leaf dispatch: the bridge from parse-tree leaves to atomic tokens.
//!
//! [`Emitter`] holds everything one file's tokenization touches (the
//! source buffer, the arena, and borrows of the process-wide model and
//! registry) and classifies each leaf the walker yields:
//!
//! 1. **Eaten skip**: a leaf whose first byte was already absorbed into
//!    the previous token's metadata is dropped.
//! 2. **Identifier**: any node type containing `identifier` goes to the
//!    segmenter (see `segment.rs`), unless the leaf sits inside a blob
//!    container. A macro name inside a `#define` line is blob material,
//!    not an identifier, so `define` in a directive never hits the
//!    locked-word short-circuit.
//! 3. **Blob**: leaves inside a directive or string container, comments,
//!    preprocessor leaves, and long unlocked spans are fragmented on
//!    whitespace/punctuation runs.
//! 4. **Default**: a single token, numeric if the span starts with a
//!    digit.

use sift_core::{
    is_fragment_separator, is_locked, is_space, root_id, AtomToken, BigramModel, Casing,
    TokenMeta, TokenType,
};

use crate::arena::TokenArena;
use crate::registry::Registry;
use crate::walk::Leaf;
use crate::TokenizerConfig;

/// Node kinds dispatched to the blob splitter by exact name.
const COMMENT: &str = "comment";
const STRING_LITERAL: &str = "string_literal";
/// Prefix matching every preprocessor node kind.
const PREPROC_PREFIX: &str = "preproc";

/// Token emission state for a single source buffer.
pub(crate) struct Emitter<'src, 'st> {
    source: &'src [u8],
    arena: TokenArena,
    model: &'st mut BigramModel,
    registry: &'st mut Registry,
    entropy_threshold: f32,
    blob_threshold: usize,
}

impl<'src, 'st> Emitter<'src, 'st> {
    pub(crate) fn new(
        source: &'src [u8],
        model: &'st mut BigramModel,
        registry: &'st mut Registry,
        config: &TokenizerConfig,
    ) -> Emitter<'src, 'st> {
        Emitter {
            source,
            arena: TokenArena::with_capacity(source.len()),
            model,
            registry,
            entropy_threshold: config.entropy_threshold,
            blob_threshold: usize::from(config.blob_threshold),
        }
    }

    pub(crate) fn into_arena(self) -> TokenArena {
        self.arena
    }

    /// Classify and emit one leaf.
    pub(crate) fn leaf(&mut self, leaf: &Leaf) {
        let start = leaf.start as usize;
        let first = self.source[start];

        // Symbol-eater skip: the previous token already owns this byte.
        if let Some(previous) = self.arena.last() {
            if previous.meta.absorbs(first) {
                return;
            }
        }

        let source = self.source;
        let depth = (leaf.depth & 0b111) as u8;
        let before = start.checked_sub(1).map(|i| source[i]);
        let pre_space = before.is_some_and(|b| is_space(b) && b != b'\n');
        let pre_break = before == Some(b'\n');
        let text = &source[start..start + leaf.len()];

        if leaf.kind.contains("identifier") && !leaf.in_blob {
            self.identifier(leaf.start, clamp_len(leaf.len()), depth, pre_space);
        } else if leaf.in_blob
            || leaf.kind == COMMENT
            || leaf.kind == STRING_LITERAL
            || leaf.kind.starts_with(PREPROC_PREFIX)
            || (leaf.len() > self.blob_threshold && !is_locked(text))
        {
            self.blob(leaf.start, leaf.len(), depth);
        } else {
            let ty = if first.is_ascii_digit() {
                TokenType::Numeric
            } else {
                TokenType::Word
            };
            let mut meta = TokenMeta::EMPTY.with_token_type(ty).with_depth(depth);
            if pre_space {
                meta.set(TokenMeta::PRE_SPACE);
            }
            if pre_break {
                meta.set(TokenMeta::PRE_BREAK);
            }
            self.push_span(leaf.start, clamp_len(leaf.len()), meta);
        }
    }

    /// Fragment a blob on runs of whitespace/punctuation and emit each
    /// fragment as a string-class token at the given depth.
    ///
    /// Fragments bypass the identifier processor entirely: no locked-word
    /// short-circuit, no segmentation, no casing. Absorption still applies
    /// to each fragment on push, as for any other token.
    fn blob(&mut self, offset: u32, len: usize, depth: u8) {
        let start = offset as usize;
        let source = self.source;
        let bytes = &source[start..start + len];
        let mut fragment_start = 0;
        for (i, &byte) in bytes.iter().enumerate() {
            if is_fragment_separator(byte) {
                if i > fragment_start {
                    self.emit_fragment(offset + fragment_start as u32, i - fragment_start, depth);
                }
                fragment_start = i + 1;
            }
        }
        if fragment_start < len {
            self.emit_fragment(offset + fragment_start as u32, len - fragment_start, depth);
        }
    }

    fn emit_fragment(&mut self, offset: u32, len: usize, depth: u8) {
        let meta = TokenMeta::EMPTY
            .with_token_type(TokenType::Fragment)
            .with_depth(depth);
        self.push_span(offset, clamp_len(len), meta);
    }

    /// Emit a word-class token with its casing computed from the span.
    pub(crate) fn emit_word(
        &mut self,
        offset: u32,
        length: u16,
        depth: u8,
        pre_space: bool,
        casing: Casing,
    ) {
        let mut meta = TokenMeta::EMPTY
            .with_token_type(TokenType::Word)
            .with_casing(casing)
            .with_depth(depth);
        if pre_space {
            meta.set(TokenMeta::PRE_SPACE);
        }
        self.push_span(offset, length, meta);
    }

    /// Set the joiner bit on the most recently emitted token.
    pub(crate) fn mark_joiner(&mut self) {
        if let Some(previous) = self.arena.last_mut() {
            previous.meta.set(TokenMeta::HAS_JOINER);
        }
    }

    /// A span of the source, with a lifetime independent of `self`.
    pub(crate) fn text(&self, offset: u32, length: u16) -> &'src [u8] {
        let start = offset as usize;
        &self.source[start..start + usize::from(length)]
    }

    pub(crate) fn train(&mut self, text: &[u8]) {
        self.model.train(text);
    }

    pub(crate) fn surprise(&self, first: u8, second: u8) -> f32 {
        self.model.surprise(first, second)
    }

    pub(crate) fn entropy_threshold(&self) -> f32 {
        self.entropy_threshold
    }

    fn push_span(&mut self, offset: u32, length: u16, meta: TokenMeta) {
        let token = AtomToken {
            root_id: root_id(self.text(offset, length)),
            offset,
            length,
            meta,
        };
        self.arena.push(token, self.source, self.registry);
    }
}

/// Span lengths are stored as `u16`; pathological fragments saturate.
fn clamp_len(len: usize) -> u16 {
    u16::try_from(len).unwrap_or(u16::MAX)
}
