//! Sift tokenization pipeline.
//!
//! Turns C source into a compact stream of 96-bit atomic tokens for a code
//! language model. An external parser supplies the concrete syntax tree;
//! the traversal walks its leaves in source order, identifiers are cut at
//! structural and statistically surprising boundaries, trailing
//! punctuation is folded into token metadata, and every distinct root id
//! is accumulated in a persistent registry across runs.
//!
//! # Usage
//!
//! ```no_run
//! use sift_tokenize::{Registry, Tokenizer, TokenizerConfig};
//!
//! let config = TokenizerConfig::default();
//! let registry = Registry::open(&config.vocab_path)?;
//! let mut tokenizer = Tokenizer::new(registry, config)?;
//!
//! let source = std::fs::read("input.c")?;
//! let arena = tokenizer.tokenize(&source)?;
//! for token in arena.tokens() {
//!     println!("{:08X} {:?}", token.root_id, token.text(&source));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Concurrency
//!
//! The bigram model and the registry accumulate across files by design
//! (online learning, persistent vocabulary), so a [`Tokenizer`] must not
//! tokenize two files concurrently. Callers wanting parallelism across
//! files need one `Tokenizer` per worker, each with its own registry log.

use std::fmt;
use std::path::PathBuf;

use sift_core::{pretrain, BigramModel};
use tracing::debug;
use tree_sitter::{Language, Parser};

mod arena;
mod driver;
mod registry;
mod segment;
mod walk;

pub use arena::TokenArena;
pub use registry::Registry;
pub use sift_core::{AtomToken, Casing, TokenMeta, TokenType};

use driver::Emitter;
use walk::LeafWalker;

/// Tunables of the tokenization pipeline.
///
/// The defaults are the production values; they are plain fields so tools
/// (and tests) can deviate.
#[derive(Clone, Debug)]
pub struct TokenizerConfig {
    /// Surprise score above which an identifier transition may split.
    pub entropy_threshold: f32,
    /// Training passes over the locked vocabulary before any real input.
    pub pretrain_passes: u32,
    /// Leaves longer than this (and not locked) are fragmented as blobs.
    pub blob_threshold: u16,
    /// Location of the append-only vocabulary log.
    pub vocab_path: PathBuf,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig {
            entropy_threshold: 5.0,
            pretrain_passes: 20,
            blob_threshold: 32,
            vocab_path: PathBuf::from("nset_vocab.bin"),
        }
    }
}

/// Everything tokenization accumulates across files: the online bigram
/// model, the persistent registry, the parser, and the config.
///
/// Construct one per process (or per worker) and feed it files one at a
/// time; dropping it closes the registry log.
pub struct Tokenizer {
    model: BigramModel,
    registry: Registry,
    parser: Parser,
    config: TokenizerConfig,
}

impl Tokenizer {
    /// Create a tokenizer owning `registry`, with the bigram model
    /// pre-trained on the locked vocabulary.
    ///
    /// Fails only if the embedded C grammar is rejected by the parser
    /// (an ABI mismatch between `tree-sitter` and `tree-sitter-c`).
    pub fn new(registry: Registry, config: TokenizerConfig) -> Result<Tokenizer, TokenizeError> {
        let mut parser = Parser::new();
        let language: Language = tree_sitter_c::LANGUAGE.into();
        parser
            .set_language(&language)
            .map_err(TokenizeError::Grammar)?;

        let mut model = BigramModel::new();
        pretrain(&mut model, config.pretrain_passes);

        Ok(Tokenizer {
            model,
            registry,
            parser,
            config,
        })
    }

    /// Tokenize one source buffer into an arena of atomic tokens.
    ///
    /// The returned tokens reference `source` by offset, so the buffer
    /// must outlive any use of their text. Model and registry updates
    /// persist into subsequent calls.
    pub fn tokenize(&mut self, source: &[u8]) -> Result<TokenArena, TokenizeError> {
        let tree = self.parser.parse(source, None).ok_or(TokenizeError::Parse)?;
        let mut emitter = Emitter::new(source, &mut self.model, &mut self.registry, &self.config);
        for leaf in LeafWalker::new(&tree) {
            emitter.leaf(&leaf);
        }
        let arena = emitter.into_arena();
        debug!(
            bytes = source.len(),
            tokens = arena.len(),
            vocabulary = self.registry.len(),
            "file tokenized"
        );
        Ok(arena)
    }

    /// The accumulated vocabulary registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The active configuration.
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }
}

/// Failures of the tokenization pipeline proper.
///
/// Source and registry-log I/O happen before a `Tokenizer` exists and
/// surface as `std::io::Error` at the call sites that own the files.
#[derive(Debug)]
pub enum TokenizeError {
    /// The C grammar was rejected by the parser (version mismatch).
    Grammar(tree_sitter::LanguageError),
    /// The parser returned no tree for the buffer.
    Parse,
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizeError::Grammar(e) => write!(f, "loading C grammar: {e}"),
            TokenizeError::Parse => write!(f, "parser returned no tree"),
        }
    }
}

impl std::error::Error for TokenizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TokenizeError::Grammar(e) => Some(e),
            TokenizeError::Parse => None,
        }
    }
}
