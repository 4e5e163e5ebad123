//! Pure core of the Sift tokenizer.
//!
//! This crate is the standalone half of Sift's two-layer architecture:
//! everything here is deterministic, allocation-light, and free of parser
//! and filesystem dependencies, so it can be reused by analysis tools
//! without pulling in the full tokenization pipeline.
//!
//! - **`sift_core`** (this crate): the packed [`AtomToken`] record and its
//!   [`TokenMeta`] word, root-id hashing and casing classification, the
//!   online [`BigramModel`], and the locked vocabulary.
//! - **`sift_tokenize`**: drives an external parse tree through the
//!   segmenter and arena, and persists the vocabulary registry.
//!
//! # Usage
//!
//! ```
//! use sift_core::{casing_of, root_id, Casing};
//!
//! assert_eq!(root_id(b"Tree"), root_id(b"tree"));
//! assert_eq!(casing_of(b"Tree"), Casing::Capitalized);
//! ```

mod bytes;
mod hash;
mod locked;
mod ngram;
mod token;

pub use bytes::{is_fragment_separator, is_space};
pub use hash::{case_fold, casing_of, root_id};
pub use locked::{is_locked, pretrain, LOCKED_VOCAB};
pub use ngram::BigramModel;
pub use token::{AtomToken, Casing, TokenMeta, TokenType};
