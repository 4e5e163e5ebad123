//! Identifier segmentation: structural splits, the locked-word guard, and
//! the entropy split decision.
//!
//! Policy, in order:
//!
//! 1. A locked identifier is emitted whole, canonicalized to lowercase
//!    casing, and used as training data.
//! 2. Otherwise the identifier is trained into the model first, then
//!    scanned left to right. Underscores are unconditional boundaries
//!    (never part of any span; the preceding fragment gets the joiner
//!    bit). A lowercase-to-uppercase transition is an unconditional
//!    camel-case boundary. A transition whose surprise exceeds the
//!    threshold splits only when the left fragment is itself a locked
//!    word, or when both sides are long enough to be worth keeping
//!    (left >= 4 bytes, remainder >= 3); the guard keeps acronyms and
//!    short prefixes from shattering into noise.
//!
//! Only the first fragment inherits the identifier's preceding-space
//! flag; every fragment carries the supplied depth and its own casing.

use sift_core::{casing_of, is_locked, Casing};
use tracing::debug;

use crate::driver::Emitter;

impl Emitter<'_, '_> {
    /// Segment one identifier span into one or more word tokens.
    pub(crate) fn identifier(&mut self, offset: u32, length: u16, depth: u8, pre_space: bool) {
        let text = self.text(offset, length);
        if is_locked(text) {
            // Locked words are canonical: casing is forced to lowercase.
            self.emit_word(offset, length, depth, pre_space, Casing::Lower);
            self.train(text);
            return;
        }

        self.train(text);

        let len = usize::from(length);
        let mut start = 0;
        let mut emitted = 0u32;

        for i in 0..len {
            let current = text[i];

            if current == b'_' {
                if i > start {
                    debug!(
                        at = offset + i as u32,
                        fragment = %String::from_utf8_lossy(&text[start..i]),
                        "underscore split"
                    );
                    self.emit_piece(offset, text, start, i - 1, depth, pre_space, emitted);
                    emitted += 1;
                }
                // The underscore joins whatever was last emitted for this
                // identifier to the fragment that follows it.
                if emitted > 0 {
                    self.mark_joiner();
                }
                start = i + 1;
                continue;
            }

            if i + 1 >= len {
                continue;
            }
            let next = text[i + 1];

            let split = if current.is_ascii_lowercase() && next.is_ascii_uppercase() {
                debug!(
                    at = offset + i as u32,
                    fragment = %String::from_utf8_lossy(&text[start..=i]),
                    "camel-case split"
                );
                true
            } else {
                let surprise = self.surprise(current, next);
                if surprise > self.entropy_threshold() {
                    let left = &text[start..=i];
                    let remainder = len - (i + 1);
                    if is_locked(left) {
                        debug!(
                            at = offset + i as u32,
                            fragment = %String::from_utf8_lossy(left),
                            surprise,
                            "locked-left split"
                        );
                        true
                    } else if left.len() >= 4 && remainder >= 3 {
                        debug!(
                            at = offset + i as u32,
                            fragment = %String::from_utf8_lossy(left),
                            surprise,
                            "entropy split"
                        );
                        true
                    } else {
                        false
                    }
                } else {
                    false
                }
            };

            if split {
                self.emit_piece(offset, text, start, i, depth, pre_space, emitted);
                emitted += 1;
                start = i + 1;
            }
        }

        if start < len {
            self.emit_piece(offset, text, start, len - 1, depth, pre_space, emitted);
        }
    }

    /// Emit `text[start..=last]` as one fragment of the identifier.
    fn emit_piece(
        &mut self,
        offset: u32,
        text: &[u8],
        start: usize,
        last: usize,
        depth: u8,
        pre_space: bool,
        emitted: u32,
    ) {
        let piece = &text[start..=last];
        self.emit_word(
            offset + start as u32,
            piece.len() as u16,
            depth,
            emitted == 0 && pre_space,
            casing_of(piece),
        );
    }
}
