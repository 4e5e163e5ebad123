//! Preorder leaf traversal of the external parse tree.
//!
//! The tokenizer only consumes leaves (nodes with zero children) in
//! source order, together with the nesting depth at which each was found.
//! [`LeafWalker`] wraps the parser's tree cursor (first-child /
//! next-sibling / parent moves) as a lazy iterator of [`Leaf`] values, so
//! the dispatcher is a plain `for` loop. The traversal is finite and
//! non-restartable per tree.
//!
//! The grammar decomposes `#define` lines and string literals into child
//! leaves (the macro name arrives as its own `identifier` leaf, string
//! text as `string_content`). Those leaves are still blob material: the
//! walker counts enclosing blob containers and flags every leaf found
//! inside one, so the dispatcher never routes them through the
//! identifier processor.

use tree_sitter::{Tree, TreeCursor};

/// Node kinds whose entire textual content is blob material, including
/// nested identifier leaves: preprocessor directive lines and string
/// literals. Conditional preprocessor nodes (`preproc_if`,
/// `preproc_ifdef`, ...) are excluded; their children are ordinary code.
fn is_blob_container(kind: &str) -> bool {
    matches!(
        kind,
        "preproc_def"
            | "preproc_function_def"
            | "preproc_include"
            | "preproc_undef"
            | "preproc_call"
            | "string_literal"
    )
}

/// One zero-child node of the parse tree.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Leaf {
    /// Start byte offset in the source.
    pub start: u32,
    /// End byte offset (exclusive).
    pub end: u32,
    /// The parser's type name for the node (e.g. `identifier`, `comment`,
    /// `preproc_arg`, or the literal text of an anonymous token).
    pub kind: &'static str,
    /// Nesting depth at which the leaf was found (root = 0, unbounded).
    pub depth: u32,
    /// The leaf sits inside a directive or string-literal container.
    pub in_blob: bool,
}

impl Leaf {
    /// Byte length of the leaf's span.
    pub(crate) fn len(&self) -> usize {
        (self.end - self.start) as usize
    }
}

/// Iterator over the non-empty leaves of a parse tree, in source order.
pub(crate) struct LeafWalker<'tree> {
    cursor: TreeCursor<'tree>,
    depth: u32,
    /// Number of blob containers the cursor is currently inside.
    blob_depth: u32,
    done: bool,
}

impl<'tree> LeafWalker<'tree> {
    pub(crate) fn new(tree: &'tree Tree) -> LeafWalker<'tree> {
        LeafWalker {
            cursor: tree.walk(),
            depth: 0,
            blob_depth: 0,
            done: false,
        }
    }

    /// Move the cursor to the next node in preorder.
    ///
    /// Descends first, then walks siblings, then ascends until a sibling
    /// exists. Returns `false` once the root has been climbed out of.
    /// Descending into a blob container raises `blob_depth`; ascending
    /// back out of one lowers it. Sibling moves stay at the same level,
    /// so the count is untouched.
    fn advance(&mut self) -> bool {
        let kind = self.cursor.node().kind();
        if self.cursor.goto_first_child() {
            self.depth += 1;
            if is_blob_container(kind) {
                self.blob_depth += 1;
            }
            return true;
        }
        loop {
            if self.cursor.goto_next_sibling() {
                return true;
            }
            if !self.cursor.goto_parent() {
                return false;
            }
            self.depth -= 1;
            if is_blob_container(self.cursor.node().kind()) {
                self.blob_depth -= 1;
            }
        }
    }
}

impl Iterator for LeafWalker<'_> {
    type Item = Leaf;

    fn next(&mut self) -> Option<Leaf> {
        while !self.done {
            let node = self.cursor.node();
            let leaf = if node.child_count() == 0 && node.end_byte() > node.start_byte() {
                Some(Leaf {
                    start: clamp_offset(node.start_byte()),
                    end: clamp_offset(node.end_byte()),
                    kind: node.kind(),
                    depth: self.depth,
                    in_blob: self.blob_depth > 0,
                })
            } else {
                None
            };
            if !self.advance() {
                self.done = true;
            }
            if leaf.is_some() {
                return leaf;
            }
        }
        None
    }
}

/// Positions are stored as `u32` to keep tokens compact; offsets past
/// `u32::MAX` (sources over ~4 GiB) saturate.
fn clamp_offset(offset: usize) -> u32 {
    u32::try_from(offset).unwrap_or(u32::MAX)
}
