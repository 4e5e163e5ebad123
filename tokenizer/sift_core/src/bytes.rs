//! Byte classification shared by the eater, the traversal, and the blob
//! splitter.

/// Whitespace in the C `isspace` sense: space, tab, newline, vertical tab,
/// form feed, carriage return.
///
/// Note this is wider than `u8::is_ascii_whitespace`, which excludes the
/// vertical tab.
#[inline]
pub const fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// Blob fragment separator: whitespace or ASCII punctuation.
///
/// Runs of separator bytes delimit the fragments carved out of string,
/// comment, and preprocessor blobs.
#[inline]
pub const fn is_fragment_separator(byte: u8) -> bool {
    is_space(byte) || byte.is_ascii_punctuation()
}
