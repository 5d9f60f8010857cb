//! The byte transform applied by [`crate::minify`]. Files are treated as
//! opaque byte sequences so the transform is independent of whatever template
//! syntax the site generator uses.

/// The bytes removed from every minified file.
pub const STRIPPED: &[u8] = b"\n\t";

/// Returns a copy of `input` with every newline and tab byte removed.
pub fn strip(input: &[u8]) -> Vec<u8> {
    input
        .iter()
        .copied()
        .filter(|b| !STRIPPED.contains(b))
        .collect()
}

/// Returns `true` if `input` has nothing left for [`strip`] to remove.
pub fn is_stripped(input: &[u8]) -> bool {
    !input.iter().any(|b| STRIPPED.contains(b))
}
