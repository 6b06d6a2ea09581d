//! Offset-safe rewriting.
//!
//! Formats each summary into an indented block and splices all blocks into
//! the original buffer. Offsets are computed against the original buffer and
//! applied highest-first by the splice primitive, so no insertion ever
//! invalidates another's position.

use crate::resolve::SummaryEntry;
use crate::splice::{splice_all, Insertion, SpliceError};

/// Format a summary block for insertion before an anchor at `column`.
///
/// Every line is prefixed with `column` spaces, then the first `column`
/// characters of the first formatted line are dropped: the anchor's own
/// column is already present in the surrounding line at the insertion point,
/// so keeping them would double the leading whitespace. The block ends with a
/// newline plus the indentation so the anchor's text starts flush at its
/// original column.
pub fn format_block(summary: &str, column: usize) -> String {
    let indent = " ".repeat(column);
    let indented = summary
        .split('\n')
        .map(|line| format!("{indent}{line}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n{}", &indented[column..], indent)
}

/// Splice every summary entry into the source, producing the rewritten file.
///
/// All-or-nothing: either the fully rewritten buffer is returned or an error;
/// a partially annotated buffer can never escape. Each insertion verifies
/// that the anchor node's text is still present at its offset.
pub fn rewrite(source: &str, entries: &[SummaryEntry<'_>]) -> Result<String, SpliceError> {
    let insertions: Vec<Insertion> = entries
        .iter()
        .map(|entry| {
            let column = entry.anchor.start_position().column;
            let block = format_block(&entry.text, column);
            Insertion::new(
                entry.anchor.start_byte(),
                block,
                &source[entry.anchor.byte_range()],
            )
        })
        .collect();

    let buffer = splice_all(source.as_bytes(), &insertions)?;
    String::from_utf8(buffer).map_err(|e| SpliceError::InvalidUtf8(e.utf8_error()))
}
