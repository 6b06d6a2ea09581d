use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The fundamental rewrite primitive: insertion of a text block at a byte offset.
///
/// All higher-level operations (member blocks, class blocks) compile down to this
/// single primitive. Intelligence lives in offset acquisition (tree-sitter), not
/// in the application logic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Insertion does nothing until splice_all() is called"]
pub struct Insertion {
    /// Byte offset into the original buffer where the text is inserted
    pub offset: usize,
    /// Text to insert at the offset
    pub text: String,
    /// Verification of what we expect to find at the offset before applying
    pub anchor: AnchorCheck,
}

/// Verification strategy for the bytes at an insertion offset.
///
/// Guards against splicing with offsets computed from a stale parse: the
/// buffer at `offset` must still begin with the anchor node's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorCheck {
    /// Exact prefix match required
    ExactPrefix(String),
    /// xxh3 hash of the expected prefix (faster for large anchor nodes)
    Hash { len: usize, xxh3: u64 },
}

impl AnchorCheck {
    /// Create verification from anchor text, using a hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            AnchorCheck::Hash {
                len: text.len(),
                xxh3: xxh3_64(text.as_bytes()),
            }
        } else {
            AnchorCheck::ExactPrefix(text.to_string())
        }
    }

    /// Check whether the buffer at `offset` starts with the expected anchor text.
    fn matches(&self, buffer: &[u8], offset: usize) -> bool {
        let rest = &buffer[offset..];
        match self {
            AnchorCheck::ExactPrefix(expected) => rest.starts_with(expected.as_bytes()),
            AnchorCheck::Hash { len, xxh3 } => {
                rest.len() >= *len && xxh3_64(&rest[..*len]) == *xxh3
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum SpliceError {
    #[error("insertion offset {offset} out of range for buffer of length {buffer_len}")]
    OffsetOutOfRange { offset: usize, buffer_len: usize },

    #[error("insertion offset {offset} is not a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },

    #[error("anchor verification failed at offset {offset}")]
    AnchorMismatch { offset: usize },

    #[error("buffer is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

impl Insertion {
    /// Create an insertion with an anchor verification derived from the text
    /// expected at the offset.
    pub fn new(offset: usize, text: impl Into<String>, expected_at_offset: &str) -> Self {
        Self {
            offset,
            text: text.into(),
            anchor: AnchorCheck::from_text(expected_at_offset),
        }
    }

    /// Create an insertion without anchor verification.
    pub fn unchecked(offset: usize, text: impl Into<String>) -> Self {
        Self {
            offset,
            text: text.into(),
            anchor: AnchorCheck::ExactPrefix(String::new()),
        }
    }
}

/// Apply a list of insertions to an immutable byte buffer.
///
/// Every offset is interpreted against the ORIGINAL buffer. Insertions are
/// applied in descending offset order so that splicing at a later offset never
/// shifts the position of a not-yet-applied earlier offset. This ordering is
/// the correctness-critical property of the whole engine.
///
/// All-or-nothing: every offset and anchor is validated against the original
/// buffer before the first splice, and the result is UTF-8 validated. On any
/// failure the original buffer is untouched and no partial result escapes.
pub fn splice_all(original: &[u8], insertions: &[Insertion]) -> Result<Vec<u8>, SpliceError> {
    let source = std::str::from_utf8(original)?;

    for ins in insertions {
        if ins.offset > original.len() {
            return Err(SpliceError::OffsetOutOfRange {
                offset: ins.offset,
                buffer_len: original.len(),
            });
        }
        if !source.is_char_boundary(ins.offset) {
            return Err(SpliceError::NotCharBoundary { offset: ins.offset });
        }
        if !ins.anchor.matches(original, ins.offset) {
            return Err(SpliceError::AnchorMismatch { offset: ins.offset });
        }
    }

    // Stable descending sort; equal offsets keep their relative order, which
    // is unspecified but must not fail.
    let mut ordered: Vec<&Insertion> = insertions.iter().collect();
    ordered.sort_by(|a, b| b.offset.cmp(&a.offset));

    let mut buffer = original.to_vec();
    for ins in ordered {
        buffer.splice(ins.offset..ins.offset, ins.text.bytes());
    }

    std::str::from_utf8(&buffer)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_exact_prefix() {
        let check = AnchorCheck::from_text("func greet");
        assert!(check.matches(b"func greet() {}", 0));
        assert!(!check.matches(b"var greeting", 0));
    }

    #[test]
    fn anchor_hash_for_large_text() {
        let text = "x".repeat(2000);
        let check = AnchorCheck::from_text(&text);
        assert!(matches!(check, AnchorCheck::Hash { .. }));

        let buffer = format!("{text}tail");
        assert!(check.matches(buffer.as_bytes(), 0));
        assert!(!check.matches(b"short", 0));
    }

    #[test]
    fn single_insertion() {
        let out = splice_all(b"hello world", &[Insertion::new(6, "brave ", "world")]).unwrap();
        assert_eq!(out, b"hello brave world");
    }

    #[test]
    fn descending_application_keeps_offsets_valid() {
        // Offsets computed against the original buffer stay valid regardless
        // of the order the caller listed them in.
        let original = b"ab";
        let insertions = vec![
            Insertion::unchecked(0, "X"),
            Insertion::unchecked(1, "YY"),
            Insertion::unchecked(2, "Z"),
        ];
        let out = splice_all(original, &insertions).unwrap();
        assert_eq!(out, b"XaYYbZ");

        let mut reversed = insertions;
        reversed.reverse();
        let out = splice_all(original, &reversed).unwrap();
        assert_eq!(out, b"XaYYbZ");
    }

    #[test]
    fn offset_out_of_range() {
        let result = splice_all(b"short", &[Insertion::unchecked(6, "x")]);
        assert!(matches!(result, Err(SpliceError::OffsetOutOfRange { .. })));
    }

    #[test]
    fn offset_inside_multibyte_char() {
        // "é" is two bytes; offset 1 lands inside it.
        let result = splice_all("é".as_bytes(), &[Insertion::unchecked(1, "x")]);
        assert!(matches!(result, Err(SpliceError::NotCharBoundary { .. })));
    }

    #[test]
    fn anchor_mismatch_leaves_buffer_untouched() {
        let result = splice_all(b"var name = 1", &[Insertion::new(0, "/// doc\n", "func ")]);
        assert!(matches!(
            result,
            Err(SpliceError::AnchorMismatch { offset: 0 })
        ));
    }

    #[test]
    fn equal_offsets_do_not_panic() {
        let out = splice_all(
            b"abc",
            &[Insertion::unchecked(1, "X"), Insertion::unchecked(1, "Y")],
        )
        .unwrap();
        // Order at equal offsets is unspecified; both blocks must land at 1.
        assert_eq!(out.len(), 5);
        assert_eq!(out[0], b'a');
        assert_eq!(out[3], b'b');
    }

    #[test]
    fn insertion_at_end_of_buffer() {
        let out = splice_all(b"end", &[Insertion::unchecked(3, "!")]).unwrap();
        assert_eq!(out, b"end!");
    }
}
