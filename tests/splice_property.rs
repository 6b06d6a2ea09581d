//! Property tests for the splice primitive.
//!
//! The descending-offset application must be byte-identical to a naive
//! reference that applies insertions ascending while re-offsetting every
//! later insertion by the text already inserted.

use doc_weaver::{splice_all, Insertion};
use proptest::prelude::*;

/// Naive O(n²) reference: ascending order with cumulative offset shifting.
fn naive_reference(original: &[u8], edits: &[(usize, String)]) -> Vec<u8> {
    let mut sorted = edits.to_vec();
    sorted.sort_by_key(|(offset, _)| *offset);

    let mut buffer = original.to_vec();
    let mut shift = 0usize;
    for (offset, text) in sorted {
        let at = offset + shift;
        buffer.splice(at..at, text.bytes());
        shift += text.len();
    }
    buffer
}

fn source_and_edits() -> impl Strategy<Value = (String, Vec<(usize, String)>)> {
    "[ -~]{0,80}".prop_flat_map(|source| {
        let len = source.len();
        let edits = prop::collection::vec((0..=len, "[a-zA-Z0-9/ \\n]{0,12}"), 0..8);
        (Just(source), edits)
    })
}

/// Drop duplicate offsets: order between equal offsets is unspecified, so
/// only distinct-offset lists are comparable against the reference.
fn dedup_offsets(mut edits: Vec<(usize, String)>) -> Vec<(usize, String)> {
    edits.sort_by_key(|(offset, _)| *offset);
    edits.dedup_by_key(|(offset, _)| *offset);
    edits
}

proptest! {
    #[test]
    fn splice_matches_naive_reference((source, edits) in source_and_edits()) {
        let edits = dedup_offsets(edits);

        let insertions: Vec<Insertion> = edits
            .iter()
            .map(|(offset, text)| Insertion::unchecked(*offset, text.clone()))
            .collect();

        let spliced = splice_all(source.as_bytes(), &insertions).unwrap();
        let reference = naive_reference(source.as_bytes(), &edits);

        prop_assert_eq!(spliced, reference);
    }

    #[test]
    fn splice_is_input_order_independent((source, edits) in source_and_edits()) {
        let edits = dedup_offsets(edits);

        let forward: Vec<Insertion> = edits
            .iter()
            .map(|(offset, text)| Insertion::unchecked(*offset, text.clone()))
            .collect();
        let mut backward = forward.clone();
        backward.reverse();

        let a = splice_all(source.as_bytes(), &forward).unwrap();
        let b = splice_all(source.as_bytes(), &backward).unwrap();

        prop_assert_eq!(a, b);
    }

    #[test]
    fn surviving_bytes_keep_their_relative_order((source, edits) in source_and_edits()) {
        let edits = dedup_offsets(edits);

        let insertions: Vec<Insertion> = edits
            .iter()
            .map(|(offset, text)| Insertion::unchecked(*offset, text.clone()))
            .collect();

        let spliced = splice_all(source.as_bytes(), &insertions).unwrap();

        let inserted: usize = edits.iter().map(|(_, text)| text.len()).sum();
        prop_assert_eq!(spliced.len(), source.len() + inserted);

        // Removing the inserted spans ascending restores the original buffer:
        // each drain puts the next span back at its own original offset.
        let mut remaining = spliced;
        let mut sorted = edits;
        sorted.sort_by_key(|(offset, _)| *offset);
        for (offset, text) in &sorted {
            remaining.drain(*offset..offset + text.len());
        }
        prop_assert_eq!(remaining, source.as_bytes());
    }
}
