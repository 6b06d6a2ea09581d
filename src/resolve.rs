//! Summary resolution.
//!
//! Bridges collected declarations to the summary provider: one summary per
//! member (already requested during collection), one combined summary per
//! class, and the final insertion list ordered by source position.

use crate::collect::{ClassEntry, ClassRecord};
use thiserror::Error;
use tree_sitter::Node;

/// Source of documentation summaries.
///
/// Implementations are opaque to the engine: the production implementation
/// speaks HTTP to an LLM endpoint, tests substitute fixed strings. Failures
/// are never masked; any error aborts the run for the current file so a
/// half-annotated buffer can never be produced.
pub trait SummaryProvider {
    /// Summarize a single member declaration from its source text.
    fn member_summary(&self, declaration: &str) -> Result<String, ProviderError>;

    /// Combine member summaries, in member order, into one class-level summary.
    fn combine(&self, member_summaries: &[String]) -> Result<String, ProviderError>;

    /// Summarize a class from its raw source text (no recognized members).
    fn class_body_summary(&self, body: &str) -> Result<String, ProviderError>;
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API key environment variable {env} is not set")]
    MissingApiKey { env: String },

    #[error("summary request failed: {message}")]
    Http { message: String },

    #[error("summary endpoint returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("unusable provider response: {message}")]
    Malformed { message: String },
}

/// A summary anchored at the node it documents.
///
/// The anchor's `start_byte` is the insertion offset and its start column the
/// indentation. Member summaries anchor at the member node; class summaries
/// anchor at the class node.
#[derive(Debug, Clone)]
pub struct SummaryEntry<'t> {
    pub anchor: Node<'t>,
    pub text: String,
}

/// Produce one class-level entry per collected class.
///
/// `Members` records combine their member summaries in member order;
/// `RawFallback` records summarize the class's raw text. Both anchor at the
/// class node.
pub fn resolve_classes<'t, P: SummaryProvider>(
    classes: Vec<ClassEntry<'t>>,
    source: &str,
    provider: &P,
) -> Result<Vec<SummaryEntry<'t>>, ProviderError> {
    let mut entries = Vec::with_capacity(classes.len());

    for entry in classes {
        let text = match entry.record {
            ClassRecord::Members(pairs) => {
                // Collection guarantees a Members record is non-empty.
                let summaries: Vec<String> = pairs.into_iter().map(|(_, s)| s).collect();
                provider.combine(&summaries)?
            }
            ClassRecord::RawFallback(node) => {
                provider.class_body_summary(&source[node.byte_range()])?
            }
        };
        entries.push(SummaryEntry {
            anchor: entry.class,
            text,
        });
    }

    Ok(entries)
}

/// Merge member and class entries into one list ordered by start byte.
///
/// The sort is stable, so appending class entries before or after member
/// entries yields the same result for distinct offsets; equal offsets (not
/// expected from a well-formed tree) keep an unspecified but non-panicking
/// order.
pub fn insertion_list<'t>(
    members: Vec<(Node<'t>, String)>,
    class_entries: Vec<SummaryEntry<'t>>,
) -> Vec<SummaryEntry<'t>> {
    let mut entries: Vec<SummaryEntry<'t>> = members
        .into_iter()
        .map(|(anchor, text)| SummaryEntry { anchor, text })
        .collect();
    entries.extend(class_entries);
    entries.sort_by_key(|e| e.anchor.start_byte());
    entries
}
