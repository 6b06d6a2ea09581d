//! End-to-end annotation of a single source buffer.

use crate::collect::collect;
use crate::parse::{ParseError, SwiftParser};
use crate::resolve::{insertion_list, resolve_classes, ProviderError, SummaryProvider};
use crate::rewrite::rewrite;
use crate::splice::SpliceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Splice(#[from] SpliceError),
}

/// Annotate Swift source text with generated documentation summaries.
///
/// Parses the source, collects declarations, resolves member and class
/// summaries through the provider, and splices every summary block in
/// immediately before its anchor declaration. Returns the rewritten source;
/// the input is never modified. A provider failure aborts the whole run so
/// the caller never writes a half-annotated file.
pub fn annotate_source<P: SummaryProvider>(
    source: &str,
    provider: &P,
) -> Result<String, AnnotateError> {
    let mut parser = SwiftParser::new()?;
    let parsed = parser.parse_with_source(source)?;

    if parsed.has_errors() {
        tracing::warn!(
            "source contains {} syntax error nodes; declaration spans may be incomplete",
            parsed.error_nodes().len()
        );
    }

    let declarations = collect(parsed.root_node(), source, provider)?;
    let class_entries = resolve_classes(declarations.classes, source, provider)?;
    let entries = insertion_list(declarations.members, class_entries);

    Ok(rewrite(source, &entries)?)
}
