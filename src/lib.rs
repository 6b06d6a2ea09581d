//! Doc Weaver: automated documentation annotation for Swift sources
//!
//! Annotates Swift files with generated `///` documentation comments built on
//! a span-anchored insertion primitive with tree-sitter declaration
//! discovery.
//!
//! # Architecture
//!
//! All rewriting compiles down to a single primitive: [`Insertion`], a
//! verified text insertion at a byte offset. Intelligence lives in span
//! acquisition (the tree-sitter collector) and summary resolution, not in the
//! application logic. Insertions are applied in descending offset order, so
//! every offset computed against the original buffer stays valid.
//!
//! # Safety
//!
//! - Every insertion verifies its anchor's text before applying
//! - Atomic file writes (tempfile + fsync + rename)
//! - Annotation-root boundary enforcement
//! - UTF-8 validation
//!
//! # Example
//!
//! ```no_run
//! use doc_weaver::{annotate_source, LlmProvider, WeaverConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WeaverConfig::default();
//! let provider = LlmProvider::new(&config)?;
//!
//! let source = std::fs::read_to_string("Sources/Greeter.swift")?;
//! let annotated = annotate_source(&source, &provider)?;
//! # Ok(())
//! # }
//! ```

pub mod annotate;
pub mod collect;
pub mod config;
pub mod llm;
pub mod logging;
pub mod parse;
pub mod resolve;
pub mod rewrite;
pub mod safety;
pub mod splice;
pub mod write;

// Re-exports
pub use annotate::{annotate_source, AnnotateError};
pub use collect::{collect, list_declarations, ClassEntry, ClassRecord, DeclInfo, DeclKind};
pub use config::{load_from_path, load_from_str, ConfigError, WeaverConfig};
pub use llm::{wrap_doc_comment, LlmProvider};
pub use parse::{ParseError, ParsedSource, SwiftParser};
pub use resolve::{
    insertion_list, resolve_classes, ProviderError, SummaryEntry, SummaryProvider,
};
pub use rewrite::{format_block, rewrite};
pub use safety::{OutputGuard, SafetyError, SKIP_DIRS};
pub use splice::{splice_all, AnchorCheck, Insertion, SpliceError};
pub use write::atomic_replace;
