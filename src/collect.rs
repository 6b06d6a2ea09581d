//! Declaration collection.
//!
//! One pre-order traversal of the syntax tree discovers every class-like and
//! member-like declaration. Members are summarized as they are encountered and
//! grouped under their enclosing class; a class whose body yields no
//! recognized members falls back to a raw-text record so the resolver can
//! summarize the whole class instead of combining member summaries.

use crate::resolve::{ProviderError, SummaryProvider};
use std::collections::HashMap;
use tree_sitter::Node;

pub const CLASS_DECLARATION: &str = "class_declaration";
pub const CLASS_BODY: &str = "class_body";
pub const FUNCTION_DECLARATION: &str = "function_declaration";
pub const PROPERTY_DECLARATION: &str = "property_declaration";

/// What the resolver should do for a class.
///
/// The tag is structural: `Members` always holds at least one pair once
/// collection has finished, and a memberless class is `RawFallback` holding
/// the class node itself.
#[derive(Debug)]
pub enum ClassRecord<'t> {
    /// Ordered (member, summary) pairs discovered inside the class body
    Members(Vec<(Node<'t>, String)>),
    /// Class with zero recognized members; summarize its raw text instead
    RawFallback(Node<'t>),
}

/// A class node with its finished record, in discovery (source) order.
#[derive(Debug)]
pub struct ClassEntry<'t> {
    pub class: Node<'t>,
    pub record: ClassRecord<'t>,
}

/// Everything the traversal produced for one file.
#[derive(Debug)]
pub struct Declarations<'t> {
    /// All member-like nodes with their summaries, in source order
    pub members: Vec<(Node<'t>, String)>,
    /// One entry per class-like node, in source order
    pub classes: Vec<ClassEntry<'t>>,
}

/// Mutable traversal state, passed explicitly instead of captured in closures.
struct Collector<'t, 's, P> {
    source: &'s str,
    provider: &'s P,
    members: Vec<(Node<'t>, String)>,
    classes: Vec<(Node<'t>, Vec<(Node<'t>, String)>)>,
    class_index: HashMap<usize, usize>,
}

impl<'t, 's, P: SummaryProvider> Collector<'t, 's, P> {
    fn visit(&mut self, node: Node<'t>) -> Result<(), ProviderError> {
        match node.kind() {
            CLASS_DECLARATION => {
                tracing::info!(
                    "processing class declaration: {}",
                    first_line(&self.source[node.byte_range()])
                );
                self.class_index.insert(node.id(), self.classes.len());
                self.classes.push((node, Vec::new()));
            }
            FUNCTION_DECLARATION | PROPERTY_DECLARATION => {
                let text = &self.source[node.byte_range()];
                tracing::info!("processing member declaration: {}", first_line(text));
                let summary = self.provider.member_summary(text)?;

                // Attribute to the enclosing class when the member sits
                // directly in a class body: parent is the body container,
                // grandparent is the class node. Pre-order visitation means
                // the class was registered before any of its body members.
                if let Some(class) = node
                    .parent()
                    .and_then(|p| p.parent())
                    .filter(|gp| gp.kind() == CLASS_DECLARATION)
                {
                    if let Some(&idx) = self.class_index.get(&class.id()) {
                        self.classes[idx].1.push((node, summary.clone()));
                    }
                }

                self.members.push((node, summary));
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child)?;
        }

        Ok(())
    }
}

/// Traverse the tree once and collect all declarations with their summaries.
///
/// Member summaries are requested from the provider during the walk, so a
/// provider failure aborts collection immediately with no partial result.
pub fn collect<'t, P: SummaryProvider>(
    root: Node<'t>,
    source: &str,
    provider: &P,
) -> Result<Declarations<'t>, ProviderError> {
    let mut collector = Collector {
        source,
        provider,
        members: Vec::new(),
        classes: Vec::new(),
        class_index: HashMap::new(),
    };
    collector.visit(root)?;

    let classes = collector
        .classes
        .into_iter()
        .map(|(class, members)| {
            let record = if members.is_empty() {
                ClassRecord::RawFallback(class)
            } else {
                ClassRecord::Members(members)
            };
            ClassEntry { class, record }
        })
        .collect();

    Ok(Declarations {
        members: collector.members,
        classes,
    })
}

/// Kind of declaration reported by [`list_declarations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Class,
    Function,
    Property,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Class => "class",
            DeclKind::Function => "function",
            DeclKind::Property => "property",
        }
    }
}

/// A declaration sighting, for read-only inspection (`check` command).
#[derive(Debug, Clone)]
pub struct DeclInfo {
    pub kind: DeclKind,
    pub row: usize,
    pub column: usize,
    pub first_line: String,
}

/// List every class-like and member-like declaration without summarizing.
pub fn list_declarations(root: Node<'_>, source: &str) -> Vec<DeclInfo> {
    let mut out = Vec::new();
    list_into(root, source, &mut out);
    out
}

fn list_into(node: Node<'_>, source: &str, out: &mut Vec<DeclInfo>) {
    let kind = match node.kind() {
        CLASS_DECLARATION => Some(DeclKind::Class),
        FUNCTION_DECLARATION => Some(DeclKind::Function),
        PROPERTY_DECLARATION => Some(DeclKind::Property),
        _ => None,
    };
    if let Some(kind) = kind {
        let point = node.start_position();
        out.push(DeclInfo {
            kind,
            row: point.row,
            column: point.column,
            first_line: first_line(&source[node.byte_range()]).to_string(),
        });
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        list_into(child, source, out);
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::SwiftParser;
    use std::cell::Cell;

    /// Provider that hands out "m1", "m2", ... for members and records calls.
    struct CountingProvider {
        calls: Cell<usize>,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl SummaryProvider for CountingProvider {
        fn member_summary(&self, _declaration: &str) -> Result<String, ProviderError> {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            Ok(format!("m{n}"))
        }

        fn combine(&self, member_summaries: &[String]) -> Result<String, ProviderError> {
            Ok(member_summaries.join("+"))
        }

        fn class_body_summary(&self, _body: &str) -> Result<String, ProviderError> {
            Ok("raw".to_string())
        }
    }

    fn parse_and_collect(source: &str) -> (usize, usize, Vec<String>) {
        let mut parser = SwiftParser::new().unwrap();
        let parsed = parser.parse_with_source(source).unwrap();
        let provider = CountingProvider::new();
        let decls = collect(parsed.root_node(), source, &provider).unwrap();

        let member_summaries = decls.members.iter().map(|(_, s)| s.clone()).collect();
        (decls.members.len(), decls.classes.len(), member_summaries)
    }

    #[test]
    fn members_collected_in_source_order() {
        let source = "\
class Greeter {
    func greet() -> String {
        return \"hi\"
    }

    var name: String = \"world\"
}
";
        let (members, classes, summaries) = parse_and_collect(source);
        assert_eq!(members, 2);
        assert_eq!(classes, 1);
        assert_eq!(summaries, vec!["m1", "m2"]);
    }

    #[test]
    fn class_members_attributed_via_grandparent() {
        let source = "\
class Greeter {
    func greet() -> String {
        return \"hi\"
    }
}
";
        let mut parser = SwiftParser::new().unwrap();
        let parsed = parser.parse_with_source(source).unwrap();
        let provider = CountingProvider::new();
        let decls = collect(parsed.root_node(), source, &provider).unwrap();

        match &decls.classes[0].record {
            ClassRecord::Members(pairs) => assert_eq!(pairs.len(), 1),
            ClassRecord::RawFallback(_) => panic!("expected member record"),
        }
    }

    #[test]
    fn memberless_class_falls_back_to_raw_record() {
        let source = "class Marker {}\n";
        let mut parser = SwiftParser::new().unwrap();
        let parsed = parser.parse_with_source(source).unwrap();
        let provider = CountingProvider::new();
        let decls = collect(parsed.root_node(), source, &provider).unwrap();

        assert_eq!(decls.classes.len(), 1);
        assert!(matches!(
            decls.classes[0].record,
            ClassRecord::RawFallback(_)
        ));
    }

    #[test]
    fn top_level_member_not_attributed_to_any_class() {
        let source = "\
func standalone() -> Int {
    return 1
}

class Empty {}
";
        let mut parser = SwiftParser::new().unwrap();
        let parsed = parser.parse_with_source(source).unwrap();
        let provider = CountingProvider::new();
        let decls = collect(parsed.root_node(), source, &provider).unwrap();

        assert_eq!(decls.members.len(), 1);
        assert!(matches!(
            decls.classes[0].record,
            ClassRecord::RawFallback(_)
        ));
    }

    #[test]
    fn nested_class_gets_its_own_record() {
        let source = "\
class Outer {
    class Inner {
        func inner() -> Int {
            return 2
        }
    }
}
";
        let mut parser = SwiftParser::new().unwrap();
        let parsed = parser.parse_with_source(source).unwrap();
        let provider = CountingProvider::new();
        let decls = collect(parsed.root_node(), source, &provider).unwrap();

        assert_eq!(decls.classes.len(), 2);
        // Outer has no direct members; Inner owns the function.
        assert!(matches!(
            decls.classes[0].record,
            ClassRecord::RawFallback(_)
        ));
        match &decls.classes[1].record {
            ClassRecord::Members(pairs) => assert_eq!(pairs.len(), 1),
            ClassRecord::RawFallback(_) => panic!("expected member record for Inner"),
        }
    }

    #[test]
    fn list_declarations_reports_kinds_and_positions() {
        let source = "\
class Greeter {
    var name: String = \"x\"
}
";
        let mut parser = SwiftParser::new().unwrap();
        let parsed = parser.parse_with_source(source).unwrap();
        let decls = list_declarations(parsed.root_node(), source);

        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].kind, DeclKind::Class);
        assert_eq!(decls[0].row, 0);
        assert_eq!(decls[1].kind, DeclKind::Property);
        assert_eq!(decls[1].column, 4);
        assert!(decls[1].first_line.starts_with("var name"));
    }
}
