//! Grammar-aware Python parsing backed by tree-sitter

use super::{push_unique, CodeStructuralSummary, ParseError, StructureParser};
use crate::languages::Language;
use tree_sitter::{Node, Parser};

pub struct PythonGrammarParser;

impl PythonGrammarParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PythonGrammarParser {
    fn default() -> Self {
        Self::new()
    }
}

fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Records `node` into the summary; returns whether its children hold
/// anything further to record
fn record(node: Node, source: &str, summary: &mut CodeStructuralSummary) -> bool {
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                let module = match name.kind() {
                    "aliased_import" => name.child_by_field_name("name"),
                    _ => Some(name),
                };
                if let Some(module) = module {
                    push_unique(&mut summary.imports, node_text(&module, source));
                }
            }
            false
        }
        "import_from_statement" => {
            if let Some(module) = node.child_by_field_name("module_name") {
                push_unique(&mut summary.imports, node_text(&module, source));
            }
            false
        }
        "future_import_statement" => {
            push_unique(&mut summary.imports, "__future__");
            false
        }
        "function_definition" => {
            if let Some(name) = node.child_by_field_name("name") {
                summary.functions.push(node_text(&name, source).to_string());
            }
            true
        }
        "class_definition" => {
            if let Some(name) = node.child_by_field_name("name") {
                summary.classes.push(node_text(&name, source).to_string());
            }
            true
        }
        "assignment" => {
            collect_dunder_all(node, source, summary);
            true
        }
        _ => true,
    }
}

/// Pre-order walk driven by a single cursor, so nesting depth in the
/// source never grows the call stack
fn visit(root: Node, source: &str, summary: &mut CodeStructuralSummary) {
    let mut cursor = root.walk();
    loop {
        if record(cursor.node(), source, summary) && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// `__all__ = ["a", "b"]` (or a tuple) lists the module's exports
fn collect_dunder_all(node: Node, source: &str, summary: &mut CodeStructuralSummary) {
    let Some(left) = node.child_by_field_name("left") else {
        return;
    };
    if node_text(&left, source) != "__all__" {
        return;
    }
    let Some(right) = node.child_by_field_name("right") else {
        return;
    };
    if !matches!(right.kind(), "list" | "tuple") {
        return;
    }

    let mut cursor = right.walk();
    for item in right.named_children(&mut cursor) {
        if item.kind() == "string" {
            let name = node_text(&item, source)
                .trim_start_matches(|c: char| c.is_ascii_alphabetic())
                .trim_matches(|c| c == '"' || c == '\'');
            push_unique(&mut summary.exports, name);
        }
    }
}

impl StructureParser for PythonGrammarParser {
    fn name(&self) -> &'static str {
        "python-grammar"
    }

    fn supports(&self, language: Language) -> bool {
        language == Language::Python
    }

    fn parse(
        &self,
        content: &str,
        language: Language,
    ) -> Result<CodeStructuralSummary, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParseError::Grammar {
                language,
                reason: e.to_string(),
            })?;

        let tree = parser.parse(content, None).ok_or(ParseError::NoTree)?;
        let root = tree.root_node();

        let mut summary = CodeStructuralSummary::empty("", language);
        visit(root, content, &mut summary);

        if root.has_error() {
            return Err(ParseError::Syntax { partial: summary });
        }
        Ok(summary)
    }
}
