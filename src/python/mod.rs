//! Python source access built on tree-sitter.
//!
//! Parsing lives here together with the module/scope adapter that stands in
//! for runtime reflection: instead of asking a live interpreter for a
//! function's source and globals, we read them from the module's text.

pub mod builtins;
pub mod module;
pub mod namespace;
pub mod source_root;

pub use module::{Binding, Bindings, PyFunction, PyModule};
pub use namespace::ModuleScope;
pub use source_root::SourceRoot;

use crate::errors::{Error, Result};
use tree_sitter::{Node, Parser, Tree};

/// Parse Python source, rejecting trees that contain syntax errors
pub fn parse_python(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| Error::Configuration(format!("Failed to set Python language: {}", e)))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| Error::malformed(1, 1, "parser produced no tree"))?;

    if let Some(bad) = first_error(tree.root_node()) {
        let position = bad.start_position();
        let message = if bad.is_missing() {
            format!("missing {}", bad.kind())
        } else {
            "invalid syntax".to_string()
        };
        return Err(Error::malformed(position.row + 1, position.column + 1, message));
    }

    Ok(tree)
}

fn first_error(node: Node) -> Option<Node> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    for child in node.children(&mut node.walk()) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    Some(node)
}

/// Source text covered by a node
pub(crate) fn node_text<'s>(node: Node, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

/// Byte offset of the start of the line containing `offset`
pub(crate) fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Unwrap `decorated_definition` to the class or function it decorates
pub(crate) fn definition_of(node: Node) -> Node {
    if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition").unwrap_or(node)
    } else {
        node
    }
}

/// Name of a class or function definition (decorators unwrapped)
pub(crate) fn definition_name<'s>(node: Node, source: &'s str) -> Option<&'s str> {
    let definition = definition_of(node);
    match definition.kind() {
        "class_definition" | "function_definition" => definition
            .child_by_field_name("name")
            .map(|name| node_text(name, source)),
        _ => None,
    }
}
