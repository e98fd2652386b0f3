//! Annotation names of a function signature.
//!
//! The name recorded for an annotation is the name its runtime object would
//! carry: `mod.Foo` is `Foo`, `list[Foo]` is `list`, `Optional[Foo]` is
//! `Optional`. String forward references count when they spell a dotted
//! name, `None` never counts, and both sides of an `A | B` union are taken.

use crate::errors::{Error, Result};
use crate::python::{definition_of, node_text, parse_python};
use std::collections::BTreeSet;
use tree_sitter::Node;

/// Distinct annotation names over all parameters and the return type
pub fn annotation_names(function_source: &str) -> Result<BTreeSet<String>> {
    let source = super::stripper::dedent(function_source);
    let tree = parse_python(&source)?;
    let root = tree.root_node();

    let function = root
        .named_children(&mut root.walk())
        .map(definition_of)
        .find(|node| node.kind() == "function_definition")
        .ok_or_else(|| Error::malformed(1, 1, "expected a function declaration"))?;

    let mut names = BTreeSet::new();

    if let Some(parameters) = function.child_by_field_name("parameters") {
        for parameter in parameters.named_children(&mut parameters.walk()) {
            if let Some(annotation) = parameter_annotation(parameter) {
                collect_type_names(annotation, &source, &mut names);
            }
        }
    }

    if let Some(returns) = function.child_by_field_name("return_type") {
        collect_type_names(returns, &source, &mut names);
    }

    Ok(names)
}

fn parameter_annotation(parameter: Node) -> Option<Node> {
    match parameter.kind() {
        "typed_parameter" | "typed_default_parameter" => parameter.child_by_field_name("type"),
        _ => None,
    }
}

fn collect_type_names(node: Node, source: &str, names: &mut BTreeSet<String>) {
    match node.kind() {
        "identifier" => {
            names.insert(node_text(node, source).to_string());
        }
        "attribute" => {
            if let Some(attribute) = node.child_by_field_name("attribute") {
                names.insert(node_text(attribute, source).to_string());
            }
        }
        "member_type" => {
            let mut cursor = node.walk();
            if let Some(last) = node
                .named_children(&mut cursor)
                .filter(|n| n.kind() == "identifier")
                .last()
            {
                names.insert(node_text(last, source).to_string());
            }
        }
        "subscript" => {
            if let Some(value) = node.child_by_field_name("value") {
                collect_type_names(value, source, names);
            }
        }
        "generic_type" => {
            if let Some(head) = node.named_child(0) {
                collect_type_names(head, source, names);
            }
        }
        "binary_operator" => {
            let is_union = node
                .child_by_field_name("operator")
                .is_some_and(|op| node_text(op, source) == "|");
            if is_union {
                for side in ["left", "right"] {
                    if let Some(operand) = node.child_by_field_name(side) {
                        collect_type_names(operand, source, names);
                    }
                }
            }
        }
        "string" => {
            if let Some(name) = forward_reference(node_text(node, source)) {
                names.insert(name.to_string());
            }
        }
        "type" | "union_type" | "parenthesized_expression" => {
            for child in node.named_children(&mut node.walk()) {
                collect_type_names(child, source, names);
            }
        }
        _ => {}
    }
}

/// `"mod.Foo"` names `Foo`; anything that is not a plain dotted name is ignored
fn forward_reference(literal: &str) -> Option<&str> {
    let quote = literal.find(['"', '\''])?;
    if quote != 0 {
        return None;
    }
    let inner = literal.trim_matches(|c| c == '"' || c == '\'').trim();
    let is_dotted_name = !inner.is_empty()
        && inner.split('.').all(|part| {
            part.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
                && part.chars().all(|c| c.is_alphanumeric() || c == '_')
        });
    if is_dotted_name {
        inner.rsplit('.').next()
    } else {
        None
    }
}
