//! Declaration body stripping.
//!
//! Every `def` in a declaration is reduced to a single statement: its
//! docstring when the body opens with one, `...` otherwise. The rewrite is
//! done by splicing the original text at body boundaries found in the
//! syntax tree, so everything outside function bodies (signatures,
//! decorators, class attributes, blank lines) comes back byte for byte.

use crate::errors::{Error, Result};
use crate::python::{line_start, node_text, parse_python};
use std::borrow::Cow;
use tree_sitter::Node;

/// Statement standing in for an omitted implementation
pub const PLACEHOLDER: &str = "...";

/// One body replacement, as a byte range of the dedented source
#[derive(Debug, Clone, PartialEq, Eq)]
struct BodyEdit<'s> {
    start: usize,
    end: usize,
    replacement: Cow<'s, str>,
}

/// Reduce every function body in `source` to its docstring or `...`.
///
/// `source` is a single declaration as retrieved from its module, possibly
/// indented (methods, nested classes). The result is dedented and has no
/// trailing whitespace.
pub fn strip_bodies(source: &str) -> Result<String> {
    let source = dedent(source);
    let tree = parse_python(&source)?;
    let root = tree.root_node();

    if root.named_children(&mut root.walk()).all(|n| n.kind() == "comment") {
        return Err(Error::malformed(1, 1, "no declaration found"));
    }

    let mut edits = Vec::new();
    collect_edits(root, &source, &mut edits);
    edits.sort_by_key(|edit| edit.start);

    let mut stripped = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in &edits {
        stripped.push_str(&source[cursor..edit.start]);
        stripped.push_str(&edit.replacement);
        cursor = edit.end;
    }
    stripped.push_str(&source[cursor..]);

    Ok(stripped.trim_start_matches(['\n', '\r']).trim_end().to_string())
}

fn collect_edits<'s>(node: Node, source: &'s str, edits: &mut Vec<BodyEdit<'s>>) {
    if node.kind() == "function_definition" {
        // Nested definitions disappear with the body that contains them
        if let Some(edit) = body_edit(node, source) {
            edits.push(edit);
        }
        return;
    }

    for child in node.named_children(&mut node.walk()) {
        collect_edits(child, source, edits);
    }
}

fn body_edit<'s>(function: Node, source: &'s str) -> Option<BodyEdit<'s>> {
    let body = function.child_by_field_name("body")?;
    let statements: Vec<Node> = body
        .named_children(&mut body.walk())
        .filter(|n| n.kind() != "comment")
        .collect();
    let first = *statements.first()?;
    let last = *statements.last()?;

    let header_indent = function.start_position().column;
    let end = extend_over_trailing_comments(source, last.end_byte(), header_indent);

    let statement = if is_docstring(first, source) {
        node_text(first, source)
    } else {
        PLACEHOLDER
    };

    let header_end = function_header_end(function);
    let start = extend_over_leading_comments(source, first.start_byte(), header_end);
    let replacement = if start == first.start_byte() {
        Cow::Borrowed(statement)
    } else {
        let indent = &source[line_start(source, first.start_byte())..first.start_byte()];
        Cow::Owned(format!("{}{}", indent, statement))
    };

    Some(BodyEdit {
        start,
        end,
        replacement,
    })
}

/// End of the signature: return annotation, else parameter list
fn function_header_end(function: Node) -> usize {
    function
        .child_by_field_name("return_type")
        .or_else(|| function.child_by_field_name("parameters"))
        .map_or(function.start_byte(), |node| node.end_byte())
}

/// Comment lines between the signature and the first statement go with the
/// body. Returns the start of the first such line, or `start` when there is
/// none.
fn extend_over_leading_comments(source: &str, start: usize, header_end: usize) -> usize {
    let mut cursor = line_start(source, start);
    if cursor <= header_end {
        return start;
    }

    let mut extended = start;
    while cursor > 0 {
        let previous = line_start(source, cursor - 1);
        if previous <= header_end {
            break;
        }
        let line = source[previous..cursor].trim();
        if line.starts_with('#') {
            extended = previous;
        } else if !line.is_empty() {
            break;
        }
        cursor = previous;
    }
    extended
}

/// Comments that trail the last statement but are still indented under the
/// `def` belong to the body and go with it.
fn extend_over_trailing_comments(source: &str, end: usize, header_indent: usize) -> usize {
    let mut end = end;
    let line_end = source[end..].find('\n').map_or(source.len(), |i| end + i);

    let mut rest = source[end..line_end].trim_start();
    if let Some(after) = rest.strip_prefix(';') {
        end = line_end - after.len();
        rest = after.trim_start();
    }
    if rest.starts_with('#') {
        end = end + source[end..line_end].trim_end().len();
    }

    let mut offset = line_end + 1;
    while offset < source.len() {
        let next_end = source[offset..]
            .find('\n')
            .map_or(source.len(), |i| offset + i);
        let line = &source[offset..next_end];
        let content = line.trim_start();

        if content.trim_end().is_empty() {
            offset = next_end + 1;
            continue;
        }

        let indent = line.len() - content.len();
        if !content.starts_with('#') || indent <= header_indent {
            break;
        }

        end = offset + line.trim_end().len();
        offset = next_end + 1;
    }

    end
}

/// A standalone string literal expression. f-strings are expressions, not
/// constants, and never count.
fn is_docstring(statement: Node, source: &str) -> bool {
    if statement.kind() != "expression_statement" || statement.named_child_count() != 1 {
        return false;
    }
    statement
        .named_child(0)
        .is_some_and(|expr| is_string_literal(expr, source))
}

fn is_string_literal(node: Node, source: &str) -> bool {
    match node.kind() {
        "string" => !is_format_string(node, source),
        "concatenated_string" => node
            .named_children(&mut node.walk())
            .all(|part| part.kind() == "string" && !is_format_string(part, source)),
        _ => false,
    }
}

fn is_format_string(node: Node, source: &str) -> bool {
    let text = node_text(node, source);
    let prefix_len = text.find(['"', '\'']).unwrap_or(0);
    text[..prefix_len].contains(['f', 'F'])
}

/// Remove the first line's indentation from every line that carries it.
///
/// Lines indented less than the first (continuation lines of a multi-line
/// string, for instance) are left alone. Whitespace-only lines are emptied.
pub(crate) fn dedent(source: &str) -> Cow<'_, str> {
    let first = source
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");
    let prefix = &first[..first.len() - first.trim_start().len()];

    if prefix.is_empty() {
        return Cow::Borrowed(source);
    }

    let dedented: Vec<&str> = source
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                line.strip_prefix(prefix).unwrap_or(line)
            }
        })
        .collect();
    Cow::Owned(dedented.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_placeholder_replaces_whole_body() {
        let source = indoc! {"
            def total(items):
                result = 0
                for item in items:
                    result += item
                return result
        "};
        assert_eq!(strip_bodies(source).unwrap(), "def total(items):\n    ...");
    }

    #[test]
    fn test_docstring_kept_rest_dropped() {
        let source = indoc! {r#"
            def total(items):
                """Sum the items."""
                return sum(items)
        "#};
        assert_eq!(
            strip_bodies(source).unwrap(),
            "def total(items):\n    \"\"\"Sum the items.\"\"\""
        );
    }

    #[test]
    fn test_trailing_comments_belong_to_body() {
        let source = indoc! {r#"
            def calculate(a, b):
                """Add."""
                # output = a + b
                # return output
        "#};
        assert_eq!(
            strip_bodies(source).unwrap(),
            "def calculate(a, b):\n    \"\"\"Add.\"\"\""
        );
    }

    #[test]
    fn test_same_line_comment_dropped() {
        let source = "def f(x):\n    return x  # identity\n";
        assert_eq!(strip_bodies(source).unwrap(), "def f(x):\n    ...");
    }

    #[test]
    fn test_trailing_semicolon_dropped() {
        assert_eq!(strip_bodies("def f():\n    x = 1;\n").unwrap(), "def f():\n    ...");
        assert_eq!(
            strip_bodies("def f():\n    x = 1; y = 2 ;  # done\n").unwrap(),
            "def f():\n    ..."
        );
        assert_eq!(strip_bodies("def f(x): return x;").unwrap(), "def f(x): ...");
    }

    #[test]
    fn test_leading_comments_belong_to_body() {
        let source = indoc! {r#"
            def calculate(a, b):  # sums
                # first the docstring

                """Add."""
                return a + b
        "#};
        assert_eq!(
            strip_bodies(source).unwrap(),
            "def calculate(a, b):  # sums\n    \"\"\"Add.\"\"\""
        );
    }

    #[test]
    fn test_class_comment_between_methods_survives() {
        let source = indoc! {"
            class A:
                def f(self):
                    return 1
                # helpers
                def g(self):
                    return 2
        "};
        let expected = indoc! {"
            class A:
                def f(self):
                    ...
                # helpers
                def g(self):
                    ..."};
        assert_eq!(strip_bodies(source).unwrap(), expected);
    }

    #[test]
    fn test_inline_body() {
        assert_eq!(
            strip_bodies("def f(x): return x * 2").unwrap(),
            "def f(x): ..."
        );
    }

    #[test]
    fn test_nested_function_removed_with_outer_body() {
        let source = indoc! {"
            def outer():
                def inner():
                    return 1
                return inner()
        "};
        assert_eq!(strip_bodies(source).unwrap(), "def outer():\n    ...");
    }

    #[test]
    fn test_async_and_decorated() {
        let source = indoc! {"
            @retry(times=3)
            async def fetch(url: str) -> bytes:
                async with session.get(url) as r:
                    return await r.read()
        "};
        assert_eq!(
            strip_bodies(source).unwrap(),
            "@retry(times=3)\nasync def fetch(url: str) -> bytes:\n    ..."
        );
    }

    #[test]
    fn test_fstring_is_not_docstring() {
        let source = "def f(x):\n    f\"value {x}\"\n    return x\n";
        assert_eq!(strip_bodies(source).unwrap(), "def f(x):\n    ...");
    }

    #[test]
    fn test_single_quoted_and_concatenated_docstrings() {
        assert_eq!(
            strip_bodies("def f():\n    'doc'\n    pass\n").unwrap(),
            "def f():\n    'doc'"
        );
        assert_eq!(
            strip_bodies("def f():\n    'a' 'b'\n    pass\n").unwrap(),
            "def f():\n    'a' 'b'"
        );
    }

    #[test]
    fn test_number_first_statement_gets_placeholder() {
        assert_eq!(
            strip_bodies("def f():\n    42\n    pass\n").unwrap(),
            "def f():\n    ..."
        );
    }

    #[test]
    fn test_indented_method_is_dedented() {
        let source = "    def a_method(self, x: int) -> int:\n        return x\n";
        assert_eq!(
            strip_bodies(source).unwrap(),
            "def a_method(self, x: int) -> int:\n    ..."
        );
    }

    #[test]
    fn test_class_attributes_untouched() {
        let source = indoc! {"
            class LinterError(BaseModel):
                file_name: str
                line_number: int = 0

                def describe(self) -> str:
                    return f'{self.file_name}:{self.line_number}'
        "};
        let expected = indoc! {"
            class LinterError(BaseModel):
                file_name: str
                line_number: int = 0

                def describe(self) -> str:
                    ..."};
        assert_eq!(strip_bodies(source).unwrap(), expected);
    }

    #[test]
    fn test_malformed_source() {
        let err = strip_bodies("def f(:\n    pass").unwrap_err();
        assert!(matches!(err, Error::MalformedSource { .. }));
    }

    #[test]
    fn test_empty_source_rejected() {
        assert!(strip_bodies("   \n").is_err());
        assert!(strip_bodies("# only a comment\n").is_err());
    }

    #[test]
    fn test_dedent_keeps_shallower_lines() {
        let source = "    def f():\n        \"\"\"Doc\nmore\"\"\"\n";
        assert_eq!(dedent(source), "def f():\n    \"\"\"Doc\nmore\"\"\"\n");
    }
}
