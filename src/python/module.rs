//! Parsed Python modules and the names they bind.

use super::namespace::ModuleScope;
use super::source_root::SourceRoot;
use super::{definition_name, definition_of, line_start, node_text, parse_python};
use crate::core::{FunctionDecl, TypeObject};
use crate::errors::{Error, Result};
use crate::extraction;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tree_sitter::{Node, Tree};

/// What a statement binds a name to, before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Class { qualname: String, source: Arc<str> },
    Function { qualname: String },
    /// `import a.b` binds `a` to module `a`; `import a.b as c` binds `c` to `a.b`
    Module { module: String },
    /// `from module import name [as alias]`
    Import { module: String, name: String },
    /// `Alias = Target` or `Alias = module.Target`
    Alias { target: Vec<String> },
    Value,
}

/// Names bound in one scope; later statements shadow earlier ones
pub type Bindings = HashMap<String, Binding>;

/// A Python module parsed once and queried many times
#[derive(Debug, Clone)]
pub struct PyModule {
    name: String,
    package: String,
    path: Option<PathBuf>,
    source: String,
    tree: Tree,
    globals: Bindings,
}

impl PyModule {
    /// Parse a standalone module
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let package = parent_module(&name).to_string();
        Self::build(name, package, None, source.into())
    }

    pub(crate) fn from_file(name: &str, package: &str, path: &Path, source: String) -> Result<Self> {
        Self::build(
            name.to_string(),
            package.to_string(),
            Some(path.to_path_buf()),
            source,
        )
    }

    fn build(name: String, package: String, path: Option<PathBuf>, source: String) -> Result<Self> {
        let tree = parse_python(&source).map_err(|err| match (&path, err) {
            (Some(path), Error::MalformedSource { line, column, message }) => Error::malformed(
                line,
                column,
                format!("{} in {}", message, path.display()),
            ),
            (_, err) => err,
        })?;

        let mut globals = Bindings::new();
        collect_bindings(tree.root_node(), &source, "", &package, &mut globals);

        Ok(Self {
            name,
            package,
            path,
            source,
            tree,
            globals,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package that relative imports are resolved against
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn globals(&self) -> &Bindings {
        &self.globals
    }

    /// Top-level function names, in order of first appearance
    pub fn functions(&self) -> Vec<String> {
        let root = self.tree.root_node();
        let mut names: Vec<String> = Vec::new();
        for statement in root.named_children(&mut root.walk()) {
            if definition_of(statement).kind() != "function_definition" {
                continue;
            }
            if let Some(name) = definition_name(statement, &self.source) {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    /// Locate a function by dotted path (`calculate`, `CustomType.a_method`,
    /// `outer.inner`)
    pub fn function(&self, path: &str) -> Result<PyFunction<'_>> {
        let located = self.locate(path)?;
        if definition_of(located.node).kind() != "function_definition" {
            return Err(Error::source_unavailable(
                self.qualify(path),
                "not a function definition",
            ));
        }

        Ok(PyFunction {
            module: self,
            decl: FunctionDecl::new(
                self.name.clone(),
                located.qualname,
                declaration_text(located.node, &self.source),
            ),
            enclosing: located.enclosing,
        })
    }

    /// Locate a class by dotted path
    pub fn class(&self, path: &str) -> Result<TypeObject> {
        let located = self.locate(path)?;
        if definition_of(located.node).kind() != "class_definition" {
            return Err(Error::source_unavailable(
                self.qualify(path),
                "not a class definition",
            ));
        }

        Ok(TypeObject::new(
            self.name.clone(),
            located.qualname,
            declaration_text(located.node, &self.source),
        ))
    }

    fn locate(&self, path: &str) -> Result<Located<'_>> {
        let segments: Vec<&str> = path.split('.').collect();
        let mut container = self.tree.root_node();
        let mut enclosing = Vec::new();
        let mut prefix = String::new();

        for (index, segment) in segments.iter().enumerate() {
            let qualname = join_qualname(&prefix, segment);
            let node = find_definition(container, segment, &self.source).ok_or_else(|| {
                Error::source_unavailable(self.qualify(path), format!("'{}' is not defined", segment))
            })?;

            if index + 1 == segments.len() {
                return Ok(Located {
                    node,
                    qualname,
                    enclosing,
                });
            }

            let definition = definition_of(node);
            let body = definition.child_by_field_name("body").ok_or_else(|| {
                Error::source_unavailable(self.qualify(path), format!("'{}' has no body", segment))
            })?;

            if definition.kind() == "function_definition" {
                // Class bodies never enclose; function bodies do
                prefix = format!("{}.<locals>", qualname);
                let mut locals = Bindings::new();
                collect_bindings(body, &self.source, &prefix, &self.package, &mut locals);
                enclosing.insert(0, locals);
            } else {
                prefix = qualname;
            }
            container = body;
        }

        Err(Error::source_unavailable(self.qualify(path), "empty path"))
    }

    fn qualify(&self, path: &str) -> String {
        join_qualname(&self.name, path)
    }
}

struct Located<'t> {
    node: Node<'t>,
    qualname: String,
    enclosing: Vec<Bindings>,
}

/// A function found in a module, with the scopes that enclose it
#[derive(Debug)]
pub struct PyFunction<'m> {
    module: &'m PyModule,
    decl: FunctionDecl,
    enclosing: Vec<Bindings>,
}

impl<'m> PyFunction<'m> {
    pub fn decl(&self) -> &FunctionDecl {
        &self.decl
    }

    pub fn module(&self) -> &'m PyModule {
        self.module
    }

    /// Defining scope: enclosing function bodies, then module globals, then
    /// builtins. Imports are followed inside `root` when one is given.
    pub fn scope<'a>(&'a self, root: Option<&'a SourceRoot>) -> ModuleScope<'a> {
        ModuleScope::with_locals(self.module, &self.enclosing, root)
    }

    /// Extraction artifact for this function
    pub fn extract(&self, root: Option<&SourceRoot>) -> Result<String> {
        extraction::extract(&self.decl, &self.scope(root))
    }
}

fn find_definition<'t>(container: Node<'t>, name: &str, source: &str) -> Option<Node<'t>> {
    container
        .named_children(&mut container.walk())
        .filter(|statement| definition_name(*statement, source) == Some(name))
        .last()
}

/// Declaration text from the start of its first line, decorators included
fn declaration_text<'s>(node: Node, source: &'s str) -> &'s str {
    &source[line_start(source, node.start_byte())..node.end_byte()]
}

/// Record the names bound by the statements of `container`
pub(crate) fn collect_bindings(
    container: Node,
    source: &str,
    prefix: &str,
    package: &str,
    bindings: &mut Bindings,
) {
    for statement in container.named_children(&mut container.walk()) {
        match statement.kind() {
            "class_definition" | "function_definition" | "decorated_definition" => {
                let Some(name) = definition_name(statement, source) else {
                    continue;
                };
                let qualname = join_qualname(prefix, name);
                let binding = if definition_of(statement).kind() == "class_definition" {
                    Binding::Class {
                        qualname,
                        source: Arc::from(declaration_text(statement, source)),
                    }
                } else {
                    Binding::Function { qualname }
                };
                bindings.insert(name.to_string(), binding);
            }
            "import_statement" => import_bindings(statement, source, bindings),
            "import_from_statement" => from_import_bindings(statement, source, package, bindings),
            "expression_statement" => assignment_bindings(statement, source, bindings),
            "if_statement" | "try_statement" | "with_statement" | "for_statement"
            | "while_statement" => {
                let mut blocks = Vec::new();
                nested_blocks(statement, &mut blocks);
                for block in blocks {
                    collect_bindings(block, source, prefix, package, bindings);
                }
            }
            _ => {}
        }
    }
}

fn nested_blocks<'t>(node: Node<'t>, blocks: &mut Vec<Node<'t>>) {
    for child in node.named_children(&mut node.walk()) {
        match child.kind() {
            "block" => blocks.push(child),
            "elif_clause" | "else_clause" | "except_clause" | "except_group_clause"
            | "finally_clause" => nested_blocks(child, blocks),
            _ => {}
        }
    }
}

fn import_bindings(statement: Node, source: &str, bindings: &mut Bindings) {
    for imported in statement.children_by_field_name("name", &mut statement.walk()) {
        match imported.kind() {
            "dotted_name" => {
                let module = node_text(imported, source);
                let top = module.split('.').next().unwrap_or(module);
                bindings.insert(
                    top.to_string(),
                    Binding::Module {
                        module: top.to_string(),
                    },
                );
            }
            "aliased_import" => {
                if let (Some(name), Some(alias)) = (
                    imported.child_by_field_name("name"),
                    imported.child_by_field_name("alias"),
                ) {
                    bindings.insert(
                        node_text(alias, source).to_string(),
                        Binding::Module {
                            module: node_text(name, source).to_string(),
                        },
                    );
                }
            }
            _ => {}
        }
    }
}

fn from_import_bindings(statement: Node, source: &str, package: &str, bindings: &mut Bindings) {
    let Some(module_name) = statement.child_by_field_name("module_name") else {
        return;
    };
    let module = match module_name.kind() {
        "relative_import" => absolute_module(node_text(module_name, source), package),
        _ => node_text(module_name, source).to_string(),
    };

    for imported in statement.children_by_field_name("name", &mut statement.walk()) {
        let (name, alias) = match imported.kind() {
            "dotted_name" => (imported, imported),
            "aliased_import" => match (
                imported.child_by_field_name("name"),
                imported.child_by_field_name("alias"),
            ) {
                (Some(name), Some(alias)) => (name, alias),
                _ => continue,
            },
            _ => continue,
        };
        bindings.insert(
            node_text(alias, source).to_string(),
            Binding::Import {
                module: module.clone(),
                name: node_text(name, source).to_string(),
            },
        );
    }
}

fn assignment_bindings(statement: Node, source: &str, bindings: &mut Bindings) {
    let Some(mut assignment) = statement.named_child(0) else {
        return;
    };
    if assignment.kind() != "assignment" {
        return;
    }

    // `a = b = Value` binds every target to the innermost right-hand side
    let mut targets = Vec::new();
    let value = loop {
        if let Some(left) = assignment.child_by_field_name("left") {
            if left.kind() == "identifier" {
                targets.push(node_text(left, source));
            }
        }
        match assignment.child_by_field_name("right") {
            Some(right) if right.kind() == "assignment" => assignment = right,
            other => break other,
        }
    };

    // An annotation without a value binds nothing
    let Some(value) = value else {
        return;
    };
    let binding = match dotted_path(value, source) {
        Some(target) => Binding::Alias { target },
        None => Binding::Value,
    };
    for target in targets {
        bindings.insert(target.to_string(), binding.clone());
    }
}

fn dotted_path(node: Node, source: &str) -> Option<Vec<String>> {
    match node.kind() {
        "identifier" => Some(vec![node_text(node, source).to_string()]),
        "attribute" => {
            let mut path = dotted_path(node.child_by_field_name("object")?, source)?;
            path.push(node_text(node.child_by_field_name("attribute")?, source).to_string());
            Some(path)
        }
        _ => None,
    }
}

/// `..models` imported from package `app.api` is `app.models`
fn absolute_module(relative: &str, package: &str) -> String {
    let level = relative.chars().take_while(|c| *c == '.').count();
    let rest = relative[level..].trim();

    let mut parts: Vec<&str> = package.split('.').filter(|p| !p.is_empty()).collect();
    for _ in 1..level {
        parts.pop();
    }
    if !rest.is_empty() {
        parts.push(rest);
    }
    parts.join(".")
}

fn parent_module(name: &str) -> &str {
    name.rsplit_once('.').map_or("", |(parent, _)| parent)
}

fn join_qualname(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}
