use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Module that owns Python's built-in types
pub const BUILTINS_MODULE: &str = "builtins";

/// A function declaration together with its verbatim source text.
///
/// The source is the declaration as written, decorators and original
/// indentation included. Nothing here is executable; it is only ever parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    module: String,
    qualname: String,
    source: Arc<str>,
}

impl FunctionDecl {
    pub fn new(
        module: impl Into<String>,
        qualname: impl Into<String>,
        source: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            module: module.into(),
            qualname: qualname.into(),
            source: source.into(),
        }
    }

    /// Short name, the last segment of the qualified name
    pub fn name(&self) -> &str {
        last_segment(&self.qualname)
    }

    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn qualified_name(&self) -> String {
        qualify(&self.module, &self.qualname)
    }
}

/// A class object reached through a scope look-up.
///
/// Identity is `(module, qualname)`: two names bound to the same class
/// compare equal, which is what deduplicates aliases during discovery.
#[derive(Debug, Clone)]
pub struct TypeObject {
    module: String,
    qualname: String,
    source: Option<Arc<str>>,
}

impl TypeObject {
    pub fn new(
        module: impl Into<String>,
        qualname: impl Into<String>,
        source: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            module: module.into(),
            qualname: qualname.into(),
            source: Some(source.into()),
        }
    }

    /// A class whose declaration text cannot be retrieved
    pub fn without_source(module: impl Into<String>, qualname: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            qualname: qualname.into(),
            source: None,
        }
    }

    pub fn builtin(name: impl Into<String>) -> Self {
        Self::without_source(BUILTINS_MODULE, name)
    }

    pub fn name(&self) -> &str {
        last_segment(&self.qualname)
    }

    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn qualified_name(&self) -> String {
        qualify(&self.module, &self.qualname)
    }

    pub fn is_builtin(&self) -> bool {
        self.module == BUILTINS_MODULE
    }
}

impl PartialEq for TypeObject {
    fn eq(&self, other: &Self) -> bool {
        self.module == other.module && self.qualname == other.qualname
    }
}

impl Eq for TypeObject {}

impl Hash for TypeObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.module.hash(state);
        self.qualname.hash(state);
    }
}

impl fmt::Display for TypeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class '{}'>", self.qualified_name())
    }
}

/// Whatever a name is bound to in a scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeObject {
    Class(TypeObject),
    Function(String),
    Module(String),
    /// Any non-callable, non-class value (constants, instances, ...)
    Value,
    /// Imported from outside the source root; its nature is unknown
    External { module: String, name: String },
}

impl ScopeObject {
    pub fn as_class(&self) -> Option<&TypeObject> {
        match self {
            ScopeObject::Class(class) => Some(class),
            _ => None,
        }
    }
}

fn last_segment(qualname: &str) -> &str {
    qualname.rsplit('.').next().unwrap_or(qualname)
}

fn qualify(module: &str, qualname: &str) -> String {
    if module.is_empty() {
        qualname.to_string()
    } else {
        format!("{}.{}", module, qualname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_function_name_is_last_segment() {
        let decl = FunctionDecl::new("app", "CustomType.a_method", "def a_method(self): ...");
        assert_eq!(decl.name(), "a_method");
        assert_eq!(decl.qualified_name(), "app.CustomType.a_method");
    }

    #[test]
    fn test_type_identity_ignores_source() {
        let a = TypeObject::new("app", "Output", "class Output: ...");
        let b = TypeObject::without_source("app", "Output");
        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_builtin_types() {
        let int = TypeObject::builtin("int");
        assert!(int.is_builtin());
        assert_eq!(int.source(), None);
        assert_eq!(int.to_string(), "<class 'builtins.int'>");
    }

    #[test]
    fn test_empty_module_qualifies_to_bare_name() {
        let ty = TypeObject::without_source("", "Point");
        assert_eq!(ty.qualified_name(), "Point");
    }
}
