//! Name resolution in a function's defining scope.

use super::builtins;
use super::module::{Binding, Bindings, PyModule};
use super::source_root::SourceRoot;
use crate::core::{Namespace, ScopeObject, TypeObject};
use crate::errors::Result;
use log::debug;

/// Alias and import chains longer than this are treated as unresolved
const MAX_RESOLUTION_DEPTH: usize = 16;

/// Scope chain of a function: enclosing function bodies (innermost first),
/// then the module globals, then the built-in namespace.
#[derive(Debug, Clone, Copy)]
pub struct ModuleScope<'a> {
    module: &'a PyModule,
    locals: &'a [Bindings],
    root: Option<&'a SourceRoot>,
}

impl<'a> ModuleScope<'a> {
    /// Module-level scope
    pub fn new(module: &'a PyModule, root: Option<&'a SourceRoot>) -> Self {
        Self::with_locals(module, &[], root)
    }

    pub fn with_locals(
        module: &'a PyModule,
        locals: &'a [Bindings],
        root: Option<&'a SourceRoot>,
    ) -> Self {
        Self {
            module,
            locals,
            root,
        }
    }

    fn lookup(&self, name: &str, depth: usize) -> Result<Option<ScopeObject>> {
        if depth > MAX_RESOLUTION_DEPTH {
            debug!("Giving up on '{}' in {}: chain too deep", name, self.module.name());
            return Ok(None);
        }

        let binding = self
            .locals
            .iter()
            .chain(std::iter::once(self.module.globals()))
            .find_map(|scope| scope.get(name));

        match binding {
            Some(binding) => self.resolve_binding(binding, depth),
            None => Ok(builtins::lookup(name)),
        }
    }

    fn resolve_binding(&self, binding: &Binding, depth: usize) -> Result<Option<ScopeObject>> {
        let object = match binding {
            Binding::Class { qualname, source } => ScopeObject::Class(TypeObject::new(
                self.module.name(),
                qualname.clone(),
                source.clone(),
            )),
            Binding::Function { qualname } => {
                ScopeObject::Function(format!("{}.{}", self.module.name(), qualname))
            }
            Binding::Module { module } => ScopeObject::Module(module.clone()),
            Binding::Value => ScopeObject::Value,
            Binding::Import { module, name } => {
                return self.resolve_in_module(module, name, depth + 1)
            }
            Binding::Alias { target } => return self.resolve_path(target, depth + 1),
        };
        Ok(Some(object))
    }

    fn resolve_path(&self, path: &[String], depth: usize) -> Result<Option<ScopeObject>> {
        let Some((head, attributes)) = path.split_first() else {
            return Ok(None);
        };

        let mut current = self.lookup(head, depth)?;
        for attribute in attributes {
            current = match current {
                Some(ScopeObject::Module(module)) => {
                    self.resolve_in_module(&module, attribute, depth + 1)?
                }
                Some(ScopeObject::External { module, name }) => Some(ScopeObject::External {
                    module: format!("{}.{}", module, name),
                    name: attribute.clone(),
                }),
                _ => None,
            };
        }
        Ok(current)
    }

    /// `name` as seen from `module`. Modules outside the source root are
    /// external: they exist, but nothing is known about what they export.
    fn resolve_in_module(
        &self,
        module: &str,
        name: &str,
        depth: usize,
    ) -> Result<Option<ScopeObject>> {
        let external = || ScopeObject::External {
            module: module.to_string(),
            name: name.to_string(),
        };

        let Some(root) = self.root else {
            return Ok(Some(external()));
        };
        let Some(target) = root.module(module)? else {
            debug!("Module '{}' is outside the source root", module);
            return Ok(Some(external()));
        };

        let scope = ModuleScope::new(&target, Some(root));
        if let Some(found) = scope.lookup(name, depth)? {
            return Ok(Some(found));
        }

        let submodule = format!("{}.{}", module, name);
        if root.module(&submodule)?.is_some() {
            return Ok(Some(ScopeObject::Module(submodule)));
        }

        debug!("'{}' is not defined in module '{}'", name, module);
        Ok(None)
    }
}

impl Namespace for ModuleScope<'_> {
    fn resolve(&self, name: &str) -> Result<Option<ScopeObject>> {
        self.lookup(name, 0)
    }
}
