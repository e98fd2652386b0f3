//! Core trait definitions for clean module boundaries

use super::types::ScopeObject;
use crate::errors::Result;
use std::collections::HashMap;

/// Name look-up in a function's defining scope.
///
/// This is the only reflective capability the extraction engine needs:
/// given an annotation name, say what it is bound to. `Ok(None)` means the
/// name is unbound, which callers treat as "drop silently".
pub trait Namespace {
    fn resolve(&self, name: &str) -> Result<Option<ScopeObject>>;
}

/// Explicit annotation map, for callers that already know their bindings
impl Namespace for HashMap<String, ScopeObject> {
    fn resolve(&self, name: &str) -> Result<Option<ScopeObject>> {
        Ok(self.get(name).cloned())
    }
}

impl<N: Namespace + ?Sized> Namespace for &N {
    fn resolve(&self, name: &str) -> Result<Option<ScopeObject>> {
        (**self).resolve(name)
    }
}
