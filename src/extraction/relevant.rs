//! Relevant-type discovery.
//!
//! Annotation names are resolved in the function's defining scope and
//! filtered down to user-defined classes. The model already knows what an
//! `int` is; it needs to see the shape of `CustomInput`.

use crate::core::{Namespace, ScopeObject, TypeObject};
use crate::errors::Result;
use log::debug;
use std::collections::{BTreeSet, HashSet};

/// Type filter: a class that is not owned by the built-in namespace
pub fn is_relevant(object: &ScopeObject) -> bool {
    object.as_class().is_some_and(|class| !class.is_builtin())
}

/// Resolve `names` in `namespace` and keep the relevant classes, once each,
/// sorted by class name.
///
/// Unbound names are dropped without error. Two names bound to the same
/// class yield a single entry.
pub fn relevant_types(names: &BTreeSet<String>, namespace: &dyn Namespace) -> Result<Vec<TypeObject>> {
    let mut seen = HashSet::new();
    let mut types = Vec::new();

    for name in names {
        let Some(object) = namespace.resolve(name)? else {
            debug!("Dropping unresolved annotation '{}'", name);
            continue;
        };

        if !is_relevant(&object) {
            debug!("Annotation '{}' is not a relevant type: {:?}", name, object);
            continue;
        }

        if let ScopeObject::Class(class) = object {
            if seen.insert(class.clone()) {
                types.push(class);
            }
        }
    }

    types.sort_by(|a, b| {
        a.name()
            .cmp(b.name())
            .then_with(|| a.module().cmp(b.module()))
    });
    Ok(types)
}
