use super::load_module;
use crate::python::{PyModule, SourceRoot};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::Path;

/// Artifacts of the named functions, in the order given
pub fn extract_functions(file: &Path, functions: &[String]) -> Result<Vec<String>> {
    let (root, module) = load_module(file)?;
    functions
        .iter()
        .map(|name| extract_one(&module, &root, name))
        .collect()
}

/// Artifacts of every top-level function, extracted in parallel, in source
/// order
pub fn extract_all(file: &Path) -> Result<Vec<String>> {
    let (root, module) = load_module(file)?;
    module
        .functions()
        .par_iter()
        .map(|name| extract_one(&module, &root, name))
        .collect()
}

fn extract_one(module: &PyModule, root: &SourceRoot, name: &str) -> Result<String> {
    module
        .function(name)
        .and_then(|function| function.extract(Some(root)))
        .with_context(|| format!("Failed to extract {}", name))
}
