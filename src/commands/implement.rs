use super::load_module;
use crate::config::Config;
use crate::generation::{CallArguments, Implementer};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Generate `function` unless cached; returns the slot path
pub fn generate_function(config: &Config, file: &Path, function: &str) -> Result<PathBuf> {
    let (root, module) = load_module(file)?;
    let target = module.function(function)?;
    let implementer = Implementer::from_config(config)?;
    implementer
        .ensure(target.decl(), &target.scope(Some(&root)))
        .with_context(|| format!("Failed to implement {}", function))
}

/// Ensure `function` is implemented and call it with JSON arguments
pub fn call_function(
    config: &Config,
    file: &Path,
    function: &str,
    args: &str,
    kwargs: &str,
) -> Result<Value> {
    let arguments = parse_arguments(args, kwargs)?;
    let (root, module) = load_module(file)?;
    let target = module.function(function)?;
    let implementer = Implementer::from_config(config)?;
    implementer
        .call(target.decl(), &target.scope(Some(&root)), &arguments)
        .with_context(|| format!("Failed to call {}", function))
}

pub(crate) fn parse_arguments(args: &str, kwargs: &str) -> Result<CallArguments> {
    let args: Vec<Value> =
        serde_json::from_str(args).context("--args must be a JSON array")?;
    let kwargs: Map<String, Value> =
        serde_json::from_str(kwargs).context("--kwargs must be a JSON object")?;
    Ok(CallArguments { args, kwargs })
}
