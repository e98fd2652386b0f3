//! CLI command implementations.
//!
//! - **extract**: print the prompt artifact of functions in a file
//! - **generate**: make sure an implementation is cached
//! - **call**: run a cached (or freshly generated) implementation
//! - **clean**: empty the implementation cache

pub mod clean;
pub mod extract;
pub mod implement;

pub use clean::clean_cache;
pub use extract::{extract_all, extract_functions};
pub use implement::{call_function, generate_function};

use crate::python::{SourceRoot, PyModule};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

/// Parse `file` as a module of the project rooted in its directory
pub(crate) fn load_module(file: &Path) -> Result<(SourceRoot, Arc<PyModule>)> {
    let root = SourceRoot::for_file(file);
    let module = root
        .load_file(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    Ok((root, module))
}
