//! Implement Python functions from their declarations with a language model.
//!
//! The core is extraction: given a function, produce a prompt artifact made
//! of the custom types its annotations mention (commented out, bodies
//! removed) followed by the de-bodied function itself. Around it sit the
//! generation orchestrator, the implementation cache and the runner that
//! calls generated code.

pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod extraction;
pub mod generation;
pub mod python;

pub use crate::core::{FunctionDecl, Namespace, ScopeObject, TypeObject};
pub use crate::errors::{Error, Result};
pub use crate::extraction::{extract, strip_bodies};
pub use crate::generation::Implementer;
pub use crate::python::{PyModule, SourceRoot};
