//! Core data model shared by the extraction engine and its adapters.

pub mod traits;
pub mod types;

pub use traits::Namespace;
pub use types::{FunctionDecl, ScopeObject, TypeObject, BUILTINS_MODULE};
