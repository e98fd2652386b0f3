//! On-disk storage of generated implementations.

pub mod implementation_cache;

pub use implementation_cache::{ImplementationCache, DEFAULT_CACHE_DIR};
