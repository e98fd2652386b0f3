//! The extraction engine.
//!
//! Given a function declaration and its defining scope, produce a compact,
//! de-bodied text artifact suitable as a generation prompt. Everything here
//! is pure: no file or network I/O, no shared state. Each call builds its
//! own syntax trees, so calls may run concurrently without coordination.

pub mod annotations;
pub mod extractor;
pub mod relevant;
pub mod stripper;

pub use annotations::annotation_names;
pub use extractor::{comment_out, extract, COMMENT_MARKER};
pub use relevant::{is_relevant, relevant_types};
pub use stripper::{strip_bodies, PLACEHOLDER};
