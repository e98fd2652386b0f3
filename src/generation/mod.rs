//! Turning extraction artifacts into persisted, callable implementations.

pub mod client;
pub mod formatter;
pub mod orchestrator;
pub mod prompt;
pub mod runner;

pub use client::{CodeGenerator, OpenAiClient};
pub use formatter::{CommandFormatter, Formatter, PassthroughFormatter};
pub use orchestrator::Implementer;
pub use prompt::{ChatMessage, MessageRole, Prompt};
pub use runner::{CallArguments, ImplementationLoader, PythonRunner};
