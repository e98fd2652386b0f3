//! Extraction artifact assembly.
//!
//! The artifact is the prompt handed to the model: every relevant type as a
//! commented-out, de-bodied declaration, followed by the de-bodied function
//! itself. Blocks are separated by one blank line.
//!
//! ```text
//! #class CustomInput:
//! #    """A custom input class."""
//! #
//! #    def __init__(self, value: int):
//! #        ...
//!
//! def calculate(a, b, c: CustomInput) -> Output:
//!     """Calculate the sum of a, b, and c."""
//! ```

use super::annotations::annotation_names;
use super::relevant::relevant_types;
use super::stripper::strip_bodies;
use crate::core::{FunctionDecl, Namespace};
use crate::errors::{Error, Result};
use log::debug;

/// Marker that turns a line into inert commentary
pub const COMMENT_MARKER: char = '#';

const BLOCK_SEPARATOR: &str = "\n\n";

/// Build the extraction artifact for `function`.
///
/// Annotation names are resolved through `namespace`; any relevant type
/// whose declaration text is missing aborts the extraction with
/// `SourceUnavailable`, as does a parse failure anywhere.
pub fn extract(function: &FunctionDecl, namespace: &dyn Namespace) -> Result<String> {
    let names = annotation_names(function.source())?;
    let types = relevant_types(&names, namespace)?;
    debug!(
        "Extracting {} with {} relevant type(s)",
        function.qualified_name(),
        types.len()
    );

    let mut blocks = Vec::with_capacity(types.len() + 1);
    for class in &types {
        let source = class.source().ok_or_else(|| {
            Error::source_unavailable(class.qualified_name(), "class has no retrievable source")
        })?;
        blocks.push(comment_out(&strip_bodies(source)?));
    }
    blocks.push(strip_bodies(function.source())?);

    Ok(blocks.join(BLOCK_SEPARATOR))
}

/// Prefix every line with the comment marker; blank lines become a bare marker
pub fn comment_out(source: &str) -> String {
    source
        .split('\n')
        .map(|line| format!("{}{}", COMMENT_MARKER, line))
        .collect::<Vec<_>>()
        .join("\n")
}
