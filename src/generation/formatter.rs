//! Formatting of generated code before it is persisted.

use crate::errors::{Error, Result};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::process::{Command, Stdio};

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)\r?\n?```\s*$")
        .expect("valid code fence pattern")
});

/// Formats generated source text
pub trait Formatter: Send + Sync {
    fn format(&self, code: &str) -> Result<String>;
}

/// Drop a Markdown fence around the whole answer and end with one newline.
///
/// Models are told not to fence their answer; some do anyway.
pub fn normalize(code: &str) -> String {
    let unfenced = CODE_FENCE
        .captures(code)
        .and_then(|captures| captures.get(1))
        .map_or(code, |body| body.as_str());
    format!("{}\n", unfenced.trim_end())
}

/// Only normalizes
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughFormatter;

impl Formatter for PassthroughFormatter {
    fn format(&self, code: &str) -> Result<String> {
        Ok(normalize(code))
    }
}

/// Pipes code through an external formatter reading stdin (`yapf`, `black -`)
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, code: &str) -> Result<String> {
        let code = normalize(code);
        let program = match which::which(&self.program) {
            Ok(path) => path,
            Err(_) => {
                warn!(
                    "Formatter '{}' not found on PATH; keeping generated code as is",
                    self.program
                );
                return Ok(code);
            }
        };

        debug!("Formatting generated code with {}", program.display());
        let mut child = Command::new(&program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // A formatter that exits early closes the pipe; its status says why
            if let Err(e) = stdin.write_all(code.as_bytes()) {
                debug!("Writing to {} failed: {}", self.program, e);
            }
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(Error::Formatter {
                program: self.program.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let formatted = String::from_utf8(output.stdout).map_err(|e| Error::Formatter {
            program: self.program.clone(),
            message: format!("output is not UTF-8: {}", e),
        })?;
        Ok(normalize(&formatted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_fence() {
        let answer = "```python\ndef f():\n    return 1\n```\n";
        assert_eq!(normalize(answer), "def f():\n    return 1\n");
    }

    #[test]
    fn test_normalize_leaves_plain_code() {
        assert_eq!(normalize("def f():\n    return 1\n\n\n"), "def f():\n    return 1\n");
    }

    #[test]
    fn test_normalize_keeps_inner_backticks() {
        let code = "def f():\n    return '```'\n";
        assert_eq!(normalize(code), code);
    }

    #[test]
    fn test_missing_formatter_falls_back() {
        let formatter = CommandFormatter::new("definitely-not-a-formatter-xyz", vec![]);
        assert_eq!(formatter.format("x = 1").unwrap(), "x = 1\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_formatter_pipes_stdin() {
        let formatter = CommandFormatter::new("cat", vec![]);
        assert_eq!(formatter.format("x = 1\n").unwrap(), "x = 1\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_formatter_failure() {
        let formatter = CommandFormatter::new("false", vec![]);
        assert!(matches!(
            formatter.format("x = 1\n"),
            Err(Error::Formatter { .. })
        ));
    }
}
