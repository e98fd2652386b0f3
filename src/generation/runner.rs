//! Loading and calling persisted implementations.

use crate::cache::ImplementationCache;
use crate::errors::{Error, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Write;
use std::process::{Command, Stdio};

/// Imports the slot file as a module, calls the function with JSON-decoded
/// arguments read from stdin and prints the JSON-encoded result.
///
/// Anything the implementation prints goes to stderr; stdout carries only
/// the result.
const BOOTSTRAP: &str = r#"
import contextlib, importlib.util, json, sys
result_stream = sys.stdout
with contextlib.redirect_stdout(sys.stderr):
    spec = importlib.util.spec_from_file_location("implemented_" + sys.argv[2], sys.argv[1])
    module = importlib.util.module_from_spec(spec)
    spec.loader.exec_module(module)
    call = json.loads(sys.stdin.read())
    result = getattr(module, sys.argv[2])(*call["args"], **call["kwargs"])
result_stream.write(json.dumps(result))
"#;

/// Positional and keyword arguments of one call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallArguments {
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

impl CallArguments {
    pub fn positional(args: Vec<Value>) -> Self {
        Self {
            args,
            kwargs: Map::new(),
        }
    }
}

/// Turns a persisted implementation into a call result
pub trait ImplementationLoader: Send + Sync {
    fn invoke(
        &self,
        cache: &ImplementationCache,
        function: &str,
        arguments: &CallArguments,
    ) -> Result<Value>;
}

/// Runs implementations in a Python subprocess
#[derive(Debug, Clone)]
pub struct PythonRunner {
    interpreter: String,
}

impl PythonRunner {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }
}

impl Default for PythonRunner {
    fn default() -> Self {
        Self::new("python3")
    }
}

impl ImplementationLoader for PythonRunner {
    fn invoke(
        &self,
        cache: &ImplementationCache,
        function: &str,
        arguments: &CallArguments,
    ) -> Result<Value> {
        let invocation_error = |message: String| Error::Invocation {
            function: function.to_string(),
            message,
        };

        let slot = cache.slot_path(function);
        if !slot.is_file() {
            return Err(invocation_error(format!(
                "no implementation at {}",
                slot.display()
            )));
        }

        info!(
            "Calling {} with arguments: {:?}, {:?}",
            function, arguments.args, arguments.kwargs
        );
        let interpreter = which::which(&self.interpreter)
            .map_err(|e| invocation_error(format!("{} not found: {}", self.interpreter, e)))?;

        let mut child = Command::new(interpreter)
            .arg("-c")
            .arg(BOOTSTRAP)
            .arg(&slot)
            .arg(function)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let payload = serde_json::to_vec(arguments)?;
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&payload) {
                debug!("Writing arguments for {} failed: {}", function, e);
            }
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(invocation_error(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let printed = String::from_utf8_lossy(&output.stderr);
        if !printed.is_empty() {
            debug!("{} printed:\n{}", function, printed.trim_end());
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("{} returned {}", function, stdout);
        Ok(serde_json::from_str(&stdout)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_call_arguments_defaults() {
        let arguments: CallArguments = serde_json::from_value(json!({"args": [1, 2]})).unwrap();
        assert_eq!(arguments, CallArguments::positional(vec![json!(1), json!(2)]));
    }

    #[test]
    fn test_missing_slot_is_invocation_error() {
        let dir = TempDir::new().unwrap();
        let cache = ImplementationCache::new(dir.path());
        let err = PythonRunner::default()
            .invoke(&cache, "absent", &CallArguments::default())
            .unwrap_err();
        assert!(matches!(err, Error::Invocation { ref function, .. } if function == "absent"));
    }

    #[test]
    fn test_call_with_args_and_kwargs() {
        if which::which("python3").is_err() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let cache = ImplementationCache::new(dir.path());
        cache
            .store(
                "add",
                "print('loading')\n\ndef add(a, b, scale=1):\n    print('debug')\n    return (a + b) * scale\n",
            )
            .unwrap();

        let mut kwargs = Map::new();
        kwargs.insert("scale".to_string(), json!(10));
        let arguments = CallArguments {
            args: vec![json!(1), json!(2)],
            kwargs,
        };
        let result = PythonRunner::default().invoke(&cache, "add", &arguments).unwrap();
        assert_eq!(result, json!(30));
    }

    #[test]
    fn test_raising_implementation_reports_stderr() {
        if which::which("python3").is_err() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let cache = ImplementationCache::new(dir.path());
        cache
            .store("fail", "def fail():\n    raise ValueError('nope')\n")
            .unwrap();

        let err = PythonRunner::default()
            .invoke(&cache, "fail", &CallArguments::default())
            .unwrap_err();
        assert!(matches!(err, Error::Invocation { ref message, .. } if message.contains("ValueError: nope")));
    }

    #[test]
    fn test_missing_interpreter() {
        let dir = TempDir::new().unwrap();
        let cache = ImplementationCache::new(dir.path());
        cache.store("f", "def f():\n    return 1\n").unwrap();
        let err = PythonRunner::new("no-such-python-xyz")
            .invoke(&cache, "f", &CallArguments::default())
            .unwrap_err();
        assert!(matches!(err, Error::Invocation { .. }));
    }
}
