use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::DEFAULT_CACHE_DIR;
use crate::generation::client::DEFAULT_BASE_URL;

/// Model used when nothing else is configured
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Root configuration structure for implement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat model asked for implementations
    pub model: String,

    /// Directory holding one `<function>.py` per implementation
    pub cache_dir: PathBuf,

    /// Remove cached implementations before the first generation
    pub clean: bool,

    /// Log level name (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: Option<String>,

    pub formatter: FormatterConfig,

    pub openai: OpenAiConfig,

    /// Interpreter used to call implementations
    pub python: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            clean: false,
            log_level: None,
            formatter: FormatterConfig::default(),
            openai: OpenAiConfig::default(),
            python: "python3".to_string(),
        }
    }
}

/// External formatter reading code on stdin and writing it to stdout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            program: "yapf".to_string(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 120,
        }
    }
}
