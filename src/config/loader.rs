use std::fs;
use std::path::{Path, PathBuf};

use super::core::Config;

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = ".implement.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse a configuration file's contents
pub fn parse_config(contents: &str) -> Result<Config, String> {
    toml::from_str::<Config>(contents)
        .map_err(|e| format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e))
}

/// Config at `config_path`, or `None` when it is absent or unusable
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<Config> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            None
        }
    }
}

fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// `start` and its ancestors, at most `max_depth` of them
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Nearest `.implement.toml` above `start`, or defaults
pub fn load_config_from(start: PathBuf) -> Config {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            Config::default()
        })
}

pub fn load_config() -> Config {
    match std::env::current_dir() {
        Ok(dir) => load_config_from(dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            Config::default()
        }
    }
}

/// Overlay environment variables read through `lookup`
pub fn apply_env<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let set = |key: &str| lookup(key).filter(|value| !value.is_empty());

    if let Some(model) = set("IMPLEMENT_OPENAI_MODEL") {
        config.model = model;
    }
    if let Some(level) = set("IMPLEMENT_LOG_LEVEL") {
        config.log_level = Some(level);
    }
    if set("IMPLEMENT_CLEAN").is_some() {
        config.clean = true;
    }
    if let Some(dir) = set("IMPLEMENT_CACHE_DIR") {
        config.cache_dir = PathBuf::from(dir);
    }
    if let Some(url) = set("OPENAI_BASE_URL") {
        config.openai.base_url = url;
    }
    config
}
