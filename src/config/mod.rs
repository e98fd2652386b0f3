//! Layered configuration: defaults, then `.implement.toml`, then the
//! environment. Command-line flags are applied last by the binary.

mod core;
mod loader;

pub use self::core::{Config, FormatterConfig, OpenAiConfig, DEFAULT_MODEL};
pub use self::loader::{
    apply_env, directory_ancestors, load_config, load_config_from, parse_config,
    CONFIG_FILE_NAME,
};

/// File configuration overlaid with the process environment
pub fn resolve_config() -> Config {
    apply_env(load_config(), |key| std::env::var(key).ok())
}
