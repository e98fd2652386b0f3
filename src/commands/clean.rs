use crate::cache::ImplementationCache;
use crate::config::Config;
use anyhow::{Context, Result};

/// Remove cached implementations; returns how many were removed
pub fn clean_cache(config: &Config) -> Result<usize> {
    let cache = ImplementationCache::new(&config.cache_dir);
    cache
        .clean()
        .with_context(|| format!("Failed to clean {}", cache.dir().display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_clean_cache_keeps_other_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        let config = Config {
            cache_dir: dir.path().to_path_buf(),
            ..Config::default()
        };

        assert_eq!(clean_cache(&config).unwrap(), 1);
        assert!(dir.path().join("notes.txt").exists());
    }
}
