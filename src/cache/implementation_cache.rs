use crate::errors::{Error, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory used when nothing else is configured, relative to the working
/// directory
pub const DEFAULT_CACHE_DIR: &str = "functions";

/// One Python file per implemented function: `<dir>/<name>.py`.
///
/// Slots are keyed by the function's short name, so two functions with the
/// same name share a slot.
#[derive(Debug, Clone)]
pub struct ImplementationCache {
    dir: PathBuf,
}

impl ImplementationCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, function: &str) -> PathBuf {
        self.dir.join(format!("{}.py", function))
    }

    pub fn contains(&self, function: &str) -> bool {
        self.slot_path(function).is_file()
    }

    pub fn read(&self, function: &str) -> Result<String> {
        let path = self.slot_path(function);
        fs::read_to_string(&path)
            .map_err(|e| Error::file_system("Failed to read implementation", path, e))
    }

    /// Persist `code`, creating the directory if needed
    pub fn store(&self, function: &str, code: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| Error::file_system("Failed to create cache directory", &self.dir, e))?;

        let path = self.slot_path(function);
        fs::write(&path, code)
            .map_err(|e| Error::file_system("Failed to write implementation", &path, e))?;
        Ok(path)
    }

    /// Remove every `.py` file from the directory; returns how many went
    pub fn clean(&self) -> Result<usize> {
        if !self.dir.is_dir() {
            return Ok(0);
        }

        let entries = fs::read_dir(&self.dir)
            .map_err(|e| Error::file_system("Failed to list cache directory", &self.dir, e))?;

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "py") && path.is_file() {
                fs::remove_file(&path)
                    .map_err(|e| Error::file_system("Failed to remove implementation", &path, e))?;
                if let Some(name) = path.file_name() {
                    info!("Removed {} from {}", name.to_string_lossy(), self.dir.display());
                }
                removed += 1;
            }
        }

        info!("Cleaned {}", self.dir.display());
        Ok(removed)
    }
}

impl Default for ImplementationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_DIR)
    }
}
