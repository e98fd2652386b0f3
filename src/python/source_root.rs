//! A directory of Python modules, loaded on demand.

use super::module::PyModule;
use crate::errors::{Error, Result};
use dashmap::DashMap;
use log::debug;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Import root: `pkg.mod` lives at `<root>/pkg/mod.py` or
/// `<root>/pkg/mod/__init__.py`.
///
/// Parsed modules are cached, including misses, so repeated look-ups of a
/// third-party module do not touch the file system again.
#[derive(Debug)]
pub struct SourceRoot {
    root: PathBuf,
    modules: DashMap<String, Option<Arc<PyModule>>>,
}

impl SourceRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            modules: DashMap::new(),
        }
    }

    /// Root for a script: the nearest directory above it that is not a
    /// package, so `pkg/sub/mod.py` is loaded as `pkg.sub.mod`
    pub fn for_file(path: &Path) -> Self {
        let mut root = non_empty_parent(path);
        while root.join("__init__.py").is_file() {
            match root.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => root = parent,
                _ => return Self::new("."),
            }
        }
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load a module by dotted name; `Ok(None)` when it is not under the root
    pub fn module(&self, name: &str) -> Result<Option<Arc<PyModule>>> {
        if let Some(cached) = self.modules.get(name) {
            return Ok(cached.value().clone());
        }

        let loaded = match self.module_file(name) {
            Some((path, is_package)) => Some(Arc::new(self.load(name, &path, is_package)?)),
            None => None,
        };
        self.modules.insert(name.to_string(), loaded.clone());
        Ok(loaded)
    }

    /// Load a module from a file path, naming it relative to the root
    pub fn load_file(&self, path: &Path) -> Result<Arc<PyModule>> {
        let (name, is_package) = self.module_name_for(path);
        if let Some(Some(cached)) = self.modules.get(&name).map(|entry| entry.value().clone()) {
            return Ok(cached);
        }

        let module = Arc::new(self.load(&name, path, is_package)?);
        self.modules.insert(name, Some(module.clone()));
        Ok(module)
    }

    fn load(&self, name: &str, path: &Path, is_package: bool) -> Result<PyModule> {
        debug!("Loading module {} from {}", name, path.display());
        let source = fs::read_to_string(path)
            .map_err(|e| Error::file_system(format!("Failed to read module {}", name), path, e))?;
        let package = if is_package {
            name
        } else {
            name.rsplit_once('.').map_or("", |(parent, _)| parent)
        };
        PyModule::from_file(name, package, path, source)
    }

    fn module_file(&self, name: &str) -> Option<(PathBuf, bool)> {
        if name.is_empty() {
            return None;
        }
        let relative: PathBuf = name.split('.').collect();
        let base = self.root.join(relative);

        let file = base.with_extension("py");
        if file.is_file() {
            return Some((file, false));
        }
        let init = base.join("__init__.py");
        init.is_file().then_some((init, true))
    }

    fn module_name_for(&self, path: &Path) -> (String, bool) {
        let path = without_cur_dir(path);
        let relative = path
            .strip_prefix(without_cur_dir(&self.root))
            .ok()
            .unwrap_or_else(|| path.file_name().map(Path::new).unwrap_or(path.as_path()));

        let mut parts: Vec<String> = relative
            .with_extension("")
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let is_package = parts.last().is_some_and(|last| last == "__init__");
        if is_package {
            parts.pop();
        }
        (parts.join("."), is_package)
    }
}

fn non_empty_parent(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// `./pkg/mod.py` and `pkg/mod.py` name the same module under root `.`
fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Namespace, ScopeObject};
    use crate::python::ModuleScope;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("app/models")).unwrap();
        fs::write(dir.path().join("app/__init__.py"), "").unwrap();
        fs::write(
            dir.path().join("app/models/__init__.py"),
            "from .item import Item\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("app/models/item.py"),
            "class Item:\n    def price(self) -> float:\n        return 1.0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("app/service.py"),
            "from .models import Item\nfrom app import models\n\ndef total(item: Item) -> float:\n    ...\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_module_names() {
        let dir = project();
        let root = SourceRoot::new(dir.path());
        let service = root.load_file(&dir.path().join("app/service.py")).unwrap();
        assert_eq!(service.name(), "app.service");
        assert_eq!(service.package(), "app");

        let models = root.module("app.models").unwrap().unwrap();
        assert_eq!(models.package(), "app.models");
        assert!(root.module("requests").unwrap().is_none());
    }

    #[test]
    fn test_import_followed_through_package() {
        let dir = project();
        let root = SourceRoot::new(dir.path());
        let service = root.load_file(&dir.path().join("app/service.py")).unwrap();

        let scope = ModuleScope::new(&service, Some(&root));
        let item = scope.resolve("Item").unwrap().unwrap();
        let class = item.as_class().unwrap();
        assert_eq!(class.qualified_name(), "app.models.item.Item");
        assert!(class.source().unwrap().starts_with("class Item:"));

        assert_eq!(
            scope.resolve("models").unwrap(),
            Some(ScopeObject::Module("app.models".into()))
        );
    }

    #[test]
    fn test_for_file_uses_parent_directory() {
        assert_eq!(SourceRoot::for_file(Path::new("app.py")).root(), Path::new("."));
        assert_eq!(
            SourceRoot::for_file(Path::new("src/app.py")).root(),
            Path::new("src")
        );
    }

    #[test]
    fn test_for_file_climbs_out_of_packages() {
        let dir = project();
        let root = SourceRoot::for_file(&dir.path().join("app/models/item.py"));
        assert_eq!(root.root(), dir.path());

        let item = root.load_file(&dir.path().join("app/models/item.py")).unwrap();
        assert_eq!(item.name(), "app.models.item");
    }

    #[test]
    fn test_relative_paths_under_current_directory() {
        let root = SourceRoot::new(".");
        assert_eq!(
            root.module_name_for(Path::new("app/service.py")),
            ("app.service".to_string(), false)
        );
        assert_eq!(
            root.module_name_for(Path::new("./app/models/__init__.py")),
            ("app.models".to_string(), true)
        );

        let nested = SourceRoot::new("./src");
        assert_eq!(
            nested.module_name_for(Path::new("src/app/service.py")).0,
            "app.service"
        );
    }

    #[test]
    fn test_malformed_module_reports_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.py"), "def f(:\n").unwrap();
        let root = SourceRoot::new(dir.path());
        let err = root.module("broken").unwrap_err();
        assert!(err.to_string().contains("broken.py"));
    }
}
