//! Library collector: walks a directory tree, lowers every Python file, and
//! builds the qualified-path → ThIR map.
//!
//! Per-file failures are logged and the file is skipped; collection never
//! aborts. Virtual environments (either the configured path or any directory
//! carrying a `pyvenv.cfg`) are pruned, as are non-Python files and the
//! `LibCall.py` marker module, which exists only to give names to library
//! primitives.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use pyo3::Python;
use walkdir::{DirEntry, WalkDir};

use crate::ast::AstConverter;
use crate::error::FrontendError;
use crate::lower::Translator;
use crate::python_ast::parse_python;
use crate::source::SourceMap;
use crate::thir::ThStmt;

/// Result of collecting one directory tree.
pub struct CollectedModules {
    pub map: IndexMap<String, ThStmt>,
    /// Files that failed to parse or lower, with the reason. These were
    /// skipped; everything in `map` is good.
    pub errors: Vec<(PathBuf, FrontendError)>,
}

/// Walk `root` and lower every surviving `.py` file. `venv` is an extra
/// directory to prune.
pub fn collect_dir(
    root: &Path,
    venv: Option<&Path>,
    ignore_assert: bool,
    sources: &mut SourceMap,
) -> CollectedModules {
    let mut map = IndexMap::new();
    let mut errors = Vec::new();
    let mut translator = Translator::new(ignore_assert);

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| keep_entry(entry, venv));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping unreadable directory entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_python_file(entry.path()) {
            continue;
        }
        if entry.file_name().to_str() == Some("LibCall.py") {
            continue;
        }

        let Some(qual) = qual_path_of(root, entry.path()) else {
            log::warn!(
                "skipping {}: cannot derive a qualified module path",
                entry.path().display()
            );
            continue;
        };

        match lower_file(entry.path(), &qual, &mut translator, sources) {
            Ok(stmt) => {
                map.insert(qual, stmt);
            }
            Err(err) => {
                log::warn!("skipping {}: {err}", entry.path().display());
                errors.push((entry.path().to_path_buf(), err));
            }
        }
    }

    CollectedModules { map, errors }
}

/// Parse and lower a single file as module `qual`.
pub fn lower_file(
    path: &Path,
    qual: &str,
    translator: &mut Translator,
    sources: &mut SourceMap,
) -> Result<ThStmt, FrontendError> {
    let source = fs::read_to_string(path)?;
    let file_id = sources.intern(path);

    let py_ast = parse_python(&source)?;
    let converter = AstConverter::new(file_id, &source);
    let module = Python::attach(|py| converter.convert_module(py_ast.bind(py), path.to_path_buf()))?;

    translator.translate_module(qual, &module)
}

/// Qualified module path of `path` relative to `root`: `foo/bar.py` becomes
/// `foo.bar`, `foo/__init__.py` collapses to `foo`. A top-level `__init__.py`
/// has no name and yields `None`.
pub fn qual_path_of(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts: Vec<String> = Vec::new();
    for component in relative.components() {
        if let std::path::Component::Normal(s) = component {
            let s = s.to_string_lossy();
            parts.push(s.strip_suffix(".py").unwrap_or(&s).to_string());
        }
    }
    if parts.last().map(String::as_str) == Some("__init__") {
        parts.pop();
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("."))
}

fn keep_entry(entry: &DirEntry, venv: Option<&Path>) -> bool {
    if !entry.file_type().is_dir() {
        return true;
    }
    if let Some(venv) = venv {
        if entry.path() == venv {
            return false;
        }
    }
    // Any directory holding a pyvenv.cfg is a virtual environment
    !entry.path().join("pyvenv.cfg").exists()
}

fn is_python_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "py")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(&path)
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();
    }

    #[test]
    fn test_qual_path_of() {
        let root = Path::new("/lib");
        assert_eq!(
            qual_path_of(root, Path::new("/lib/foo/bar.py")).as_deref(),
            Some("foo.bar")
        );
        assert_eq!(
            qual_path_of(root, Path::new("/lib/foo/__init__.py")).as_deref(),
            Some("foo")
        );
        assert_eq!(qual_path_of(root, Path::new("/lib/__init__.py")), None);
        assert_eq!(
            qual_path_of(root, Path::new("/lib/top.py")).as_deref(),
            Some("top")
        );
    }

    #[test]
    fn test_collect_filters_and_maps() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_file(root, "foo/__init__.py", "x = 1\n");
        write_file(root, "foo/bar.py", "y = 2\n");
        write_file(root, "LibCall.py", "def shape():\n    pass\n");
        write_file(root, "notes.txt", "not python");
        write_file(root, "venv/pyvenv.cfg", "home = /usr\n");
        write_file(root, "venv/lib/mod.py", "z = 3\n");

        let mut sources = SourceMap::new();
        let collected = collect_dir(root, None, true, &mut sources);
        let keys: Vec<&str> = collected.map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["foo", "foo.bar"]);
        assert!(collected.errors.is_empty());
    }

    #[test]
    fn test_collect_explicit_venv_filter() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_file(root, "a.py", "x = 1\n");
        write_file(root, "env/mod.py", "y = 2\n");

        let mut sources = SourceMap::new();
        let venv = root.join("env");
        let collected = collect_dir(root, Some(&venv), true, &mut sources);
        let keys: Vec<&str> = collected.map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a"]);
    }

    #[test]
    fn test_collect_skips_broken_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_file(root, "good.py", "x = 1\n");
        write_file(root, "broken.py", "def f(:\n");

        let mut sources = SourceMap::new();
        let collected = collect_dir(root, None, true, &mut sources);
        let keys: Vec<&str> = collected.map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["good"]);
        assert_eq!(collected.errors.len(), 1);
        assert!(collected.errors[0].0.ends_with("broken.py"));
    }
}
