//! Frontend orchestration: configuration in, module maps out.

use std::path::PathBuf;

use indexmap::IndexMap;

use crate::collect::{collect_dir, qual_path_of};
use crate::config::AnalyzerOptions;
use crate::error::{FrontendError, Result};
use crate::source::SourceMap;
use crate::thir::ThStmt;

/// Everything the symbolic backend needs to start executing: the two module
/// maps, the entry module's qualified name, and the source registry for
/// rendering positions.
#[derive(Debug)]
pub struct FrontendOutput {
    pub library: IndexMap<String, ThStmt>,
    pub project: IndexMap<String, ThStmt>,
    pub entry: String,
    pub sources: SourceMap,
    /// Files skipped during collection, with reasons. Non-fatal.
    pub errors: Vec<(PathBuf, FrontendError)>,
}

/// Main frontend driver - validates configuration, collects the bundled
/// library and the project, and designates the entry module.
pub struct Frontend {
    options: AnalyzerOptions,
}

impl Frontend {
    pub fn new(options: AnalyzerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    pub fn run(&self) -> Result<FrontendOutput> {
        self.options.validate()?;

        let entry_path = self.required_path(self.options.entry_path.as_deref())?;
        let lib_root = self.required_path(self.options.lib_path.as_deref())?;

        let entry_path = entry_path.canonicalize()?;
        let project_root = entry_path
            .parent()
            .ok_or_else(|| {
                FrontendError::Config(format!(
                    "entry path has no parent directory: {}",
                    entry_path.display()
                ))
            })?
            .to_path_buf();

        let venv = self.options.venv_path.as_deref();
        let ignore_assert = self.options.ignore_assert;

        let mut sources = SourceMap::new();
        let library = collect_dir(&lib_root, venv, ignore_assert, &mut sources);
        let project = collect_dir(&project_root, venv, ignore_assert, &mut sources);

        let entry = qual_path_of(&project_root, &entry_path).ok_or_else(|| {
            FrontendError::Config(format!(
                "entry path does not name a module: {}",
                entry_path.display()
            ))
        })?;

        // A project file that fails to lower is skipped, but the entry module
        // failing is fatal: there is nothing to analyze
        if !project.map.contains_key(&entry) {
            let cause = project
                .errors
                .iter()
                .find(|(path, _)| *path == entry_path)
                .map(|(_, err)| err.to_string());
            return Err(match cause {
                Some(cause) => FrontendError::Parse(format!(
                    "entry module {} failed to lower: {cause}",
                    entry_path.display()
                )),
                None => FrontendError::ModuleNotFound(entry),
            });
        }

        let mut errors = library.errors;
        errors.extend(project.errors);

        Ok(FrontendOutput {
            library: library.map,
            project: project.map,
            entry,
            sources,
            errors,
        })
    }

    fn required_path(&self, path: Option<&std::path::Path>) -> Result<PathBuf> {
        path.map(|p| p.to_path_buf())
            .ok_or_else(|| FrontendError::Config("missing required path".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{resolve_module, Resolution};
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_file(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::File::create(&path)
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();
    }

    fn options(dir: &TempDir) -> AnalyzerOptions {
        AnalyzerOptions {
            entry_path: Some(dir.path().join("proj/main.py")),
            lib_path: Some(dir.path().join("pylib")),
            ..AnalyzerOptions::with_defaults()
        }
    }

    #[test]
    fn test_run_produces_maps_and_entry() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "pylib/builtins.py", "PI = 3\n");
        write_file(dir.path(), "pylib/torch/__init__.py", "rank = 0\n");
        write_file(dir.path(), "proj/main.py", "import torch\nx = torch.rank\n");
        write_file(dir.path(), "proj/util.py", "y = 1\n");

        let output = Frontend::new(options(&dir)).run().unwrap();
        assert_eq!(output.entry, "main");
        let lib_keys: Vec<&str> = output.library.keys().map(String::as_str).collect();
        assert_eq!(lib_keys, ["builtins", "torch"]);
        let proj_keys: Vec<&str> = output.project.keys().map(String::as_str).collect();
        assert_eq!(proj_keys, ["main", "util"]);
        assert!(output.errors.is_empty());
        assert!(output.sources.len() >= 4);
    }

    #[test]
    fn test_project_shadows_library_end_to_end() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "pylib/util.py", "side = \"lib\"\n");
        write_file(dir.path(), "proj/util.py", "side = \"proj\"\n");
        write_file(dir.path(), "proj/main.py", "import util\n");

        let output = Frontend::new(options(&dir)).run().unwrap();
        match resolve_module(&output.project, &output.library, "util") {
            Resolution::Module { from_project, .. } => assert!(from_project),
            Resolution::Missing => panic!("expected util to resolve"),
        }
    }

    #[test]
    fn test_missing_entry_is_config_error() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "pylib/a.py", "x = 1\n");
        let err = Frontend::new(options(&dir)).run().unwrap_err();
        assert!(matches!(err, FrontendError::Config(_)));
    }

    #[test]
    fn test_broken_entry_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "pylib/a.py", "x = 1\n");
        write_file(dir.path(), "proj/main.py", "def f(:\n");
        let err = Frontend::new(options(&dir)).run().unwrap_err();
        assert!(err.to_string().contains("entry module"));
    }

    #[test]
    fn test_sibling_failures_are_not_fatal() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "pylib/a.py", "x = 1\n");
        write_file(dir.path(), "proj/main.py", "x = 1\n");
        write_file(dir.path(), "proj/broken.py", "def f(:\n");
        let output = Frontend::new(options(&dir)).run().unwrap();
        assert_eq!(output.entry, "main");
        assert_eq!(output.errors.len(), 1);
    }
}
