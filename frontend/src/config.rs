//! Analyzer configuration.
//!
//! Options arrive from an optional JSON file plus CLI overrides; everything is
//! resolved once, validated before any lowering begins, and passed by value
//! into the components that need it. Most values are advisory to the frontend
//! and are carried for the backend.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{FrontendError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    None,
    ResultOnly,
    #[default]
    Reduced,
    Full,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::None => "none",
            LogLevel::ResultOnly => "result-only",
            LogLevel::Reduced => "reduced",
            LogLevel::Full => "full",
        }
    }

    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::None => log::LevelFilter::Off,
            LogLevel::ResultOnly => log::LevelFilter::Error,
            LogLevel::Reduced => log::LevelFilter::Warn,
            LogLevel::Full => log::LevelFilter::Info,
        }
    }
}

impl FromStr for LogLevel {
    type Err = FrontendError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(LogLevel::None),
            "result-only" => Ok(LogLevel::ResultOnly),
            "reduced" => Ok(LogLevel::Reduced),
            "full" => Ok(LogLevel::Full),
            _ => Err(FrontendError::Config(format!(
                "unknown log level '{s}' (expected none, result-only, reduced, or full)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnalyzerOptions {
    /// Entry script of the project under analysis. Required.
    pub entry_path: Option<PathBuf>,
    /// Root of the bundled stdlib/Torch stub library. Required.
    pub lib_path: Option<PathBuf>,
    /// Where these options were read from, if anywhere.
    pub config_path: Option<PathBuf>,
    /// Virtual-environment directory to prune while collecting.
    pub venv_path: Option<PathBuf>,
    #[serde(default)]
    pub log_level: LogLevel,
    /// Dump the lowered IR of every module.
    #[serde(default, rename = "extractIR")]
    pub extract_ir: bool,
    /// Lower `assert` statements to `Pass`.
    #[serde(default = "default_true")]
    pub ignore_assert: bool,
    /// Advisory to the backend: check constraints as they are produced.
    #[serde(default)]
    pub immediate_constraint_check: bool,
    /// Opaque per-script arguments, forwarded to the backend.
    #[serde(default)]
    pub python_cmd_args: HashMap<String, serde_json::Value>,
    /// Subcommand selector, forwarded to the backend.
    #[serde(default)]
    pub python_subcommand: String,
}

fn default_true() -> bool {
    true
}

impl AnalyzerOptions {
    /// Options with the documented defaults (notably `ignoreAssert` = true),
    /// as parsing an empty config would produce.
    pub fn with_defaults() -> Self {
        AnalyzerOptions {
            ignore_assert: true,
            ..Default::default()
        }
    }

    /// Read options from a JSON file. Parse failures are configuration
    /// errors, reported before any lowering starts.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FrontendError::Config(format!("cannot read config {}: {e}", path.display()))
        })?;
        let mut options: AnalyzerOptions = serde_json::from_str(&text).map_err(|e| {
            FrontendError::Config(format!("bad config {}: {e}", path.display()))
        })?;
        options.config_path = Some(path.to_path_buf());
        Ok(options)
    }

    /// Check the resolved options. Both paths are required; the entry must be
    /// a Python file and the library root a directory.
    pub fn validate(&self) -> Result<()> {
        let entry = self
            .entry_path
            .as_deref()
            .ok_or_else(|| FrontendError::Config("entryPath is required".to_string()))?;
        if !entry.is_file() {
            return Err(FrontendError::Config(format!(
                "entry path is not a file: {}",
                entry.display()
            )));
        }
        let is_py = entry
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("py"))
            .unwrap_or(false);
        if !is_py {
            return Err(FrontendError::Config(format!(
                "entry path must be a Python (.py) file: {}",
                entry.display()
            )));
        }

        let lib = self
            .lib_path
            .as_deref()
            .ok_or_else(|| FrontendError::Config("libPath is required".to_string()))?;
        if !lib.is_dir() {
            return Err(FrontendError::Config(format!(
                "library path is not a directory: {}",
                lib.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let options = AnalyzerOptions::default();
        assert!(!options.extract_ir);
        assert_eq!(options.log_level, LogLevel::Reduced);
        // ignore_assert defaults to true only through serde; the plain
        // Default is false, so JSON parsing is the source of truth
        let parsed: AnalyzerOptions = serde_json::from_str("{}").unwrap();
        assert!(parsed.ignore_assert);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "entryPath": "main.py",
            "libPath": "pylib",
            "logLevel": "result-only",
            "extractIR": true,
            "ignoreAssert": false,
            "immediateConstraintCheck": true,
            "pythonCmdArgs": {"batch_size": 8},
            "pythonSubcommand": "train"
        }"#;
        let options: AnalyzerOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.entry_path.as_deref(), Some(Path::new("main.py")));
        assert_eq!(options.log_level, LogLevel::ResultOnly);
        assert!(options.extract_ir);
        assert!(!options.ignore_assert);
        assert!(options.immediate_constraint_check);
        assert_eq!(options.python_cmd_args["batch_size"], 8);
        assert_eq!(options.python_subcommand, "train");
    }

    #[test]
    fn test_unknown_keys_are_config_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(br#"{"entryPth": "oops.py"}"#)
            .unwrap();
        let err = AnalyzerOptions::from_json_file(&path).unwrap_err();
        assert!(matches!(err, FrontendError::Config(_)));
    }

    #[test]
    fn test_validate_requires_paths() {
        let err = AnalyzerOptions::default().validate().unwrap_err();
        assert!(err.to_string().contains("entryPath"));

        let dir = TempDir::new().unwrap();
        let entry = dir.path().join("main.py");
        std::fs::File::create(&entry)
            .unwrap()
            .write_all(b"x = 1\n")
            .unwrap();
        let options = AnalyzerOptions {
            entry_path: Some(entry),
            lib_path: Some(dir.path().join("missing")),
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_log_level_round_trip() {
        for level in [
            LogLevel::None,
            LogLevel::ResultOnly,
            LogLevel::Reduced,
            LogLevel::Full,
        ] {
            assert_eq!(level.as_str().parse::<LogLevel>().unwrap(), level);
        }
        assert!("verbose".parse::<LogLevel>().is_err());
    }
}
