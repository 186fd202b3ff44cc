use thiserror::Error;

use crate::source::SourceRange;

#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("Parse error: {0}")]
    Parse(String),

    /// A node appeared in a position the translator cannot lower (e.g. an
    /// augmented assignment to a call). Fatal for the file it came from.
    #[error("Malformed node{}: {message}", format_range(.range))]
    MalformedNode {
        message: String,
        range: Option<SourceRange>,
    },

    /// A node class outside the dispatch tables.
    #[error("Unknown node type '{kind}'{}", format_range(.range))]
    UnknownNode {
        kind: String,
        range: Option<SourceRange>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Module not found: '{0}'")]
    ModuleNotFound(String),

    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("Python error: {0}")]
    PythonError(#[from] pyo3::PyErr),
}

impl FrontendError {
    pub fn malformed(message: impl Into<String>, range: Option<SourceRange>) -> Self {
        FrontendError::MalformedNode {
            message: message.into(),
            range,
        }
    }
}

pub type Result<T> = std::result::Result<T, FrontendError>;

fn format_range(range: &Option<SourceRange>) -> String {
    match range {
        Some(r) => format!(" at {r}"),
        None => String::new(),
    }
}
