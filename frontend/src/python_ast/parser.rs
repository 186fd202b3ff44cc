use pyo3::prelude::*;
use pyo3::types::PyModule;

use crate::error::{FrontendError, Result};

/// Hand `source` to the host parser (CPython's `ast.parse`) and return the
/// resulting tree as a Python object graph, positions included. The converter
/// turns it into the crate-owned AST; nothing else looks at these objects.
///
/// An interpreter without an importable `ast` module surfaces as an error
/// rather than a crash; a syntactically invalid source is a parse error for
/// that file.
pub fn parse_python(source: &str) -> Result<Py<PyAny>> {
    Python::attach(|py| {
        let ast = PyModule::import(py, "ast")?;
        let tree = ast
            .call_method1("parse", (source,))
            .map_err(|err| FrontendError::Parse(err.to_string()))?;
        Ok(tree.unbind())
    })
}
