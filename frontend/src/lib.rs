pub mod ast;
pub mod collect;
pub mod config;
pub mod driver;
pub mod error;
pub mod lower;
pub mod names;
pub mod python_ast;
pub mod resolve;
pub mod source;
pub mod thir;

// Re-export for convenience
pub use config::{AnalyzerOptions, LogLevel};
pub use driver::{Frontend, FrontendOutput};
pub use error::{FrontendError, Result};
pub use lower::Translator;
pub use thir::{ThExpr, ThStmt};
