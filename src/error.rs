//! Error types.
//!
//! `AppError` is what reaches the user (message + process exit code). The
//! narrower errors below carry structured detail for the engine and the
//! catalog importer and convert into `AppError` at the boundary.

use std::path::PathBuf;

use crate::domain::{CatalogKind, InputField};

/// Exit code for bad input: invalid parameters, catalog files, exports.
pub const EXIT_INPUT: u8 = 2;
/// Exit code for terminal/runtime failures.
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// A case input rejected by the metrics engine.
#[derive(Debug, Clone, PartialEq)]
pub struct InputError {
    pub field: InputField,
    pub value: f64,
    pub reason: String,
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid `{}` ({}) = {}: {}",
            self.field.name(),
            self.field.label(),
            self.value,
            self.reason
        )
    }
}

impl std::error::Error for InputError {}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        AppError::new(EXIT_INPUT, err.to_string())
    }
}

/// A catalog file that could not be imported.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestError {
    /// The file could not be opened or read.
    Io { path: PathBuf, message: String },
    /// The header row could not be parsed.
    Header { message: String },
    /// One or more required columns are absent. All of them are listed.
    MissingColumns {
        catalog: CatalogKind,
        columns: Vec<&'static str>,
    },
    /// A data row could not be turned into a catalog row.
    Row { line: usize, message: String },
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::Io { path, message } => {
                write!(f, "Failed to read catalog file '{}': {message}", path.display())
            }
            IngestError::Header { message } => write!(f, "Failed to read catalog headers: {message}"),
            IngestError::MissingColumns { catalog, columns } => write!(
                f,
                "{} is missing required columns: {}",
                catalog.display_name(),
                columns.join(", ")
            ),
            IngestError::Row { line, message } => write!(f, "Line {line}: {message}"),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        AppError::new(EXIT_INPUT, err.to_string())
    }
}
