// ABOUTME: Error kinds raised while dumping and sourcing SQL
// ABOUTME: Wrapped in anyhow at the command layer, recoverable via downcast_ref

use thiserror::Error;

/// Failure kinds surfaced by the dump and restore pipelines
///
/// Every kind aborts the current operation. Nothing already written to the
/// sink is retracted.
#[derive(Error, Debug)]
pub enum SqlDumpError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Scan error: {0}")]
    Scan(String),

    #[error("unsupported type: {type_name}")]
    UnsupportedType { type_name: String },

    #[error("Malformed statement: {0}")]
    MalformedStatement(String),

    #[error("Execution error: {message} (statement: {statement})")]
    Execution { statement: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SqlDumpError {
    /// Build an execution error, keeping only a prefix of very long statements
    pub fn execution(statement: &str, message: impl Into<String>) -> Self {
        const PREVIEW: usize = 200;
        let statement = match statement.char_indices().nth(PREVIEW) {
            Some((idx, _)) => format!("{}...", &statement[..idx]),
            None => statement.to_string(),
        };
        SqlDumpError::Execution {
            statement,
            message: message.into(),
        }
    }
}
