// ABOUTME: Statement execution seam for the replayer
// ABOUTME: MySQL implementation plus a wrapper adding dry-run and statement logging

use crate::error::SqlDumpError;
use mysql_async::{prelude::*, Conn};

/// Runs one SQL statement against a target
#[allow(async_fn_in_trait)]
pub trait StatementExecutor {
    async fn execute(&mut self, statement: &str) -> Result<(), SqlDumpError>;
}

impl StatementExecutor for Conn {
    async fn execute(&mut self, statement: &str) -> Result<(), SqlDumpError> {
        self.query_drop(statement)
            .await
            .map_err(|e| SqlDumpError::execution(statement, e.to_string()))
    }
}

impl<E: StatementExecutor> StatementExecutor for &mut E {
    async fn execute(&mut self, statement: &str) -> Result<(), SqlDumpError> {
        (**self).execute(statement).await
    }
}

/// Executor that accepts everything without doing anything
///
/// Stands in for a connection during dry runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullExecutor;

impl StatementExecutor for NullExecutor {
    async fn execute(&mut self, _statement: &str) -> Result<(), SqlDumpError> {
        Ok(())
    }
}

/// Wraps an executor with dry-run and statement logging behavior
pub struct SessionExecutor<E> {
    inner: E,
    dry_run: bool,
    debug: bool,
}

impl<E: StatementExecutor> SessionExecutor<E> {
    pub fn new(inner: E, dry_run: bool, debug: bool) -> Self {
        Self {
            inner,
            dry_run,
            debug,
        }
    }
}

impl<E: StatementExecutor> StatementExecutor for SessionExecutor<E> {
    async fn execute(&mut self, statement: &str) -> Result<(), SqlDumpError> {
        if self.debug {
            tracing::info!("[query]\n{}", statement);
        }

        if self.dry_run {
            tracing::debug!("[dry-run] skipping statement ({} bytes)", statement.len());
            return Ok(());
        }

        self.inner.execute(statement).await
    }
}
