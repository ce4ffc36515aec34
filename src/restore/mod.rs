// ABOUTME: Replays a ';'-delimited SQL stream against a target in one transaction
// ABOUTME: Optionally merges runs of single-row INSERTs before executing them

pub mod executor;
pub mod merge;
pub mod statements;

use crate::config::SourceOptions;
use crate::error::SqlDumpError;
use crate::mysql::quote_identifier;
use anyhow::{Context, Result};
use executor::{SessionExecutor, StatementExecutor};
use statements::{trim_statement, StatementReader};
use std::time::{Duration, Instant};
use tokio::io::AsyncBufRead;

pub use executor::NullExecutor;

/// Totals reported once a replay completes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Statements read from the input
    pub statements_read: u64,
    /// Statements sent to the target, merged INSERTs counting once
    pub statements_executed: u64,
    /// INSERT statements folded into another one
    pub inserts_merged: u64,
    pub dry_run: bool,
    pub elapsed: Duration,
}

/// Pulls trimmed, non-empty statements and allows pushing one back
struct StatementQueue<R> {
    reader: StatementReader<R>,
    pending: Option<String>,
    read: u64,
}

impl<R: AsyncBufRead + Unpin> StatementQueue<R> {
    async fn next(&mut self) -> Result<Option<String>, SqlDumpError> {
        if let Some(statement) = self.pending.take() {
            return Ok(Some(statement));
        }
        while let Some(raw) = self.reader.next_statement().await? {
            let statement = trim_statement(&raw);
            // A bare ";" carries nothing to execute
            if statement.is_empty() || statement == ";" {
                continue;
            }
            self.read += 1;
            return Ok(Some(statement.to_string()));
        }
        Ok(None)
    }

    fn push_back(&mut self, statement: String) {
        self.pending = Some(statement);
    }
}

/// Execute every statement from `input` inside one transaction
///
/// The session runs `SET autocommit=0;` first, and `COMMIT;` followed by
/// `SET autocommit=1;` once the input is exhausted. When `database` is
/// given, `USE` is issued before anything else.
///
/// With `merge_insert > 1`, up to that many consecutive INSERT statements
/// into the same table are executed as one. A statement that ends a batch
/// early is executed on its own right after the batch.
///
/// # Errors
///
/// The first read, merge, execution or `COMMIT` failure aborts the replay. Unless
/// `rollback_on_error` is off, `ROLLBACK;` is attempted before autocommit
/// is restored and the original error is returned.
pub async fn replay<R, E>(
    input: R,
    executor: E,
    database: Option<&str>,
    options: &SourceOptions,
) -> Result<ReplaySummary>
where
    R: AsyncBufRead + Unpin,
    E: StatementExecutor,
{
    options.validate()?;

    let started = Instant::now();
    tracing::info!(
        "[source] start (dry_run={}, merge_insert={})",
        options.dry_run,
        options.merge_insert
    );

    let mut session = SessionExecutor::new(executor, options.dry_run, options.debug);
    let mut queue = StatementQueue {
        reader: StatementReader::new(input),
        pending: None,
        read: 0,
    };
    let mut summary = ReplaySummary {
        dry_run: options.dry_run,
        ..Default::default()
    };

    if let Some(db) = database {
        session
            .execute(&format!("USE {};", quote_identifier(db)))
            .await
            .with_context(|| format!("Failed to switch to database '{}'", db))?;
    }

    session
        .execute("SET autocommit=0;")
        .await
        .context("Failed to disable autocommit")?;

    let mut outcome = execute_all(&mut queue, &mut session, options, &mut summary)
        .await
        .context("Failed to source SQL input");
    summary.statements_read = queue.read;

    if outcome.is_ok() {
        outcome = session
            .execute("COMMIT;")
            .await
            .context("Failed to commit sourced statements");
    }

    if let Err(e) = outcome {
        if options.rollback_on_error {
            if let Err(rollback) = session.execute("ROLLBACK;").await {
                tracing::warn!("ROLLBACK after failed replay also failed: {}", rollback);
            }
        }
        if let Err(restore) = session.execute("SET autocommit=1;").await {
            tracing::warn!("Could not re-enable autocommit: {}", restore);
        }
        return Err(e);
    }

    session
        .execute("SET autocommit=1;")
        .await
        .context("Failed to re-enable autocommit")?;

    summary.elapsed = started.elapsed();
    tracing::info!(
        "[source] end, {} statement(s) executed, cost {:?}",
        summary.statements_executed,
        summary.elapsed
    );

    Ok(summary)
}

async fn execute_all<R, E>(
    queue: &mut StatementQueue<R>,
    session: &mut SessionExecutor<E>,
    options: &SourceOptions,
    summary: &mut ReplaySummary,
) -> Result<(), SqlDumpError>
where
    R: AsyncBufRead + Unpin,
    E: StatementExecutor,
{
    while let Some(statement) = queue.next().await? {
        let statement = if options.merging() && merge::is_insert(&statement) {
            let batch = collect_batch(queue, statement, options.merge_insert).await?;
            summary.inserts_merged += batch.len() as u64 - 1;
            if batch.len() == 1 {
                batch.into_iter().next().unwrap_or_default()
            } else {
                merge::merge_inserts(&batch)?
            }
        } else {
            statement
        };

        session.execute(&statement).await?;
        summary.statements_executed += 1;
    }
    Ok(())
}

/// Gather up to `limit` consecutive INSERTs into the same table as `first`
async fn collect_batch<R>(
    queue: &mut StatementQueue<R>,
    first: String,
    limit: usize,
) -> Result<Vec<String>, SqlDumpError>
where
    R: AsyncBufRead + Unpin,
{
    let target = merge::insert_target(&first).map(str::to_string);
    let mut batch = vec![first];

    while batch.len() < limit {
        let Some(next) = queue.next().await? else {
            break;
        };
        let same_table =
            merge::is_insert(&next) && merge::insert_target(&next).map(str::to_string) == target;
        if !same_table {
            queue.push_back(next);
            break;
        }
        batch.push(next);
    }

    Ok(batch)
}
