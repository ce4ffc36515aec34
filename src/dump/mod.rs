// ABOUTME: Dump pipeline: walks databases and tables and streams SQL to a sink
// ABOUTME: Rows are encoded on the caller's task and written by a background writer

pub mod format;
pub mod observer;

use crate::config::{DatabaseSelection, DumpOptions, ResolvedDumpOptions, TableSelection};
use crate::error::SqlDumpError;
use crate::literal::{ColumnDescriptor, EncodeOptions, LiteralEncoder};
use crate::mysql::{columns::describe_columns, reader};
use crate::sink::BufferedSink;
use crate::writer::RowWriter;
use anyhow::{Context, Result};
use chrono::Local;
use mysql_async::{prelude::*, Conn, Value};
use std::time::{Duration, Instant};
use tokio::io::AsyncWrite;

pub use observer::{DumpObserver, SilentObserver, TracingObserver};

/// Schemas that hold server metadata rather than user data
const SYSTEM_DATABASES: &[&str] = &["information_schema", "performance_schema", "sys"];

/// Totals reported once a dump completes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpSummary {
    pub databases: usize,
    pub tables: usize,
    pub rows: u64,
    pub bytes_written: u64,
    pub elapsed: Duration,
}

/// Receives rows, in fetch order, from a [`DumpSource`]
#[allow(async_fn_in_trait)]
pub trait RowVisitor {
    async fn visit_row(&mut self, columns: &[ColumnDescriptor], values: &[Value]) -> Result<()>;
}

/// Where a dump reads catalog information and rows from
#[allow(async_fn_in_trait)]
pub trait DumpSource {
    async fn list_databases(&mut self) -> Result<Vec<String>>;

    async fn use_database(&mut self, database: &str) -> Result<()>;

    async fn list_tables(&mut self, database: &str) -> Result<Vec<String>>;

    /// `CREATE TABLE IF NOT EXISTS` text for `table`, without trailing `;`
    async fn create_table_statement(&mut self, table: &str) -> Result<String>;

    /// Run `query` and feed each row to `visitor`; returns the row count
    async fn fetch_rows<V: RowVisitor>(&mut self, query: &str, visitor: &mut V) -> Result<u64>;
}

impl DumpSource for Conn {
    async fn list_databases(&mut self) -> Result<Vec<String>> {
        reader::list_databases(self).await
    }

    async fn use_database(&mut self, database: &str) -> Result<()> {
        reader::use_database(self, database).await
    }

    async fn list_tables(&mut self, database: &str) -> Result<Vec<String>> {
        reader::list_tables(self, database).await
    }

    async fn create_table_statement(&mut self, table: &str) -> Result<String> {
        reader::create_table_statement(self, table).await
    }

    async fn fetch_rows<V: RowVisitor>(&mut self, query: &str, visitor: &mut V) -> Result<u64> {
        tracing::debug!("Streaming rows: {}", query);

        let mut result = self
            .query_iter(query)
            .await
            .map_err(|e| SqlDumpError::Query(e.to_string()))
            .with_context(|| format!("Failed to run row query: {}", query))?;

        let columns = result
            .columns()
            .map(|columns| describe_columns(&columns))
            .unwrap_or_default();

        let mut count = 0u64;
        while let Some(mut row) = result
            .next()
            .await
            .map_err(|e| SqlDumpError::Scan(e.to_string()))
            .context("Failed to read row")?
        {
            let mut values = Vec::with_capacity(row.len());
            for idx in 0..row.len() {
                let value: Value = row.take(idx).ok_or_else(|| {
                    SqlDumpError::Scan(format!("column {} missing from fetched row", idx))
                })?;
                values.push(value);
            }
            visitor.visit_row(&columns, &values).await?;
            count += 1;
        }

        Ok(count)
    }
}

/// Encodes each visited row as an INSERT and hands it to the writer
struct InsertVisitor<'a, W> {
    encoder: &'a LiteralEncoder,
    table: &'a str,
    writer: &'a RowWriter<W>,
}

impl<W> RowVisitor for InsertVisitor<'_, W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn visit_row(&mut self, columns: &[ColumnDescriptor], values: &[Value]) -> Result<()> {
        let sql = format::format_insert(self.encoder, self.table, columns, values)
            .with_context(|| format!("Failed to encode a row of table '{}'", self.table))?;
        self.writer.send(sql).await
    }
}

/// Dump the selected databases and tables into `output`
///
/// Output written before a failure stays in `output`; the writer is always
/// drained and flushed before this returns. On success the output handle is
/// handed back together with the run's totals.
///
/// # Errors
///
/// Fails on invalid options, on any catalog or row query failure, and on
/// the first value the literal encoder rejects.
pub async fn dump<S, W>(
    source: &mut S,
    url_database: Option<&str>,
    options: &DumpOptions,
    output: W,
    observer: &dyn DumpObserver,
) -> Result<(W, DumpSummary)>
where
    S: DumpSource,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let resolved = options.resolve(url_database)?;
    let encoder = LiteralEncoder::new(EncodeOptions {
        zero_primary_key: resolved.zero_primary_key,
    })?;

    let started = Instant::now();
    let started_at = Local::now();
    observer.on_start(&started_at);

    let writer = RowWriter::start(BufferedSink::new(output));

    let mut summary = DumpSummary::default();
    let walked = match writer.send(format::dump_header(&started_at)).await {
        Ok(()) => walk(source, &resolved, &encoder, &writer, observer, &mut summary).await,
        Err(e) => Err(e),
    };
    let footer = match walked {
        Ok(()) => writer.send(format::dump_footer(started.elapsed())).await,
        Err(e) => Err(e),
    };
    let finished = writer.finish().await;

    let sink = match (footer, finished) {
        (Ok(()), Ok(sink)) => sink,
        // A dead writer makes every later send fail; its own error is the cause
        (_, Err(sink_error)) => return Err(sink_error),
        (Err(e), Ok(_)) => return Err(e),
    };

    summary.bytes_written = sink.bytes_written();
    summary.elapsed = started.elapsed();
    let output = sink
        .into_inner()
        .await
        .map_err(SqlDumpError::Io)
        .context("Failed to flush dump output")?;

    observer.on_finish(summary.elapsed);

    Ok((output, summary))
}

async fn walk<S, W>(
    source: &mut S,
    options: &ResolvedDumpOptions,
    encoder: &LiteralEncoder,
    writer: &RowWriter<W>,
    observer: &dyn DumpObserver,
    summary: &mut DumpSummary,
) -> Result<()>
where
    S: DumpSource,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let databases = match &options.databases {
        DatabaseSelection::All => source
            .list_databases()
            .await?
            .into_iter()
            .filter(|db| !SYSTEM_DATABASES.contains(&db.to_lowercase().as_str()))
            .collect(),
        DatabaseSelection::Named(databases) => databases.clone(),
    };

    for database in &databases {
        source.use_database(database).await?;

        let tables = match &options.tables {
            TableSelection::All => source.list_tables(database).await?,
            TableSelection::Named(tables) => tables.clone(),
        };
        observer.on_database(database, tables.len());

        writer.send(format::use_statement(database)).await?;

        for table in &tables {
            if options.drop_table {
                writer.send(format::drop_table_statement(table)).await?;
            }

            if options.table_structure {
                let create_sql = source.create_table_statement(table).await?;
                writer
                    .send(format::table_structure_section(table, &create_sql))
                    .await?;
            }

            let mut rows = 0;
            if options.data {
                writer.send(format::records_header(table)).await?;
                let query = reader::select_rows_query(table, options.where_clause.as_deref());
                let mut visitor = InsertVisitor {
                    encoder,
                    table,
                    writer,
                };
                rows = source
                    .fetch_rows(&query, &mut visitor)
                    .await
                    .with_context(|| format!("Failed to dump rows of '{}.{}'", database, table))?;
                writer.send("\n").await?;
            }

            summary.tables += 1;
            summary.rows += rows;
            observer.on_table(database, table, rows);
        }

        summary.databases += 1;
    }

    Ok(())
}
