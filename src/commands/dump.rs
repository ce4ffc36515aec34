// ABOUTME: Dump command: connects, opens the destination, streams the dump
// ABOUTME: Shows a spinner on stderr while tables are being written

use crate::config::DumpOptions;
use crate::dump::{self, DumpObserver, DumpSummary, TracingObserver};
use crate::mysql::{connect_mysql, extract_database_name};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Spinner naming the table being dumped, on top of tracing output
struct SpinnerObserver {
    spinner: ProgressBar,
    log: TracingObserver,
}

impl SpinnerObserver {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));
        Self {
            spinner,
            log: TracingObserver,
        }
    }
}

impl DumpObserver for SpinnerObserver {
    fn on_start(&self, started_at: &DateTime<Local>) {
        self.log.on_start(started_at);
    }

    fn on_database(&self, database: &str, tables: usize) {
        self.spinner
            .set_message(format!("{} ({} tables)", database, tables));
        self.spinner.suspend(|| self.log.on_database(database, tables));
    }

    fn on_table(&self, database: &str, table: &str, rows: u64) {
        self.spinner.inc(1);
        self.spinner
            .set_message(format!("{}.{}: {} rows", database, table, rows));
        self.spinner
            .suspend(|| self.log.on_table(database, table, rows));
    }

    fn on_finish(&self, elapsed: Duration) {
        self.spinner.finish_and_clear();
        self.log.on_finish(elapsed);
    }
}

/// Dump from `url` into `output` (a file path) or stdout
pub async fn dump(url: &str, options: &DumpOptions, output: Option<&str>) -> Result<DumpSummary> {
    let url_database = extract_database_name(url);
    // Reject bad option combinations before opening anything
    options.resolve(url_database.as_deref())?;

    let mut conn = connect_mysql(url).await?;
    let observer = SpinnerObserver::new();

    let result = match output {
        Some(path) => {
            tracing::info!("Writing dump to {}", path);
            let file = tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Failed to create output file {}", path))?;
            let dumped = dump::dump(
                &mut conn,
                url_database.as_deref(),
                options,
                file,
                &observer,
            )
            .await;
            match dumped {
                Ok((file, summary)) => {
                    file.sync_all()
                        .await
                        .with_context(|| format!("Failed to sync output file {}", path))?;
                    Ok(summary)
                }
                Err(e) => Err(e),
            }
        }
        None => {
            let dumped = dump::dump(
                &mut conn,
                url_database.as_deref(),
                options,
                tokio::io::stdout(),
                &observer,
            )
            .await;
            match dumped {
                Ok((mut stdout, summary)) => {
                    stdout.flush().await.context("Failed to flush stdout")?;
                    Ok(summary)
                }
                Err(e) => Err(e),
            }
        }
    };

    observer.spinner.finish_and_clear();

    if let Err(e) = conn.disconnect().await {
        tracing::warn!("Failed to close MySQL connection cleanly: {}", e);
    }

    let summary = result?;
    tracing::info!(
        "✓ Dumped {} table(s), {} row(s), {} byte(s) from {} database(s)",
        summary.tables,
        summary.rows,
        summary.bytes_written,
        summary.databases
    );
    Ok(summary)
}
