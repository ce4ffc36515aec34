// ABOUTME: Progress and timing hooks for the dump pipeline
// ABOUTME: Default implementation reports through tracing

use chrono::{DateTime, Local};
use std::time::Duration;

/// Receives progress notifications while a dump runs
///
/// All methods default to doing nothing.
pub trait DumpObserver: Send + Sync {
    fn on_start(&self, _started_at: &DateTime<Local>) {}

    fn on_database(&self, _database: &str, _tables: usize) {}

    fn on_table(&self, _database: &str, _table: &str, _rows: u64) {}

    fn on_finish(&self, _elapsed: Duration) {}
}

/// Logs dump progress at INFO level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DumpObserver for TracingObserver {
    fn on_start(&self, started_at: &DateTime<Local>) {
        tracing::info!(
            "[dump] start at {}",
            started_at.format(super::format::TIMESTAMP_FORMAT)
        );
    }

    fn on_database(&self, database: &str, tables: usize) {
        tracing::info!("Dumping {} table(s) from database '{}'", tables, database);
    }

    fn on_table(&self, database: &str, table: &str, rows: u64) {
        tracing::info!("✓ Dumped '{}.{}' ({} rows)", database, table, rows);
    }

    fn on_finish(&self, elapsed: Duration) {
        tracing::info!(
            "[dump] end at {}, cost {:?}",
            Local::now().format(super::format::TIMESTAMP_FORMAT),
            elapsed
        );
    }
}

/// Ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl DumpObserver for SilentObserver {}
