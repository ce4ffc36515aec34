// ABOUTME: Immutable option records for the dump and source operations
// ABOUTME: Validated once before work starts; optionally loaded from a TOML file

use crate::error::SqlDumpError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Which databases a dump covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseSelection {
    All,
    Named(Vec<String>),
}

/// Which tables of each database a dump covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSelection {
    All,
    Named(Vec<String>),
}

/// Options recognized by the dump operation
///
/// Defaults: the connection URL's database, every table, no data, no
/// `DROP TABLE`, no structure, no row filter, ids kept as-is.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DumpOptions {
    /// Databases to dump; ignored when `all_databases` is set
    pub databases: Vec<String>,
    pub all_databases: bool,
    /// Tables to dump in each database; ignored when `all_tables` is set
    pub tables: Vec<String>,
    pub all_tables: bool,
    /// Emit `INSERT` statements for rows
    pub data: bool,
    /// Emit `DROP TABLE IF EXISTS` before each table
    pub drop_table: bool,
    /// Emit `CREATE TABLE IF NOT EXISTS` for each table
    pub table_structure: bool,
    /// Predicate appended verbatim after `WHERE` in every row query
    #[serde(rename = "where")]
    pub where_clause: String,
    /// Render integer columns named `id` as `0`
    pub zero_primary_key: bool,
}

/// Options after precedence rules have been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDumpOptions {
    pub databases: DatabaseSelection,
    pub tables: TableSelection,
    pub data: bool,
    pub drop_table: bool,
    pub table_structure: bool,
    pub where_clause: Option<String>,
    pub zero_primary_key: bool,
}

impl DumpOptions {
    /// Apply precedence rules and reject unusable combinations
    ///
    /// `all_databases` wins over explicit databases and `all_tables` wins
    /// over explicit tables. With neither databases nor `all_databases`, the
    /// database named in `url_database` is used; if that is missing too the
    /// options are rejected.
    pub fn resolve(&self, url_database: Option<&str>) -> Result<ResolvedDumpOptions, SqlDumpError> {
        let databases = if self.all_databases {
            DatabaseSelection::All
        } else if !self.databases.is_empty() {
            for db in &self.databases {
                validate_identifier("database", db)?;
            }
            DatabaseSelection::Named(self.databases.clone())
        } else {
            match url_database {
                Some(db) if !db.is_empty() => DatabaseSelection::Named(vec![db.to_string()]),
                _ => {
                    return Err(SqlDumpError::Config(
                        "No database selected: pass --databases, --all-databases, \
                         or include a database in the connection URL"
                            .to_string(),
                    ))
                }
            }
        };

        let tables = if self.all_tables || self.tables.is_empty() {
            TableSelection::All
        } else {
            for table in &self.tables {
                validate_identifier("table", table)?;
            }
            TableSelection::Named(self.tables.clone())
        };

        let where_clause = match self.where_clause.trim() {
            "" => None,
            predicate => Some(predicate.to_string()),
        };

        Ok(ResolvedDumpOptions {
            databases,
            tables,
            data: self.data,
            drop_table: self.drop_table,
            table_structure: self.table_structure,
            where_clause,
            zero_primary_key: self.zero_primary_key,
        })
    }
}

/// Options recognized by the source (restore) operation
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SourceOptions {
    /// Parse and log statements without executing them
    pub dry_run: bool,
    /// Fold up to this many consecutive INSERTs into one; 1 disables merging
    pub merge_insert: usize,
    /// Log every statement before it runs
    pub debug: bool,
    /// Issue `ROLLBACK;` when a statement fails
    pub rollback_on_error: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            merge_insert: 1,
            debug: false,
            rollback_on_error: true,
        }
    }
}

impl SourceOptions {
    pub fn validate(&self) -> Result<(), SqlDumpError> {
        if self.merge_insert == 0 {
            return Err(SqlDumpError::Config(
                "merge_insert must be at least 1 (1 disables merging)".to_string(),
            ));
        }
        Ok(())
    }

    pub fn merging(&self) -> bool {
        self.merge_insert > 1
    }
}

/// Identifiers are embedded in backticks, so a backtick would end the quote
fn validate_identifier(kind: &str, name: &str) -> Result<(), SqlDumpError> {
    if name.trim().is_empty() {
        return Err(SqlDumpError::Config(format!("Empty {} name", kind)));
    }
    if name.contains('`') || name.contains('\0') {
        return Err(SqlDumpError::Config(format!(
            "Invalid {} name '{}': backticks and NUL bytes are not allowed",
            kind, name
        )));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OptionsFile {
    #[serde(default)]
    dump: DumpOptions,
    #[serde(default)]
    source: SourceOptions,
}

/// Load `[dump]` and `[source]` tables from a TOML file
///
/// Missing tables and keys fall back to their defaults.
pub fn load_options_from_file(path: &str) -> Result<(DumpOptions, SourceOptions)> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path))?;
    let parsed: OptionsFile =
        toml::from_str(&raw).with_context(|| format!("Failed to parse TOML config at {}", path))?;
    Ok((parsed.dump, parsed.source))
}
