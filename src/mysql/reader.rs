// ABOUTME: MySQL catalog reads used by the dump pipeline
// ABOUTME: Lists databases and tables, fetches CREATE TABLE text, builds row queries

use crate::error::SqlDumpError;
use crate::mysql::quote_identifier;
use anyhow::{Context, Result};
use mysql_async::{prelude::*, Conn};

/// List every database visible to the connected user
pub async fn list_databases(conn: &mut Conn) -> Result<Vec<String>> {
    tracing::info!("Listing MySQL databases");

    let databases: Vec<String> = conn
        .query("SHOW DATABASES")
        .await
        .map_err(|e| SqlDumpError::Query(e.to_string()))
        .context("Failed to list databases")?;

    tracing::info!("Found {} database(s)", databases.len());

    Ok(databases)
}

/// Switch the session to `db_name`
pub async fn use_database(conn: &mut Conn, db_name: &str) -> Result<()> {
    conn.query_drop(format!("USE {}", quote_identifier(db_name)))
        .await
        .map_err(|e| SqlDumpError::Connection(e.to_string()))
        .with_context(|| format!("Failed to switch to database '{}'", db_name))
}

/// List the base tables of the current database
///
/// Views are skipped: their `SHOW CREATE` output has a different shape and
/// their rows belong to the underlying tables.
pub async fn list_tables(conn: &mut Conn, db_name: &str) -> Result<Vec<String>> {
    tracing::info!("Listing tables from MySQL database '{}'", db_name);

    let rows: Vec<(String, String)> = conn
        .query("SHOW FULL TABLES")
        .await
        .map_err(|e| SqlDumpError::Query(e.to_string()))
        .with_context(|| format!("Failed to list tables from database '{}'", db_name))?;

    let tables: Vec<String> = rows
        .into_iter()
        .filter(|(_, table_type)| table_type == "BASE TABLE")
        .map(|(name, _)| name)
        .collect();

    tracing::info!("Found {} table(s) in database '{}'", tables.len(), db_name);

    Ok(tables)
}

/// Fetch the table definition, rewritten to `CREATE TABLE IF NOT EXISTS`
pub async fn create_table_statement(conn: &mut Conn, table_name: &str) -> Result<String> {
    tracing::debug!("Fetching structure of table '{}'", table_name);

    let row: Option<(String, String)> = conn
        .query_first(format!("SHOW CREATE TABLE {}", quote_identifier(table_name)))
        .await
        .map_err(|e| SqlDumpError::Query(e.to_string()))
        .with_context(|| format!("Failed to read structure of table '{}'", table_name))?;

    let (_, create_sql) = row
        .ok_or_else(|| SqlDumpError::Query(format!("Table '{}' not found", table_name)))?;

    Ok(add_if_not_exists(&create_sql))
}

/// Insert `IF NOT EXISTS` after the first `CREATE TABLE`
///
/// # Examples
///
/// ```
/// # use mysql_sqldump::mysql::reader::add_if_not_exists;
/// assert_eq!(
///     add_if_not_exists("CREATE TABLE `t` (id int)"),
///     "CREATE TABLE IF NOT EXISTS `t` (id int)"
/// );
/// ```
pub fn add_if_not_exists(create_sql: &str) -> String {
    if create_sql.starts_with("CREATE TABLE IF NOT EXISTS") {
        return create_sql.to_string();
    }
    create_sql.replacen("CREATE TABLE", "CREATE TABLE IF NOT EXISTS", 1)
}

/// Row query for a table, with the optional predicate appended verbatim
///
/// # Examples
///
/// ```
/// # use mysql_sqldump::mysql::reader::select_rows_query;
/// assert_eq!(select_rows_query("t", None), "SELECT * FROM `t`");
/// assert_eq!(
///     select_rows_query("t", Some("id > 10")),
///     "SELECT * FROM `t` WHERE id > 10"
/// );
/// ```
pub fn select_rows_query(table_name: &str, where_clause: Option<&str>) -> String {
    let query = format!("SELECT * FROM {}", quote_identifier(table_name));
    match where_clause.map(str::trim) {
        Some(predicate) if !predicate.is_empty() => format!("{} WHERE {}", query, predicate),
        _ => query,
    }
}
