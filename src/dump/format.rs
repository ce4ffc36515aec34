// ABOUTME: Text layout of a dump: banners, section comments, INSERT statements
// ABOUTME: Pure formatting; no I/O happens here

use crate::error::SqlDumpError;
use crate::literal::{ColumnDescriptor, LiteralEncoder};
use crate::mysql::quote_identifier;
use chrono::{DateTime, Local};
use mysql_async::Value;
use std::borrow::Borrow;
use std::time::Duration;

const RULE: &str = "-- ----------------------------\n";

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn dump_header(started_at: &DateTime<Local>) -> String {
    format!(
        "{rule}-- MySQL Database Dump\n-- Start Time: {}\n{rule}\n",
        started_at.format(TIMESTAMP_FORMAT),
        rule = RULE
    )
}

pub fn dump_footer(elapsed: Duration) -> String {
    format!(
        "{rule}-- Dump completed\n-- Cost Time: {:?}\n{rule}",
        elapsed,
        rule = RULE
    )
}

pub fn use_statement(database: &str) -> String {
    format!("USE {};\n", quote_identifier(database))
}

pub fn drop_table_statement(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {};\n", quote_identifier(table))
}

/// Structure banner followed by the `CREATE TABLE IF NOT EXISTS` text
pub fn table_structure_section(table: &str, create_sql: &str) -> String {
    format!(
        "{rule}-- Table structure for {}\n{rule}{};\n\n",
        table,
        create_sql,
        rule = RULE
    )
}

pub fn records_header(table: &str) -> String {
    format!("{rule}-- Records of {}\n{rule}", table, rule = RULE)
}

/// Render one row as `INSERT INTO `table` VALUES (...);\n`
///
/// Values are positionally aligned with `columns`. Nothing is returned for
/// a row that contains an unencodable value.
///
/// # Examples
///
/// ```
/// # use mysql_async::Value;
/// # use mysql_sqldump::dump::format::format_insert;
/// # use mysql_sqldump::literal::{ColumnDescriptor, EncodeOptions, LiteralEncoder};
/// let encoder = LiteralEncoder::new(EncodeOptions::default()).unwrap();
/// let columns = vec![
///     ColumnDescriptor::new("id", "INT"),
///     ColumnDescriptor::new("name", "VARCHAR"),
/// ];
/// let row = vec![Value::Bytes(b"1".to_vec()), Value::NULL];
/// let sql = format_insert(&encoder, "t", &columns, &row).unwrap();
/// assert_eq!(sql, "INSERT INTO `t` VALUES (1,NULL);\n");
/// ```
pub fn format_insert<V: Borrow<Value>>(
    encoder: &LiteralEncoder,
    table: &str,
    columns: &[ColumnDescriptor],
    values: &[V],
) -> Result<String, SqlDumpError> {
    if columns.len() != values.len() {
        return Err(SqlDumpError::Scan(format!(
            "row of table '{}' has {} values for {} columns",
            table,
            values.len(),
            columns.len()
        )));
    }

    let mut sql = format!("INSERT INTO {} VALUES (", quote_identifier(table));
    for (idx, (column, value)) in columns.iter().zip(values).enumerate() {
        if idx > 0 {
            sql.push(',');
        }
        encoder.encode_into(&mut sql, column, value.borrow())?;
    }
    sql.push_str(");\n");
    Ok(sql)
}
