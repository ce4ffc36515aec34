// ABOUTME: Maps MySQL result-set column metadata to server type names
// ABOUTME: Produces the column descriptors the literal encoder dispatches on

use crate::literal::ColumnDescriptor;
use mysql_async::consts::{ColumnFlags, ColumnType};
use mysql_async::Column;

/// Collation id the server reports for binary strings
const BINARY_COLLATION_ID: u16 = 63;

/// Server type name for a column, e.g. `UNSIGNED INT`, `VARCHAR`, `BLOB`
///
/// Text and binary variants share a wire type and are told apart by the
/// column's character set. ENUM and SET travel as strings flagged with
/// `ENUM_FLAG` / `SET_FLAG`.
pub fn database_type_name(column_type: ColumnType, flags: ColumnFlags, character_set: u16) -> String {
    let unsigned = flags.contains(ColumnFlags::UNSIGNED_FLAG);
    let binary = character_set == BINARY_COLLATION_ID;

    let integer = |name: &str| {
        if unsigned {
            format!("UNSIGNED {}", name)
        } else {
            name.to_string()
        }
    };
    let text_or_blob = |text: &str, blob: &str| {
        if binary {
            blob.to_string()
        } else {
            text.to_string()
        }
    };

    if flags.contains(ColumnFlags::ENUM_FLAG) {
        return "ENUM".to_string();
    }
    if flags.contains(ColumnFlags::SET_FLAG) {
        return "SET".to_string();
    }

    match column_type {
        ColumnType::MYSQL_TYPE_TINY => integer("TINYINT"),
        ColumnType::MYSQL_TYPE_SHORT => integer("SMALLINT"),
        ColumnType::MYSQL_TYPE_INT24 => integer("MEDIUMINT"),
        ColumnType::MYSQL_TYPE_LONG => integer("INT"),
        ColumnType::MYSQL_TYPE_LONGLONG => integer("BIGINT"),
        ColumnType::MYSQL_TYPE_FLOAT => "FLOAT".to_string(),
        ColumnType::MYSQL_TYPE_DOUBLE => "DOUBLE".to_string(),
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => "DECIMAL".to_string(),
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => "DATE".to_string(),
        ColumnType::MYSQL_TYPE_DATETIME | ColumnType::MYSQL_TYPE_DATETIME2 => "DATETIME".to_string(),
        ColumnType::MYSQL_TYPE_TIMESTAMP | ColumnType::MYSQL_TYPE_TIMESTAMP2 => {
            "TIMESTAMP".to_string()
        }
        ColumnType::MYSQL_TYPE_TIME | ColumnType::MYSQL_TYPE_TIME2 => "TIME".to_string(),
        ColumnType::MYSQL_TYPE_YEAR => "YEAR".to_string(),
        ColumnType::MYSQL_TYPE_BIT => "BIT".to_string(),
        ColumnType::MYSQL_TYPE_ENUM => "ENUM".to_string(),
        ColumnType::MYSQL_TYPE_SET => "SET".to_string(),
        ColumnType::MYSQL_TYPE_JSON => "JSON".to_string(),
        ColumnType::MYSQL_TYPE_VARCHAR => "VARCHAR".to_string(),
        ColumnType::MYSQL_TYPE_VAR_STRING => text_or_blob("VARCHAR", "VARBINARY"),
        ColumnType::MYSQL_TYPE_STRING => text_or_blob("CHAR", "BINARY"),
        ColumnType::MYSQL_TYPE_TINY_BLOB => text_or_blob("TINYTEXT", "TINYBLOB"),
        ColumnType::MYSQL_TYPE_BLOB => text_or_blob("TEXT", "BLOB"),
        ColumnType::MYSQL_TYPE_MEDIUM_BLOB => text_or_blob("MEDIUMTEXT", "MEDIUMBLOB"),
        ColumnType::MYSQL_TYPE_LONG_BLOB => text_or_blob("LONGTEXT", "LONGBLOB"),
        ColumnType::MYSQL_TYPE_GEOMETRY => "GEOMETRY".to_string(),
        ColumnType::MYSQL_TYPE_NULL => "NULL".to_string(),
        other => {
            let debug = format!("{:?}", other);
            debug.trim_start_matches("MYSQL_TYPE_").to_string()
        }
    }
}

/// Describe one result-set column for the encoder
pub fn describe_column(column: &Column) -> ColumnDescriptor {
    let type_name = database_type_name(
        column.column_type(),
        column.flags(),
        column.character_set(),
    );
    ColumnDescriptor::new(column.name_str().into_owned(), &type_name)
}

/// Describe every column of a result set, in order
pub fn describe_columns(columns: &[Column]) -> Vec<ColumnDescriptor> {
    columns.iter().map(describe_column).collect()
}
