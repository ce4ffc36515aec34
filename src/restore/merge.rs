// ABOUTME: Folds consecutive single-row INSERT statements into one multi-row INSERT
// ABOUTME: Purely textual; checks that every member targets the same table

use crate::error::SqlDumpError;

pub const INSERT_PREFIX: &str = "INSERT INTO";
const VALUES_KEYWORD: &str = "VALUES";

pub fn is_insert(statement: &str) -> bool {
    statement.starts_with(INSERT_PREFIX)
}

/// Table token following `INSERT INTO`, with its quoting kept as written
///
/// # Examples
///
/// ```
/// # use mysql_sqldump::restore::merge::insert_target;
/// assert_eq!(insert_target("INSERT INTO `t` VALUES (1);"), Some("`t`"));
/// assert_eq!(insert_target("INSERT INTO db.t(a) VALUES (1);"), Some("db.t"));
/// assert_eq!(insert_target("SELECT 1;"), None);
/// ```
pub fn insert_target(statement: &str) -> Option<&str> {
    target_span(statement).map(|(start, end)| &statement[start..end])
}

/// Byte range of the table token in `statement`
fn target_span(statement: &str) -> Option<(usize, usize)> {
    let rest = statement.strip_prefix(INSERT_PREFIX)?;
    let trimmed = rest.trim_start();
    let start = INSERT_PREFIX.len() + (rest.len() - trimmed.len());
    let len = target_end(trimmed)?;
    Some((start, start + len))
}

/// Byte length of the (possibly backtick-quoted, possibly dotted) table token
fn target_end(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    let mut quoted = false;
    while i < bytes.len() {
        let b = bytes[i];
        if quoted {
            if b == b'`' {
                if bytes.get(i + 1) == Some(&b'`') {
                    i += 1;
                } else {
                    quoted = false;
                }
            }
        } else if b == b'`' {
            quoted = true;
        } else if b.is_ascii_whitespace() || b == b'(' || b == b';' {
            break;
        }
        i += 1;
    }
    if quoted || i == 0 {
        None
    } else {
        Some(i)
    }
}

/// Byte offset of the value list (just past `VALUES`) in an INSERT
fn values_offset(statement: &str) -> Result<usize, SqlDumpError> {
    let (_, search_from) = target_span(statement).ok_or_else(|| {
        SqlDumpError::MalformedStatement(format!(
            "expected INSERT INTO <table>: {}",
            preview(statement)
        ))
    })?;
    // Search after the table name so a table called `VALUES_x` is not matched
    statement[search_from..]
        .find(VALUES_KEYWORD)
        .map(|idx| search_from + idx + VALUES_KEYWORD.len())
        .ok_or_else(|| {
            SqlDumpError::MalformedStatement(format!(
                "invalid SQL: missing VALUES keyword: {}",
                preview(statement)
            ))
        })
}

fn strip_terminator(text: &str) -> &str {
    let text = text.trim_end();
    text.strip_suffix(';').unwrap_or(text).trim_end()
}

fn preview(statement: &str) -> String {
    statement.chars().take(80).collect()
}

/// Merge INSERT statements into one, keeping tuple order
///
/// ```text
/// INSERT INTO `t` VALUES (1,'x');
/// INSERT INTO `t` VALUES (2,'y');
/// ```
/// becomes `INSERT INTO `t` VALUES (1,'x'),(2,'y');`
///
/// # Errors
///
/// [`SqlDumpError::MalformedStatement`] for an empty input, a member
/// without `VALUES`, or members that target different tables.
pub fn merge_inserts<S: AsRef<str>>(statements: &[S]) -> Result<String, SqlDumpError> {
    let (first, rest) = statements
        .split_first()
        .ok_or_else(|| SqlDumpError::MalformedStatement("no input provided".to_string()))?;
    let first = first.as_ref();

    values_offset(first)?;
    let target = insert_target(first).unwrap_or_default();

    let mut merged = String::with_capacity(statements.iter().map(|s| s.as_ref().len()).sum());
    merged.push_str(strip_terminator(first));

    for statement in rest {
        let statement = statement.as_ref();
        let offset = values_offset(statement)?;
        let member_target = insert_target(statement).unwrap_or_default();
        if member_target != target {
            return Err(SqlDumpError::MalformedStatement(format!(
                "cannot merge INSERT into {} with INSERT into {}",
                member_target, target
            )));
        }
        merged.push(',');
        merged.push_str(strip_terminator(&statement[offset..]).trim_start());
    }

    merged.push(';');
    Ok(merged)
}
