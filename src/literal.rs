// ABOUTME: Renders MySQL column values as SQL literal text
// ABOUTME: Dispatches on the canonical column type through a type registry

use crate::error::SqlDumpError;
use mysql_async::Value;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::OnceLock;

/// A column as seen by the encoder: its name and canonical type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub canonical_type: String,
}

impl ColumnDescriptor {
    /// Build a descriptor from the server-reported type name
    ///
    /// The type name is normalized with [`canonical_type_name`], so
    /// `"UNSIGNED BIGINT"` and `"bigint unsigned"` both become `BIGINT`.
    pub fn new(name: impl Into<String>, database_type_name: &str) -> Self {
        Self {
            name: name.into(),
            canonical_type: canonical_type_name(database_type_name),
        }
    }
}

/// Normalize a database type name into the registry's dispatch key
///
/// Upper-cases the name, removes `UNSIGNED` and drops all whitespace.
///
/// # Examples
///
/// ```
/// # use mysql_sqldump::literal::canonical_type_name;
/// assert_eq!(canonical_type_name("UNSIGNED INT"), "INT");
/// assert_eq!(canonical_type_name("varchar"), "VARCHAR");
/// assert_eq!(canonical_type_name(" bigint unsigned "), "BIGINT");
/// ```
pub fn canonical_type_name(database_type_name: &str) -> String {
    database_type_name
        .to_uppercase()
        .replace("UNSIGNED", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Families of column types sharing one literal rendering rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Date,
    DateTime,
    Time,
    Year,
    Character,
    Binary,
    EnumSet,
    Boolean,
    Json,
}

type EncodeFn = fn(&ColumnDescriptor, &Value, &EncodeOptions, &mut String) -> Result<(), SqlDumpError>;

impl TypeCategory {
    fn encoder(self) -> EncodeFn {
        match self {
            TypeCategory::Integer => encode_integer,
            TypeCategory::Float => encode_float,
            TypeCategory::Decimal => encode_decimal,
            TypeCategory::Date => encode_date,
            TypeCategory::DateTime => encode_datetime,
            TypeCategory::Time => encode_time,
            TypeCategory::Year => encode_year,
            TypeCategory::Character | TypeCategory::EnumSet | TypeCategory::Json => encode_quoted,
            TypeCategory::Binary => encode_binary,
            TypeCategory::Boolean => encode_boolean,
        }
    }
}

/// Every canonical type name the encoder accepts
pub const SUPPORTED_TYPES: &[(&str, TypeCategory)] = &[
    ("TINYINT", TypeCategory::Integer),
    ("SMALLINT", TypeCategory::Integer),
    ("MEDIUMINT", TypeCategory::Integer),
    ("INT", TypeCategory::Integer),
    ("INTEGER", TypeCategory::Integer),
    ("BIGINT", TypeCategory::Integer),
    ("FLOAT", TypeCategory::Float),
    ("DOUBLE", TypeCategory::Float),
    ("DECIMAL", TypeCategory::Decimal),
    ("DEC", TypeCategory::Decimal),
    ("DATE", TypeCategory::Date),
    ("DATETIME", TypeCategory::DateTime),
    ("TIMESTAMP", TypeCategory::DateTime),
    ("TIME", TypeCategory::Time),
    ("YEAR", TypeCategory::Year),
    ("CHAR", TypeCategory::Character),
    ("VARCHAR", TypeCategory::Character),
    ("TINYTEXT", TypeCategory::Character),
    ("TEXT", TypeCategory::Character),
    ("MEDIUMTEXT", TypeCategory::Character),
    ("LONGTEXT", TypeCategory::Character),
    ("BIT", TypeCategory::Binary),
    ("BINARY", TypeCategory::Binary),
    ("VARBINARY", TypeCategory::Binary),
    ("TINYBLOB", TypeCategory::Binary),
    ("BLOB", TypeCategory::Binary),
    ("MEDIUMBLOB", TypeCategory::Binary),
    ("LONGBLOB", TypeCategory::Binary),
    ("ENUM", TypeCategory::EnumSet),
    ("SET", TypeCategory::EnumSet),
    ("BOOL", TypeCategory::Boolean),
    ("BOOLEAN", TypeCategory::Boolean),
    ("JSON", TypeCategory::Json),
];

/// Lookup table from canonical type name to [`TypeCategory`]
#[derive(Debug)]
pub struct TypeRegistry {
    by_name: HashMap<&'static str, TypeCategory>,
}

impl TypeRegistry {
    /// Build the registry from [`SUPPORTED_TYPES`]
    ///
    /// Every key must already be in canonical form; a key that would not
    /// survive [`canonical_type_name`] could never be matched.
    pub fn new() -> Result<Self, SqlDumpError> {
        let mut by_name = HashMap::with_capacity(SUPPORTED_TYPES.len());
        for (name, category) in SUPPORTED_TYPES {
            if canonical_type_name(name) != *name {
                return Err(SqlDumpError::Config(format!(
                    "type registry key '{}' is not canonical",
                    name
                )));
            }
            if by_name.insert(*name, *category).is_some() {
                return Err(SqlDumpError::Config(format!(
                    "type registry key '{}' registered twice",
                    name
                )));
            }
        }
        Ok(Self { by_name })
    }

    /// Shared registry, validated on first use
    pub fn global() -> Result<&'static TypeRegistry, SqlDumpError> {
        static REGISTRY: OnceLock<Result<TypeRegistry, String>> = OnceLock::new();
        REGISTRY
            .get_or_init(|| TypeRegistry::new().map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| SqlDumpError::Config(e.clone()))
    }

    pub fn category(&self, canonical_type: &str) -> Option<TypeCategory> {
        self.by_name.get(canonical_type).copied()
    }

    /// Resolve a column to its category, failing for unsupported types
    pub fn resolve(&self, column: &ColumnDescriptor) -> Result<TypeCategory, SqlDumpError> {
        self.category(&column.canonical_type)
            .ok_or_else(|| SqlDumpError::UnsupportedType {
                type_name: column.canonical_type.clone(),
            })
    }
}

/// Flags that alter literal rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Render integer columns named exactly `id` as `0`
    pub zero_primary_key: bool,
}

/// Converts raw driver values into SQL literal text
#[derive(Debug, Clone, Copy)]
pub struct LiteralEncoder {
    registry: &'static TypeRegistry,
    options: EncodeOptions,
}

impl LiteralEncoder {
    pub fn new(options: EncodeOptions) -> Result<Self, SqlDumpError> {
        Ok(Self {
            registry: TypeRegistry::global()?,
            options,
        })
    }

    /// Render one value as a literal
    ///
    /// # Examples
    ///
    /// ```
    /// # use mysql_async::Value;
    /// # use mysql_sqldump::literal::{ColumnDescriptor, EncodeOptions, LiteralEncoder};
    /// let encoder = LiteralEncoder::new(EncodeOptions::default()).unwrap();
    /// let column = ColumnDescriptor::new("name", "VARCHAR");
    /// let literal = encoder.encode(&column, &Value::Bytes(b"a's".to_vec())).unwrap();
    /// assert_eq!(literal, "'a''s'");
    /// ```
    pub fn encode(&self, column: &ColumnDescriptor, value: &Value) -> Result<String, SqlDumpError> {
        let mut out = String::new();
        self.encode_into(&mut out, column, value)?;
        Ok(out)
    }

    /// Append the literal for `value` to `out`
    ///
    /// On error `out` is left untouched.
    pub fn encode_into(
        &self,
        out: &mut String,
        column: &ColumnDescriptor,
        value: &Value,
    ) -> Result<(), SqlDumpError> {
        if let Value::NULL = value {
            out.push_str("NULL");
            return Ok(());
        }

        let category = self.registry.resolve(column)?;
        let mut literal = String::new();
        (category.encoder())(column, value, &self.options, &mut literal)?;
        out.push_str(&literal);
        Ok(())
    }
}

/// Quote `text` as a string literal, doubling embedded single quotes
pub fn quote_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

fn mismatch(column: &ColumnDescriptor, value: &Value) -> SqlDumpError {
    SqlDumpError::Scan(format!(
        "cannot render {:?} as {} for column '{}'",
        value, column.canonical_type, column.name
    ))
}

fn utf8<'a>(column: &ColumnDescriptor, bytes: &'a [u8]) -> Result<&'a str, SqlDumpError> {
    std::str::from_utf8(bytes).map_err(|e| {
        SqlDumpError::Scan(format!(
            "column '{}' ({}) holds invalid UTF-8: {}",
            column.name, column.canonical_type, e
        ))
    })
}

/// Raw numeric text as sent by the server, rejected if it is not a number
fn numeric_text<'a>(column: &ColumnDescriptor, bytes: &'a [u8]) -> Result<&'a str, SqlDumpError> {
    let text = utf8(column, bytes)?;
    let valid = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
    if !valid {
        return Err(SqlDumpError::Scan(format!(
            "column '{}' ({}) holds non-numeric text '{}'",
            column.name, column.canonical_type, text
        )));
    }
    Ok(text)
}

/// Leading `len` characters of a date/time text, checked against `YYYY-MM-DD[ HH:MM:SS]`
fn temporal_prefix<'a>(
    column: &ColumnDescriptor,
    bytes: &'a [u8],
    len: usize,
) -> Result<&'a str, SqlDumpError> {
    let text = utf8(column, bytes)?;
    let shape_ok = text.len() >= len
        && text.as_bytes()[..len].iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            10 => *b == b' ',
            13 | 16 => *b == b':',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(SqlDumpError::Scan(format!(
            "column '{}' ({}) holds malformed value '{}'",
            column.name, column.canonical_type, text
        )));
    }
    Ok(&text[..len])
}

fn encode_integer(
    column: &ColumnDescriptor,
    value: &Value,
    options: &EncodeOptions,
    out: &mut String,
) -> Result<(), SqlDumpError> {
    if options.zero_primary_key && column.name == "id" {
        out.push('0');
        return Ok(());
    }
    match value {
        Value::Bytes(bytes) => out.push_str(numeric_text(column, bytes)?),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::UInt(u) => out.push_str(&u.to_string()),
        other => return Err(mismatch(column, other)),
    }
    Ok(())
}

fn encode_float(
    column: &ColumnDescriptor,
    value: &Value,
    _options: &EncodeOptions,
    out: &mut String,
) -> Result<(), SqlDumpError> {
    match value {
        Value::Bytes(bytes) => out.push_str(numeric_text(column, bytes)?),
        Value::Float(f) if f.is_finite() => out.push_str(&f.to_string()),
        Value::Double(d) if d.is_finite() => out.push_str(&d.to_string()),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::UInt(u) => out.push_str(&u.to_string()),
        other => return Err(mismatch(column, other)),
    }
    Ok(())
}

fn encode_decimal(
    column: &ColumnDescriptor,
    value: &Value,
    _options: &EncodeOptions,
    out: &mut String,
) -> Result<(), SqlDumpError> {
    match value {
        Value::Bytes(bytes) => out.push_str(numeric_text(column, bytes)?),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::UInt(u) => out.push_str(&u.to_string()),
        Value::Double(d) if d.is_finite() => out.push_str(&d.to_string()),
        other => return Err(mismatch(column, other)),
    }
    Ok(())
}

fn encode_date(
    column: &ColumnDescriptor,
    value: &Value,
    _options: &EncodeOptions,
    out: &mut String,
) -> Result<(), SqlDumpError> {
    match value {
        Value::Bytes(bytes) => {
            let date = temporal_prefix(column, bytes, 10)?;
            let _ = write!(out, "'{}'", date);
        }
        Value::Date(year, month, day, ..) => {
            let _ = write!(out, "'{:04}-{:02}-{:02}'", year, month, day);
        }
        other => return Err(mismatch(column, other)),
    }
    Ok(())
}

fn encode_datetime(
    column: &ColumnDescriptor,
    value: &Value,
    _options: &EncodeOptions,
    out: &mut String,
) -> Result<(), SqlDumpError> {
    match value {
        Value::Bytes(bytes) if bytes.len() == 10 => {
            // DATETIME columns can come back date-only from some servers
            let date = temporal_prefix(column, bytes, 10)?;
            let _ = write!(out, "'{} 00:00:00'", date);
        }
        Value::Bytes(bytes) => {
            let datetime = temporal_prefix(column, bytes, 19)?;
            let _ = write!(out, "'{}'", datetime);
        }
        Value::Date(year, month, day, hour, minute, second, _micros) => {
            let _ = write!(
                out,
                "'{:04}-{:02}-{:02} {:02}:{:02}:{:02}'",
                year, month, day, hour, minute, second
            );
        }
        other => return Err(mismatch(column, other)),
    }
    Ok(())
}

fn encode_time(
    column: &ColumnDescriptor,
    value: &Value,
    _options: &EncodeOptions,
    out: &mut String,
) -> Result<(), SqlDumpError> {
    match value {
        Value::Bytes(bytes) => out.push_str(&quote_string(utf8(column, bytes)?)),
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let sign = if *negative { "-" } else { "" };
            let total_hours = u64::from(*days) * 24 + u64::from(*hours);
            let _ = write!(
                out,
                "'{}{:02}:{:02}:{:02}",
                sign, total_hours, minutes, seconds
            );
            if *micros != 0 {
                let _ = write!(out, ".{:06}", micros);
            }
            out.push('\'');
        }
        other => return Err(mismatch(column, other)),
    }
    Ok(())
}

fn encode_year(
    column: &ColumnDescriptor,
    value: &Value,
    _options: &EncodeOptions,
    out: &mut String,
) -> Result<(), SqlDumpError> {
    match value {
        Value::Bytes(bytes) => out.push_str(numeric_text(column, bytes)?),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::UInt(u) => out.push_str(&u.to_string()),
        other => return Err(mismatch(column, other)),
    }
    Ok(())
}

fn encode_quoted(
    column: &ColumnDescriptor,
    value: &Value,
    _options: &EncodeOptions,
    out: &mut String,
) -> Result<(), SqlDumpError> {
    match value {
        Value::Bytes(bytes) => out.push_str(&quote_string(utf8(column, bytes)?)),
        other => return Err(mismatch(column, other)),
    }
    Ok(())
}

fn encode_binary(
    column: &ColumnDescriptor,
    value: &Value,
    _options: &EncodeOptions,
    out: &mut String,
) -> Result<(), SqlDumpError> {
    match value {
        Value::Bytes(bytes) if bytes.is_empty() => out.push_str("X''"),
        Value::Bytes(bytes) => {
            out.reserve(2 + bytes.len() * 2);
            out.push_str("0x");
            for byte in bytes {
                let _ = write!(out, "{:02X}", byte);
            }
        }
        other => return Err(mismatch(column, other)),
    }
    Ok(())
}

fn encode_boolean(
    column: &ColumnDescriptor,
    value: &Value,
    _options: &EncodeOptions,
    out: &mut String,
) -> Result<(), SqlDumpError> {
    let truth = match value {
        Value::Int(i) => *i != 0,
        Value::UInt(u) => *u != 0,
        Value::Bytes(bytes) => match utf8(column, bytes)?.trim() {
            "1" | "true" | "TRUE" => true,
            "0" | "false" | "FALSE" => false,
            _ => return Err(mismatch(column, value)),
        },
        other => return Err(mismatch(column, other)),
    };
    out.push_str(if truth { "true" } else { "false" });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> LiteralEncoder {
        LiteralEncoder::new(EncodeOptions::default()).unwrap()
    }

    fn zeroing_encoder() -> LiteralEncoder {
        LiteralEncoder::new(EncodeOptions {
            zero_primary_key: true,
        })
        .unwrap()
    }

    fn bytes(text: &str) -> Value {
        Value::Bytes(text.as_bytes().to_vec())
    }

    /// Reads back a single-quoted literal the way the server would
    fn parse_string_literal(literal: &str) -> String {
        assert!(literal.starts_with('\'') && literal.ends_with('\''));
        literal[1..literal.len() - 1].replace("''", "'")
    }

    #[test]
    fn test_canonical_type_name() {
        assert_eq!(canonical_type_name("UNSIGNED TINYINT"), "TINYINT");
        assert_eq!(canonical_type_name("int unsigned"), "INT");
        assert_eq!(canonical_type_name("VARCHAR"), "VARCHAR");
        assert_eq!(canonical_type_name("\tDOUBLE \n"), "DOUBLE");
    }

    #[test]
    fn test_registry_covers_every_supported_type() {
        let registry = TypeRegistry::new().unwrap();
        for (name, category) in SUPPORTED_TYPES {
            assert_eq!(registry.category(name), Some(*category), "{}", name);
        }
        assert_eq!(registry.category("GEOMETRY"), None);
    }

    #[test]
    fn test_null_is_null_for_every_type() {
        let encoder = encoder();
        for (name, _) in SUPPORTED_TYPES {
            let column = ColumnDescriptor::new("c", name);
            assert_eq!(encoder.encode(&column, &Value::NULL).unwrap(), "NULL");
        }
        // NULL wins even before the type is looked up
        let column = ColumnDescriptor::new("shape", "GEOMETRY");
        assert_eq!(encoder.encode(&column, &Value::NULL).unwrap(), "NULL");
    }

    #[test]
    fn test_integer_text_and_native_render_identically() {
        let encoder = encoder();
        let column = ColumnDescriptor::new("count", "UNSIGNED BIGINT");
        assert_eq!(encoder.encode(&column, &bytes("42")).unwrap(), "42");
        assert_eq!(encoder.encode(&column, &Value::Int(42)).unwrap(), "42");
        assert_eq!(encoder.encode(&column, &Value::UInt(42)).unwrap(), "42");
        assert_eq!(encoder.encode(&column, &Value::Int(-7)).unwrap(), "-7");
    }

    #[test]
    fn test_integer_rejects_garbage_text() {
        let column = ColumnDescriptor::new("count", "INT");
        let err = encoder().encode(&column, &bytes("1); DROP")).unwrap_err();
        assert!(matches!(err, SqlDumpError::Scan(_)));
    }

    #[test]
    fn test_zero_primary_key_only_hits_integer_id() {
        let encoder = zeroing_encoder();
        let id = ColumnDescriptor::new("id", "INT");
        let id2 = ColumnDescriptor::new("id2", "INT");
        let text_id = ColumnDescriptor::new("id", "VARCHAR");

        assert_eq!(encoder.encode(&id, &bytes("5")).unwrap(), "0");
        assert_eq!(encoder.encode(&id, &Value::Int(5)).unwrap(), "0");
        assert_eq!(encoder.encode(&id2, &bytes("5")).unwrap(), "5");
        assert_eq!(encoder.encode(&text_id, &bytes("5")).unwrap(), "'5'");
        assert_eq!(encoder.encode(&id, &Value::NULL).unwrap(), "NULL");
    }

    #[test]
    fn test_zero_primary_key_off_keeps_id() {
        let column = ColumnDescriptor::new("id", "INT");
        assert_eq!(encoder().encode(&column, &bytes("5")).unwrap(), "5");
    }

    #[test]
    fn test_float_prefers_raw_text() {
        let encoder = encoder();
        let column = ColumnDescriptor::new("ratio", "DOUBLE");
        assert_eq!(
            encoder.encode(&column, &bytes("0.30000000000000004")).unwrap(),
            "0.30000000000000004"
        );
        assert_eq!(encoder.encode(&column, &Value::Double(1.5)).unwrap(), "1.5");
        assert_eq!(encoder.encode(&column, &Value::Float(2.25)).unwrap(), "2.25");
        assert!(encoder.encode(&column, &Value::Double(f64::NAN)).is_err());
    }

    #[test]
    fn test_decimal_is_verbatim_and_unquoted() {
        let column = ColumnDescriptor::new("price", "DECIMAL");
        assert_eq!(encoder().encode(&column, &bytes("100.50")).unwrap(), "100.50");
        let column = ColumnDescriptor::new("price", "DEC");
        assert_eq!(encoder().encode(&column, &bytes("-0.001")).unwrap(), "-0.001");
    }

    #[test]
    fn test_date_literals() {
        let encoder = encoder();
        let column = ColumnDescriptor::new("born", "DATE");
        assert_eq!(
            encoder.encode(&column, &bytes("2020-01-31")).unwrap(),
            "'2020-01-31'"
        );
        assert_eq!(
            encoder
                .encode(&column, &Value::Date(2020, 1, 31, 0, 0, 0, 0))
                .unwrap(),
            "'2020-01-31'"
        );
        assert_eq!(
            encoder.encode(&column, &bytes("0000-00-00")).unwrap(),
            "'0000-00-00'"
        );
        assert!(encoder.encode(&column, &bytes("31/01/2020")).is_err());
    }

    #[test]
    fn test_datetime_and_timestamp_drop_fraction() {
        let encoder = encoder();
        for type_name in ["DATETIME", "TIMESTAMP"] {
            let column = ColumnDescriptor::new("created", type_name);
            assert_eq!(
                encoder
                    .encode(&column, &bytes("2020-01-01 00:00:00"))
                    .unwrap(),
                "'2020-01-01 00:00:00'"
            );
            assert_eq!(
                encoder
                    .encode(&column, &bytes("2020-01-01 10:20:30.123456"))
                    .unwrap(),
                "'2020-01-01 10:20:30'"
            );
            assert_eq!(
                encoder
                    .encode(&column, &Value::Date(2024, 1, 15, 10, 30, 45, 123456))
                    .unwrap(),
                "'2024-01-15 10:30:45'"
            );
        }
    }

    #[test]
    fn test_time_literals() {
        let encoder = encoder();
        let column = ColumnDescriptor::new("at", "TIME");
        assert_eq!(encoder.encode(&column, &bytes("10:30:45")).unwrap(), "'10:30:45'");
        assert_eq!(
            encoder
                .encode(&column, &Value::Time(false, 1, 10, 30, 45, 0))
                .unwrap(),
            "'34:30:45'"
        );
        assert_eq!(
            encoder
                .encode(&column, &Value::Time(true, 0, 1, 2, 3, 500))
                .unwrap(),
            "'-01:02:03.000500'"
        );
    }

    #[test]
    fn test_year_is_unquoted() {
        let column = ColumnDescriptor::new("y", "YEAR");
        assert_eq!(encoder().encode(&column, &bytes("2024")).unwrap(), "2024");
    }

    #[test]
    fn test_character_family_escapes_quotes() {
        let encoder = encoder();
        for type_name in ["CHAR", "VARCHAR", "TINYTEXT", "TEXT", "MEDIUMTEXT", "LONGTEXT"] {
            let column = ColumnDescriptor::new("name", type_name);
            assert_eq!(encoder.encode(&column, &bytes("a's")).unwrap(), "'a''s'");
        }
    }

    #[test]
    fn test_string_escaping_round_trips() {
        let encoder = encoder();
        let column = ColumnDescriptor::new("body", "TEXT");
        let samples = [
            "",
            "plain",
            "'",
            "''",
            "it's a 'quoted' word",
            "back\\slash; semi; -- dash",
            "ünïcödé ✓ 'x'",
            "line\nbreak\ttab",
        ];
        for sample in samples {
            let literal = encoder.encode(&column, &bytes(sample)).unwrap();
            assert_eq!(parse_string_literal(&literal), sample, "literal {}", literal);
        }
    }

    #[test]
    fn test_character_rejects_invalid_utf8() {
        let column = ColumnDescriptor::new("name", "VARCHAR");
        let err = encoder()
            .encode(&column, &Value::Bytes(vec![0xFF, 0xFE]))
            .unwrap_err();
        assert!(matches!(err, SqlDumpError::Scan(_)));
    }

    #[test]
    fn test_binary_is_uppercase_hex() {
        let encoder = encoder();
        let column = ColumnDescriptor::new("blob", "VARBINARY");
        assert_eq!(
            encoder
                .encode(&column, &Value::Bytes(vec![0xDE, 0xAD]))
                .unwrap(),
            "0xDEAD"
        );
        assert_eq!(
            encoder.encode(&column, &Value::Bytes(vec![0x00, 0x0f])).unwrap(),
            "0x000F"
        );
        assert_eq!(encoder.encode(&column, &Value::Bytes(vec![])).unwrap(), "X''");
    }

    #[test]
    fn test_enum_set_and_json_are_escaped() {
        let encoder = encoder();
        let column = ColumnDescriptor::new("kind", "ENUM");
        assert_eq!(encoder.encode(&column, &bytes("o'neil")).unwrap(), "'o''neil'");
        let column = ColumnDescriptor::new("flags", "SET");
        assert_eq!(encoder.encode(&column, &bytes("a,b")).unwrap(), "'a,b'");
        let column = ColumnDescriptor::new("doc", "JSON");
        assert_eq!(
            encoder
                .encode(&column, &bytes(r#"{"name": "it's"}"#))
                .unwrap(),
            r#"'{"name": "it''s"}'"#
        );
    }

    #[test]
    fn test_boolean_keywords() {
        let encoder = encoder();
        let column = ColumnDescriptor::new("active", "BOOLEAN");
        assert_eq!(encoder.encode(&column, &Value::Int(1)).unwrap(), "true");
        assert_eq!(encoder.encode(&column, &Value::UInt(0)).unwrap(), "false");
        assert_eq!(encoder.encode(&column, &bytes("1")).unwrap(), "true");
        assert_eq!(encoder.encode(&column, &bytes("false")).unwrap(), "false");
        assert!(encoder.encode(&column, &bytes("maybe")).is_err());
    }

    #[test]
    fn test_unsupported_type_fails_and_leaves_output_alone() {
        let encoder = encoder();
        let column = ColumnDescriptor::new("shape", "GEOMETRY");
        let mut out = String::from("INSERT INTO `t` VALUES (1,");
        let err = encoder
            .encode_into(&mut out, &column, &bytes("POINT(1 1)"))
            .unwrap_err();
        match err {
            SqlDumpError::UnsupportedType { type_name } => assert_eq!(type_name, "GEOMETRY"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(out, "INSERT INTO `t` VALUES (1,");
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let encoder = zeroing_encoder();
        let cases = [
            (ColumnDescriptor::new("id", "INT"), bytes("9")),
            (ColumnDescriptor::new("n", "VARCHAR"), bytes("x'y")),
            (ColumnDescriptor::new("b", "BLOB"), Value::Bytes(vec![1, 2, 3])),
            (ColumnDescriptor::new("d", "DATETIME"), bytes("2021-02-03 04:05:06")),
        ];
        for (column, value) in &cases {
            let first = encoder.encode(column, value).unwrap();
            let second = encoder.encode(column, value).unwrap();
            assert_eq!(first, second);
        }
    }
}
