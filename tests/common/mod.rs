// ABOUTME: Shared fixtures for integration tests
// ABOUTME: In-memory dump source and a statement recorder standing in for MySQL

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use mysql_async::Value;
use mysql_sqldump::dump::{DumpSource, RowVisitor};
use mysql_sqldump::error::SqlDumpError;
use mysql_sqldump::literal::ColumnDescriptor;
use mysql_sqldump::restore::executor::StatementExecutor;

pub struct FakeTable {
    pub name: String,
    pub create_sql: String,
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<Vec<Value>>,
}

impl FakeTable {
    pub fn new(name: &str, columns: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            create_sql: format!("CREATE TABLE IF NOT EXISTS `{}` (\n  `id` int\n)", name),
            columns: columns
                .iter()
                .map(|(column, db_type)| ColumnDescriptor::new(*column, db_type))
                .collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, values: Vec<Value>) -> Self {
        self.rows.push(values);
        self
    }
}

/// Catalog and rows served from memory; records every row query it runs
#[derive(Default)]
pub struct FakeSource {
    pub databases: Vec<(String, Vec<FakeTable>)>,
    pub current: Option<String>,
    pub queries: Vec<String>,
}

impl FakeSource {
    pub fn with_database(mut self, name: &str, tables: Vec<FakeTable>) -> Self {
        self.databases.push((name.to_string(), tables));
        self
    }

    fn tables(&self) -> Result<&[FakeTable]> {
        let current = self
            .current
            .as_deref()
            .ok_or_else(|| anyhow!("no database selected"))?;
        self.databases
            .iter()
            .find(|(name, _)| name == current)
            .map(|(_, tables)| tables.as_slice())
            .ok_or_else(|| anyhow!("unknown database {}", current))
    }

    fn table(&self, name: &str) -> Result<&FakeTable> {
        self.tables()?
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| anyhow!("Table '{}' doesn't exist", name))
    }
}

impl DumpSource for FakeSource {
    async fn list_databases(&mut self) -> Result<Vec<String>> {
        Ok(self.databases.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn use_database(&mut self, database: &str) -> Result<()> {
        if !self.databases.iter().any(|(name, _)| name == database) {
            return Err(SqlDumpError::Connection(format!("Unknown database '{}'", database)).into());
        }
        self.current = Some(database.to_string());
        Ok(())
    }

    async fn list_tables(&mut self, database: &str) -> Result<Vec<String>> {
        self.use_database(database).await?;
        Ok(self.tables()?.iter().map(|t| t.name.clone()).collect())
    }

    async fn create_table_statement(&mut self, table: &str) -> Result<String> {
        Ok(self.table(table)?.create_sql.clone())
    }

    async fn fetch_rows<V: RowVisitor>(&mut self, query: &str, visitor: &mut V) -> Result<u64> {
        self.queries.push(query.to_string());
        let name = query
            .strip_prefix("SELECT * FROM `")
            .and_then(|rest| rest.split('`').next())
            .ok_or_else(|| anyhow!("unexpected row query: {}", query))?
            .to_string();
        let table = self.table(&name)?;
        let (columns, rows) = (table.columns.clone(), table.rows.clone());
        for row in &rows {
            visitor.visit_row(&columns, row).await?;
        }
        Ok(rows.len() as u64)
    }
}

/// Executor that keeps every statement and can fail on a marker
#[derive(Default)]
pub struct RecordingExecutor {
    pub statements: Vec<String>,
    pub fail_on: Option<String>,
}

impl StatementExecutor for RecordingExecutor {
    async fn execute(&mut self, statement: &str) -> Result<(), SqlDumpError> {
        self.statements.push(statement.to_string());
        match &self.fail_on {
            Some(marker) if statement.contains(marker.as_str()) => {
                Err(SqlDumpError::execution(statement, "Duplicate entry '1' for key 'PRIMARY'"))
            }
            _ => Ok(()),
        }
    }
}

pub fn text(value: &str) -> Value {
    Value::Bytes(value.as_bytes().to_vec())
}
