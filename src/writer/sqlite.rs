use anyhow::Context;
use rusqlite::Connection;
use std::path::Path;

use super::model::{ModelHandle, ModelRegistry, SaveOutcome};
use super::sql_gen::{
    generate_any_value, generate_max_integer, generate_select_values, quote_ident,
};
use crate::row::{Row, Value};
use crate::schema::{reflect_schema, Schema};
use crate::SeedError;

/// The single database session of a run, used for both reads and writes
pub struct SqliteStore {
    conn: Connection,
    models: ModelRegistry,
}

impl SqliteStore {
    /// Open an existing database. The file must already hold the schema to seed.
    pub fn open(db_path: &Path) -> anyhow::Result<Self> {
        if !db_path.exists() {
            anyhow::bail!("Database not found: {:?}", db_path);
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        Self::from_connection(conn).context("Failed to configure database")
    }

    /// Wrap an already open connection, enabling foreign key enforcement
    pub fn from_connection(conn: Connection) -> Result<Self, SeedError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn,
            models: ModelRegistry::new(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn reflect_schema(&self) -> Result<Schema, SeedError> {
        reflect_schema(&self.conn)
    }

    pub fn set_models(&mut self, models: ModelRegistry) {
        self.models = models;
    }

    pub fn model(&self, table: &str) -> Result<&ModelHandle, SeedError> {
        self.models.get(table)
    }

    /// Distinct non-NULL values currently stored in `table.column`
    pub fn existing_values(&self, table: &str, column: &str) -> Result<Vec<Value>, SeedError> {
        let sql = generate_select_values(table, column);
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let values = stmt
            .query_map([], |row| row.get::<_, rusqlite::types::Value>(0))?
            .map(|v| v.map(Value::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    /// Whether `table.column` holds at least one non-NULL value
    pub fn has_values(&self, table: &str, column: &str) -> Result<bool, SeedError> {
        let sql = generate_any_value(table, column);
        let found = self.conn.prepare_cached(&sql)?.exists([])?;
        Ok(found)
    }

    /// Largest integer stored in `table.column`, if any
    pub fn max_integer(&self, table: &str, column: &str) -> Result<Option<i64>, SeedError> {
        let sql = generate_max_integer(table, column);
        let max = self
            .conn
            .query_row(&sql, [], |row| row.get::<_, Option<i64>>(0))?;
        Ok(max)
    }

    pub fn row_count(&self, table: &str) -> Result<u64, SeedError> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Persist `row` into `table` through its model handle
    pub fn get_or_create(&mut self, table: &str, row: &Row) -> Result<SaveOutcome, SeedError> {
        let model = self.models.get(table)?;
        model.get_or_create(&mut self.conn, row)
    }

    /// Run `PRAGMA optimize` before the connection is closed
    pub fn finalize(self) -> Result<(), SeedError> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }
}
