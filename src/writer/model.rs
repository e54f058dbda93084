//! Static mapping from table name to the handle that knows how to persist
//! rows for it. Built once at startup; a table without a handle is reported
//! before any row is written.

use rusqlite::{Connection, ErrorCode};
use serde::Serialize;
use std::collections::HashMap;

use super::sql_gen::{generate_insert, generate_lookup};
use crate::row::{Row, Value};
use crate::schema::{Schema, Table};
use crate::SeedError;

/// What happened to a row handed to [`ModelHandle::get_or_create`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    /// A new row was committed
    Inserted,
    /// An identical row was already present; nothing was written
    Existing,
    /// The insert hit a constraint and was rolled back
    Skipped,
}

impl SaveOutcome {
    /// Whether a row with these values is now present in the table
    pub fn is_persisted(self) -> bool {
        matches!(self, SaveOutcome::Inserted | SaveOutcome::Existing)
    }
}

/// Persistence handle for one table
#[derive(Debug, Clone)]
pub struct ModelHandle {
    table: String,
    columns: Vec<String>,
}

impl ModelHandle {
    pub fn new(table: &Table) -> Self {
        Self {
            table: table.name.clone(),
            columns: table.columns.iter().map(|c| c.name.clone()).collect(),
        }
    }

    /// Insert `row` unless an identical row already exists.
    ///
    /// The insert runs inside its own savepoint so a constraint violation
    /// rolls back only this row. Any other database error is returned.
    pub fn get_or_create(&self, conn: &mut Connection, row: &Row) -> Result<SaveOutcome, SeedError> {
        let (columns, values) = self.bound_values(row);

        if !columns.is_empty() && self.exists(conn, &columns, &values)? {
            return Ok(SaveOutcome::Existing);
        }

        let mut sp = conn.savepoint()?;
        let inserted = {
            let sql = generate_insert(&self.table, &columns);
            let mut stmt = sp.prepare_cached(&sql)?;
            bind_all(&mut stmt, &values)?;
            stmt.raw_execute()
        };

        match inserted {
            Ok(_) => {
                sp.commit()?;
                Ok(SaveOutcome::Inserted)
            }
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                // ROLLBACK TO keeps the savepoint open; RELEASE closes it
                sp.rollback()?;
                sp.commit()?;
                Ok(SaveOutcome::Skipped)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, conn: &Connection, columns: &[&str], values: &[&Value]) -> Result<bool, SeedError> {
        let sql = generate_lookup(&self.table, columns);
        let mut stmt = conn.prepare_cached(&sql)?;
        bind_all(&mut stmt, values)?;
        let mut rows = stmt.raw_query();
        let found = rows.next()?.is_some();
        Ok(found)
    }

    /// Row values in table column order; columns the row lacks are left out
    fn bound_values<'r>(&'r self, row: &'r Row) -> (Vec<&'r str>, Vec<&'r Value>) {
        self.columns
            .iter()
            .filter_map(|c| row.get(c).map(|v| (c.as_str(), v)))
            .unzip()
    }
}

fn bind_all(stmt: &mut rusqlite::Statement, values: &[&Value]) -> rusqlite::Result<()> {
    for (idx, value) in values.iter().enumerate() {
        value.bind_to(idx + 1, stmt)?;
    }
    Ok(())
}

/// Table name -> model handle
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelHandle>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One handle per table of the schema
    pub fn from_schema(schema: &Schema) -> Self {
        let mut registry = Self::new();
        for table in schema.tables() {
            registry.register(table);
        }
        registry
    }

    pub fn register(&mut self, table: &Table) {
        self.models.insert(table.name.clone(), ModelHandle::new(table));
    }

    pub fn get(&self, table: &str) -> Result<&ModelHandle, SeedError> {
        self.models
            .get(table)
            .ok_or_else(|| SeedError::MissingModel(table.to_string()))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
