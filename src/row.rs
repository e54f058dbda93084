use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// Timestamp layout written to SQLite (matches `datetime()` output)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single column value, either freshly generated or read back from the database
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Bool(bool),
    Timestamp(NaiveDateTime),
    /// Stored as whole seconds
    Interval(Duration),
    Uuid(Uuid),
}

impl Value {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            Value::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            Value::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            Value::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            Value::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
            Value::Blob(b) => stmt.raw_bind_parameter(idx, b.as_slice())?,
            Value::Bool(b) => stmt.raw_bind_parameter(idx, i64::from(*b))?,
            Value::Timestamp(ts) => {
                stmt.raw_bind_parameter(idx, ts.format(TIMESTAMP_FORMAT).to_string())?
            }
            Value::Interval(d) => stmt.raw_bind_parameter(idx, d.as_secs() as i64)?,
            Value::Uuid(u) => stmt.raw_bind_parameter(idx, u.hyphenated().to_string())?,
        }
        Ok(())
    }
}

impl From<rusqlite::types::Value> for Value {
    fn from(value: rusqlite::types::Value) -> Self {
        use rusqlite::types::Value as Sql;
        match value {
            Sql::Null => Value::Null,
            Sql::Integer(i) => Value::Integer(i),
            Sql::Real(f) => Value::Real(f),
            Sql::Text(s) => Value::Text(s),
            Sql::Blob(b) => Value::Blob(b),
        }
    }
}

/// A generated row ready for insertion, keyed by column name.
///
/// Columns whose type has no generator are simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub values: HashMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        self.values.insert(column.into(), value);
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn bind_and_read(value: &Value) -> rusqlite::types::Value {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare("SELECT ?1").unwrap();
        value.bind_to(1, &mut stmt).unwrap();
        let mut rows = stmt.raw_query();
        let row = rows.next().unwrap().unwrap();
        row.get(0).unwrap()
    }

    #[test]
    fn test_typed_values_bind_as_sqlite_primitives() {
        use rusqlite::types::Value as Sql;

        assert_eq!(bind_and_read(&Value::Bool(true)), Sql::Integer(1));
        assert_eq!(
            bind_and_read(&Value::Interval(Duration::from_secs(3600))),
            Sql::Integer(3600)
        );

        let ts = NaiveDateTime::parse_from_str("2001-02-03 04:05:06", TIMESTAMP_FORMAT).unwrap();
        assert_eq!(
            bind_and_read(&Value::Timestamp(ts)),
            Sql::Text("2001-02-03 04:05:06".to_string())
        );

        let id = Uuid::nil();
        assert_eq!(
            bind_and_read(&Value::Uuid(id)),
            Sql::Text("00000000-0000-0000-0000-000000000000".to_string())
        );
    }
}
