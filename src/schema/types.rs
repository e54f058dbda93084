use std::collections::HashSet;

/// Column data type, normalized from the declared SQL type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Timestamp,
    Boolean,
    Integer,
    Float,
    Interval,
    Uuid,
    Text,
    /// Declared type we cannot generate values for (kept for diagnostics)
    Other(String),
}

impl ColumnType {
    /// Normalize a declared SQL type such as `VARCHAR(255)` or `BIGINT`.
    ///
    /// Matching is substring based and case-insensitive, in the same spirit as
    /// SQLite's type affinity rules. Order matters: `INTERVAL` contains `INT`.
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.trim().to_ascii_uppercase();
        let has = |needle: &str| upper.contains(needle);

        if upper.is_empty() {
            ColumnType::Other(String::new())
        } else if has("UUID") || has("GUID") || has("UNIQUEIDENTIFIER") {
            ColumnType::Uuid
        } else if has("INTERVAL") || has("DURATION") {
            ColumnType::Interval
        } else if has("DATE") || has("TIME") {
            ColumnType::Timestamp
        } else if has("BOOL") {
            ColumnType::Boolean
        } else if has("INT") {
            ColumnType::Integer
        } else if has("REAL")
            || has("FLOA")
            || has("DOUB")
            || has("NUMERIC")
            || has("DECIMAL")
        {
            ColumnType::Float
        } else if has("CHAR") || has("CLOB") || has("TEXT") || has("STRING") {
            ColumnType::Text
        } else {
            ColumnType::Other(declared.trim().to_string())
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, ColumnType::Other(_))
    }
}

/// Foreign key reference to a column of another (or the same) table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}

impl ForeignKey {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub col_type: ColumnType,
    pub primary_key: bool,
    pub foreign_key: Option<ForeignKey>,
}

impl Column {
    pub fn new(name: impl Into<String>, col_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            col_type,
            primary_key: false,
            foreign_key: None,
        }
    }

    /// Mark the column as (part of) the primary key
    pub fn primary(self) -> Self {
        Self {
            primary_key: true,
            ..self
        }
    }

    pub fn references(self, table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            foreign_key: Some(ForeignKey::new(table, column)),
            ..self
        }
    }
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = (&Column, &ForeignKey)> {
        self.columns
            .iter()
            .filter_map(|c| c.foreign_key.as_ref().map(|fk| (c, fk)))
    }

    /// Get all tables this table depends on (FK parents), including itself
    /// for self-referencing keys
    pub fn dependencies(&self) -> HashSet<&str> {
        self.foreign_keys().map(|(_, fk)| fk.table.as_str()).collect()
    }
}

/// Snapshot of every table in the database, immutable for a run
#[derive(Debug, Clone, Default)]
pub struct Schema {
    tables: Vec<Table>,
}

impl Schema {
    /// Build a schema from table definitions without checking references.
    /// Use [`Schema::validate`] to enforce that no foreign key dangles.
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Get table schema by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Get all table names
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Check that every foreign key points at a column that exists
    pub fn validate(&self) -> Result<(), crate::SeedError> {
        for table in &self.tables {
            for (column, fk) in table.foreign_keys() {
                let target_exists = self
                    .table(&fk.table)
                    .and_then(|t| t.column(&fk.column))
                    .is_some();

                if !target_exists {
                    return Err(crate::SeedError::DanglingReference {
                        table: table.name.clone(),
                        column: column.name.clone(),
                        target: format!("{}.{}", fk.table, fk.column),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_type_normalization() {
        let cases = [
            ("INTEGER", ColumnType::Integer),
            ("bigint", ColumnType::Integer),
            ("VARCHAR(255)", ColumnType::Text),
            ("text", ColumnType::Text),
            ("BOOLEAN", ColumnType::Boolean),
            ("DATETIME", ColumnType::Timestamp),
            ("timestamp with time zone", ColumnType::Timestamp),
            ("DATE", ColumnType::Timestamp),
            ("TIME", ColumnType::Timestamp),
            ("time with time zone", ColumnType::Timestamp),
            ("REAL", ColumnType::Float),
            ("DOUBLE PRECISION", ColumnType::Float),
            ("NUMERIC(10,2)", ColumnType::Float),
            ("INTERVAL", ColumnType::Interval),
            ("UUID", ColumnType::Uuid),
            ("UNIQUEIDENTIFIER", ColumnType::Uuid),
        ];

        for (declared, expected) in cases {
            assert_eq!(ColumnType::from_declared(declared), expected, "{declared}");
        }
    }

    #[test]
    fn test_unknown_types_are_unsupported() {
        let jsonb = ColumnType::from_declared("JSONB");
        assert_eq!(jsonb, ColumnType::Other("JSONB".to_string()));
        assert!(!jsonb.is_supported());
        assert!(!ColumnType::from_declared("").is_supported());
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let schema = Schema::new(vec![Table::new(
            "orders",
            vec![
                Column::new("id", ColumnType::Integer).primary(),
                Column::new("user_id", ColumnType::Integer).references("users", "id"),
            ],
        )]);

        let err = schema.validate().unwrap_err();
        assert!(err.to_string().contains("users.id"));
    }
}
