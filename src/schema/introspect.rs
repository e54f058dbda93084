//! Reflects the table/column/foreign-key structure of a live SQLite database.

use rusqlite::Connection;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::types::{Column, ColumnType, ForeignKey, Schema, Table};
use crate::SeedError;

/// Raw foreign key row from `pragma_foreign_key_list`; `to` is NULL when the
/// constraint names only the parent table
struct RawForeignKey {
    /// Position within a multi-column constraint
    seq: i64,
    from: String,
    table: String,
    to: Option<String>,
}

/// Read every user table of the database into a [`Schema`].
///
/// Tables are returned sorted by name. Internal `sqlite_*` tables, virtual
/// tables and the shadow tables backing them (FTS indexes and the like) are
/// skipped: writing to those directly corrupts the database.
pub fn reflect_schema(conn: &Connection) -> Result<Schema, SeedError> {
    let mut stmt = conn.prepare(
        r"SELECT name FROM pragma_table_list
          WHERE schema = 'main' AND type = 'table'
            AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
          ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut tables = Vec::with_capacity(names.len());
    let mut raw_keys = HashMap::new();

    for name in names {
        tables.push(reflect_columns(conn, &name)?);
        raw_keys.insert(name.clone(), reflect_foreign_keys(conn, &name)?);
    }

    // Attach foreign keys once every table is known, so implicit targets
    // (REFERENCES parent without a column list) can use the parent's key
    let primary_keys: HashMap<String, Vec<String>> = tables
        .iter()
        .map(|t| {
            let pk = t.primary_key().map(|c| c.name.clone()).collect();
            (t.name.clone(), pk)
        })
        .collect();

    for table in &mut tables {
        let Some(keys) = raw_keys.remove(&table.name) else {
            continue;
        };

        for raw in keys {
            let target_column = match raw.to {
                Some(to) => to,
                None => match primary_keys.get(&raw.table).map(Vec::as_slice) {
                    Some([single]) => single.clone(),
                    _ => {
                        return Err(SeedError::DanglingReference {
                            table: table.name.clone(),
                            column: raw.from,
                            target: raw.table,
                        })
                    }
                },
            };

            let Some(column) = table.columns.iter_mut().find(|c| c.name == raw.from) else {
                continue;
            };

            if let Some(existing) = &column.foreign_key {
                warn!(
                    table = %table.name,
                    column = %column.name,
                    kept = %format!("{}.{}", existing.table, existing.column),
                    "column has more than one foreign key, ignoring the rest"
                );
                continue;
            }
            column.foreign_key = Some(ForeignKey::new(raw.table, target_column));
        }
    }

    let schema = Schema::new(tables);
    schema.validate()?;

    debug!(tables = schema.tables().len(), "reflected schema");
    Ok(schema)
}

fn reflect_columns(conn: &Connection, table: &str) -> Result<Table, SeedError> {
    let mut stmt = conn.prepare(
        "SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid",
    )?;

    let columns = stmt
        .query_map([table], |row| {
            let name: String = row.get(0)?;
            let declared: String = row.get(1)?;
            let pk_index: i64 = row.get(2)?;

            let mut column = Column::new(name, ColumnType::from_declared(&declared));
            if pk_index > 0 {
                column = column.primary();
            }
            Ok(column)
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Table::new(table, columns))
}

fn reflect_foreign_keys(conn: &Connection, table: &str) -> Result<Vec<RawForeignKey>, SeedError> {
    let mut stmt = conn.prepare(
        "SELECT seq, \"from\", \"table\", \"to\" FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
    )?;

    let keys = stmt
        .query_map([table], |row| {
            Ok(RawForeignKey {
                seq: row.get(0)?,
                from: row.get(1)?,
                table: row.get(2)?,
                to: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    // Each column of a multi-column key is resolved on its own, so the
    // combined value often matches no parent row and the insert is skipped
    for key in keys.iter().filter(|k| k.seq > 0) {
        warn!(
            table = %table,
            column = %key.from,
            references = %key.table,
            "composite foreign key is resolved column by column, some rows may be skipped"
        );
    }

    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn_with(ddl: &str) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(ddl).unwrap();
        conn
    }

    #[test]
    fn test_reflects_columns_and_keys() {
        let conn = conn_with(
            "CREATE TABLE users (
                id UUID PRIMARY KEY,
                name VARCHAR(64) NOT NULL,
                active BOOLEAN
             );
             CREATE TABLE orders (
                id INTEGER PRIMARY KEY,
                user_id UUID NOT NULL REFERENCES users(id),
                placed_at DATETIME,
                total REAL
             );",
        );

        let schema = reflect_schema(&conn).unwrap();
        assert_eq!(schema.table_names(), ["orders", "users"]);

        let orders = schema.table("orders").unwrap();
        let id = orders.column("id").unwrap();
        assert!(id.primary_key);
        assert_eq!(id.col_type, ColumnType::Integer);

        let user_id = orders.column("user_id").unwrap();
        assert_eq!(user_id.foreign_key, Some(ForeignKey::new("users", "id")));
        assert_eq!(orders.column("placed_at").unwrap().col_type, ColumnType::Timestamp);

        let users = schema.table("users").unwrap();
        assert_eq!(users.column("id").unwrap().col_type, ColumnType::Uuid);
        assert_eq!(users.column("active").unwrap().col_type, ColumnType::Boolean);
    }

    #[test]
    fn test_implicit_target_uses_parent_primary_key() {
        let conn = conn_with(
            "CREATE TABLE teams (code TEXT PRIMARY KEY);
             CREATE TABLE players (id INTEGER PRIMARY KEY, team TEXT REFERENCES teams);",
        );

        let schema = reflect_schema(&conn).unwrap();
        let team = schema.table("players").unwrap().column("team").unwrap();
        assert_eq!(team.foreign_key, Some(ForeignKey::new("teams", "code")));
    }

    #[test]
    fn test_reference_to_missing_table_fails() {
        let conn = conn_with(
            "CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER REFERENCES users(id));",
        );

        assert!(matches!(
            reflect_schema(&conn),
            Err(SeedError::DanglingReference { .. })
        ));
    }

    #[test]
    fn test_custom_type_is_kept_as_other() {
        let conn = conn_with("CREATE TABLE shapes (id INTEGER PRIMARY KEY, outline GEOMETRY);");

        let schema = reflect_schema(&conn).unwrap();
        let outline = schema.table("shapes").unwrap().column("outline").unwrap();
        assert_eq!(outline.col_type, ColumnType::Other("GEOMETRY".to_string()));
    }

    #[test]
    fn test_virtual_and_shadow_tables_are_skipped() {
        let conn = conn_with(
            "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT);
             CREATE VIRTUAL TABLE notes_fts USING fts5(body);",
        );

        let schema = reflect_schema(&conn).unwrap();
        assert_eq!(schema.table_names(), ["notes"]);
    }

    #[test]
    fn test_only_internal_tables_are_filtered_by_prefix() {
        let conn = conn_with(
            "CREATE TABLE sqlitestats (id INTEGER PRIMARY KEY, note TEXT);
             CREATE TABLE counters (id INTEGER PRIMARY KEY AUTOINCREMENT, hits INTEGER);",
        );

        // AUTOINCREMENT creates sqlite_sequence, which must not show up
        let schema = reflect_schema(&conn).unwrap();
        assert_eq!(schema.table_names(), ["counters", "sqlitestats"]);
    }

    #[test]
    fn test_composite_key_columns_keep_their_targets() {
        let conn = conn_with(
            "CREATE TABLE shelves (aisle INTEGER, slot INTEGER, PRIMARY KEY (aisle, slot));
             CREATE TABLE books (
                id INTEGER PRIMARY KEY,
                shelf_aisle INTEGER,
                shelf_slot INTEGER,
                FOREIGN KEY (shelf_aisle, shelf_slot) REFERENCES shelves (aisle, slot)
             );",
        );

        let schema = reflect_schema(&conn).unwrap();
        let books = schema.table("books").unwrap();
        assert_eq!(
            books.column("shelf_aisle").unwrap().foreign_key,
            Some(ForeignKey::new("shelves", "aisle"))
        );
        assert_eq!(
            books.column("shelf_slot").unwrap().foreign_key,
            Some(ForeignKey::new("shelves", "slot"))
        );
    }
}
