use tracing::debug;

use super::context::GenerationContext;
use super::registry::{random_uuid, value_for};
use super::resolver::resolve;
use crate::row::{Row, Value};
use crate::schema::{ColumnType, Schema, Table};
use crate::writer::SqliteStore;
use crate::SeedError;

/// Build one complete row for `table`.
///
/// Every column with a supported type gets a value. Primary keys are made
/// unique (fresh UUIDs, or the next value of a per-column counter for integer
/// keys) and foreign keys are pointed at existing rows, which may be created
/// and persisted on the way. The table stays in the context's visitation
/// chain for the duration of the call.
pub fn synthesize(
    table: &Table,
    schema: &Schema,
    store: &mut SqliteStore,
    ctx: &mut GenerationContext,
) -> Result<Row, SeedError> {
    ctx.enter(&table.name)?;
    let row = build_row(table, schema, store, ctx);
    ctx.leave(&table.name);
    row
}

fn build_row(
    table: &Table,
    schema: &Schema,
    store: &mut SqliteStore,
    ctx: &mut GenerationContext,
) -> Result<Row, SeedError> {
    let mut row = Row::new();

    for column in &table.columns {
        let now = ctx.now();
        match value_for(&column.col_type, ctx.rng(), now) {
            Some(value) => row.set(column.name.as_str(), value),
            None => debug!(
                table = %table.name,
                column = %column.name,
                col_type = ?column.col_type,
                "unsupported column type, leaving unset"
            ),
        }

        if column.primary_key && column.foreign_key.is_none() {
            match column.col_type {
                ColumnType::Uuid => row.set(column.name.as_str(), Value::Uuid(random_uuid(ctx.rng()))),
                ColumnType::Integer => {
                    let key = ctx.next_key(&table.name, &column.name, || {
                        store.max_integer(&table.name, &column.name)
                    })?;
                    row.set(column.name.as_str(), Value::Integer(key));
                }
                _ => {}
            }
        }

        if let Some(fk) = &column.foreign_key {
            let value = resolve(table, column, fk, schema, store, ctx)?;
            row.set(column.name.as_str(), value);
        }
    }

    Ok(row)
}
