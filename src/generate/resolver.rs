use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::{debug, warn};

use super::context::GenerationContext;
use super::synthesizer::synthesize;
use crate::row::Value;
use crate::schema::{Column, ForeignKey, Schema, Table};
use crate::writer::SqliteStore;
use crate::SeedError;

/// Find a value for `table.column` that satisfies its foreign key.
///
/// An existing target value is reused when there is one. Otherwise a target
/// row is synthesized and persisted first, so the returned value is always
/// present in the target table by the time the referencing row is inserted.
pub fn resolve(
    table: &Table,
    column: &Column,
    fk: &ForeignKey,
    schema: &Schema,
    store: &mut SqliteStore,
    ctx: &mut GenerationContext,
) -> Result<Value, SeedError> {
    if let Some(value) = pick_existing(fk, store, ctx)? {
        return Ok(value);
    }

    // Target table is empty. Creating a row for a table that is already
    // being built further up the chain would never terminate.
    if ctx.is_visiting(&fk.table) {
        return Err(ctx.cycle_error(&fk.table));
    }

    let unresolved = || SeedError::UnresolvedReference {
        table: table.name.clone(),
        column: column.name.clone(),
        target: format!("{}.{}", fk.table, fk.column),
    };

    let target = schema.table(&fk.table).ok_or_else(unresolved)?;
    if ctx.is_excluded(&target.name) {
        warn!(
            table = %target.name,
            referenced_by = %table.name,
            "creating a row in an excluded table to satisfy a foreign key"
        );
    }

    debug!(
        table = %table.name,
        column = %column.name,
        target = %target.name,
        "target table is empty, creating referenced row"
    );
    let parent = synthesize(target, schema, store, ctx)?;
    let outcome = store.get_or_create(&target.name, &parent)?;

    if outcome.is_persisted() {
        if let Some(value) = parent.get(&fk.column).filter(|v| **v != Value::Null) {
            return Ok(value.clone());
        }
    }

    // The new row was skipped, or its key came from the database
    pick_existing(fk, store, ctx)?.ok_or_else(unresolved)
}

/// Fail if seeding `tables` would have to create rows around a foreign-key
/// loop.
///
/// Only references whose target column is empty right now are followed, as
/// those are the ones [`resolve`] creates parent rows for. This covers the
/// loops table ordering cannot see: self-references and loops through
/// tables outside the selection. Nothing is written.
pub fn check_parent_cycles<'a>(
    tables: &[&'a Table],
    schema: &'a Schema,
    store: &SqliteStore,
) -> Result<(), SeedError> {
    let mut done = HashSet::new();
    let mut path = Vec::new();
    for table in tables.iter().copied() {
        visit_parents(table, schema, store, &mut done, &mut path)?;
    }
    Ok(())
}

fn visit_parents<'a>(
    table: &'a Table,
    schema: &'a Schema,
    store: &SqliteStore,
    done: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Result<(), SeedError> {
    if let Some(start) = path.iter().position(|t| *t == table.name) {
        let mut chain: Vec<String> = path[start..].iter().map(|t| t.to_string()).collect();
        chain.push(table.name.clone());
        return Err(SeedError::CircularDependency { chain });
    }
    if done.contains(table.name.as_str()) {
        return Ok(());
    }

    path.push(table.name.as_str());
    for (_, fk) in table.foreign_keys() {
        if store.has_values(&fk.table, &fk.column)? {
            continue;
        }
        if let Some(parent) = schema.table(&fk.table) {
            visit_parents(parent, schema, store, done, path)?;
        }
    }
    path.pop();
    done.insert(table.name.as_str());

    Ok(())
}

fn pick_existing(
    fk: &ForeignKey,
    store: &SqliteStore,
    ctx: &mut GenerationContext,
) -> Result<Option<Value>, SeedError> {
    let existing = store.existing_values(&fk.table, &fk.column)?;
    Ok(existing.choose(ctx.rng()).cloned())
}
