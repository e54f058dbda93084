use anyhow::Context;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::SeedOptions;
use crate::filter::resolve_tables;
use crate::generate::{check_parent_cycles, synthesize, GenerationContext};
use crate::schema::Schema;
use crate::ui::Ui;
use crate::writer::{ModelRegistry, SaveOutcome, SqliteStore};
use crate::SeedError;

/// Outcome of seeding one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: String,
    pub requested: u64,
    /// Rows committed by this table's own batch
    pub inserted: u64,
    /// Duplicates and constraint violations, rolled back and not retried
    pub skipped: u64,
}

impl TableReport {
    fn new(table: &str, requested: u64) -> Self {
        Self {
            table: table.to_string(),
            requested,
            inserted: 0,
            skipped: 0,
        }
    }
}

impl fmt::Display for TableReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} records added",
            self.table, self.inserted, self.requested
        )?;
        if self.skipped > 0 {
            write!(f, " ({} skipped)", self.skipped)?;
        }
        Ok(())
    }
}

/// Per-table results of a run, in the order tables were seeded
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub tables: Vec<TableReport>,
}

impl SeedReport {
    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.table == name)
    }

    pub fn total_inserted(&self) -> u64 {
        self.tables.iter().map(|t| t.inserted).sum()
    }
}

/// Populate every selected table with `options.record_count` generated rows.
///
/// Tables are processed parents first. Foreign keys may still create rows in
/// other tables ahead of their turn; those rows are not counted in the report.
/// Every selected table must have a model handle registered in `store`, and
/// no foreign-key loop may need new rows to be created; both are checked
/// before anything is written.
pub fn seed(
    store: &mut SqliteStore,
    schema: &Schema,
    options: &SeedOptions,
    ui: &mut impl Ui,
) -> Result<SeedReport, SeedError> {
    let tables = resolve_tables(schema, options)?;

    for table in &tables {
        store.model(&table.name)?;
    }
    check_parent_cycles(&tables, schema, store)?;

    let mut ctx = GenerationContext::new(options);
    let requested = ctx.record_count as u64;
    let mut report = SeedReport::default();

    for table in tables {
        info!(table = %table.name, records = requested, "seeding table");
        ui.table_started(&table.name, requested);

        let mut table_report = TableReport::new(&table.name, requested);
        for done in 1..=requested {
            let row = synthesize(table, schema, store, &mut ctx)?;

            match store.get_or_create(&table.name, &row)? {
                SaveOutcome::Inserted => table_report.inserted += 1,
                outcome => {
                    debug!(table = %table.name, ?outcome, "row not inserted");
                    table_report.skipped += 1;
                }
            }
            ui.set_progress(done);
        }

        ui.table_completed(&table_report);
        report.tables.push(table_report);
    }

    Ok(report)
}

/// Open an SQLite database, reflect its schema, and seed it
pub fn seed_database(
    db_path: &Path,
    options: &SeedOptions,
    ui: &mut impl Ui,
) -> anyhow::Result<SeedReport> {
    let start = Instant::now();
    let mut store = SqliteStore::open(db_path)?;

    let schema = store
        .reflect_schema()
        .context("Failed to read database schema")?;
    let models = ModelRegistry::from_schema(&schema);
    debug!(models = models.len(), "registered table models");
    store.set_models(models);

    let report = seed(&mut store, &schema, options, ui)?;
    store.finalize()?;

    info!(
        tables = report.tables.len(),
        inserted = report.total_inserted(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "seeding complete"
    );
    Ok(report)
}
