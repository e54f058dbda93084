use anyhow::{Context, Result};
use sqlite_seeder::{
    cli::{seed_options, Cli, Commands},
    schema::DependencyResolver,
    seed_database,
    writer::SqliteStore,
    ConsoleUi, SilentUi,
};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();

    match cli.command {
        Commands::Seed {
            database,
            records,
            include,
            exclude,
            seed,
            json,
        } => {
            let start = Instant::now();
            let options = seed_options(records, include, exclude, seed);

            if json {
                let report = seed_database(&database, &options, &mut SilentUi::new())?;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to encode report")?
                );
            } else {
                println!("Seeding {:?}...\n", database);
                let report = seed_database(&database, &options, &mut ConsoleUi::new())?;

                let elapsed = start.elapsed();
                println!(
                    "\nAdded {} records to {} tables in {:.1}s",
                    report.total_inserted(),
                    report.tables.len(),
                    elapsed.as_secs_f64()
                );
            }
        }

        Commands::ListTables { database } => {
            let store = SqliteStore::open(&database)?;
            let schema = store
                .reflect_schema()
                .context("Failed to read database schema")?;
            let resolver = DependencyResolver::new(&schema);
            let tables = resolver.all_tables_ordered()?;

            println!("Tables in seeding order:\n");
            for table in tables {
                let parents = resolver.parents(&table.name);
                if parents.is_empty() {
                    println!("  {}", table.name);
                } else {
                    println!("  {} (after {})", table.name, parents.join(", "));
                }
            }
        }
    }

    Ok(())
}
