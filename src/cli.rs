use clap::builder::TypedValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{SeedOptions, DEFAULT_RECORD_COUNT};

#[derive(Parser, Debug)]
#[command(name = "sqlite-seeder")]
#[command(version, about = "Fill an SQLite database with fake rows that respect its keys")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate rows for every table of the database
    Seed {
        /// SQLite database to populate (must already contain the schema)
        #[arg(env = "SEEDER_DATABASE")]
        database: PathBuf,

        /// Rows to generate per table
        #[arg(short = 'n', long, default_value_t = DEFAULT_RECORD_COUNT,
              value_parser = clap::value_parser!(u64).range(1..).map(|n| n as usize))]
        records: usize,

        /// Only seed these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        include: Option<Vec<String>>,

        /// Skip these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,

        /// Seed the random generator for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Print the run report as JSON instead of progress output
        #[arg(long)]
        json: bool,
    },

    /// List tables in the order they would be seeded
    ListTables {
        #[arg(env = "SEEDER_DATABASE")]
        database: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

/// Build run parameters from the `seed` subcommand's arguments
pub fn seed_options(
    records: usize,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    seed: Option<u64>,
) -> SeedOptions {
    SeedOptions {
        record_count: records,
        exclude: exclude.unwrap_or_default(),
        include: include.unwrap_or_default(),
        seed,
    }
}
