use thiserror::Error;

/// Error type for seeding operations
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Cannot use both --include and --exclude at the same time")]
    ConflictingFilters,

    /// No model handle is registered for a table that is about to be seeded
    #[error("No model registered for table: {0}")]
    MissingModel(String),

    #[error("Foreign key {table}.{column} references missing {target}")]
    DanglingReference {
        table: String,
        column: String,
        target: String,
    },

    /// Tables whose foreign keys form a loop; the first and last entries match
    #[error("Circular foreign key dependency: {}", chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    /// An integer key column already holds `i64::MAX`
    #[error("No integer key left for {table}.{column}")]
    KeySpaceExhausted { table: String, column: String },

    #[error("Could not obtain a value for {table}.{column} referencing {target}")]
    UnresolvedReference {
        table: String,
        column: String,
        target: String,
    },
}
