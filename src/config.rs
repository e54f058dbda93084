use serde::Serialize;

/// Records generated per table when not specified
pub const DEFAULT_RECORD_COUNT: usize = 10;

/// Run parameters for a seeding run
#[derive(Debug, Clone, Serialize)]
pub struct SeedOptions {
    /// Rows requested per table
    pub record_count: usize,
    /// Tables to skip; mutually exclusive with `include`
    pub exclude: Vec<String>,
    /// Only populate these tables
    pub include: Vec<String>,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            record_count: DEFAULT_RECORD_COUNT,
            exclude: Vec::new(),
            include: Vec::new(),
            seed: None,
        }
    }
}

impl SeedOptions {
    pub fn with_record_count(mut self, record_count: usize) -> Self {
        self.record_count = record_count;
        self
    }

    pub fn with_exclude<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = tables.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_include<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = tables.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
