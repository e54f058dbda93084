use chrono::{NaiveDateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};

use crate::config::SeedOptions;
use crate::SeedError;

/// State for one generation run: created at run start, dropped at run end.
pub struct GenerationContext {
    pub record_count: usize,
    pub excluded: HashSet<String>,
    /// Tables whose rows are being synthesized right now, outermost first
    visiting: Vec<String>,
    /// Next integer key per (table, column), seeded lazily from the store.
    /// `None` once the column has handed out `i64::MAX`.
    next_keys: HashMap<(String, String), Option<i64>>,
    /// Pinned so every temporal value in a run shares the same upper bound
    now: NaiveDateTime,
    rng: StdRng,
}

impl GenerationContext {
    pub fn new(options: &SeedOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            record_count: options.record_count,
            excluded: options.exclude.iter().cloned().collect(),
            visiting: Vec::new(),
            next_keys: HashMap::new(),
            now: Utc::now().naive_utc(),
            rng,
        }
    }

    /// Override the instant temporal values are generated relative to
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn is_excluded(&self, table: &str) -> bool {
        self.excluded.contains(table)
    }

    pub fn is_visiting(&self, table: &str) -> bool {
        self.visiting.iter().any(|t| t == table)
    }

    /// Tables currently in progress, outermost first
    pub fn visiting(&self) -> &[String] {
        &self.visiting
    }

    /// Mark `table` as in progress. Fails if it already is.
    pub fn enter(&mut self, table: &str) -> Result<(), SeedError> {
        if self.is_visiting(table) {
            return Err(self.cycle_error(table));
        }
        self.visiting.push(table.to_string());
        Ok(())
    }

    /// Undo the matching [`GenerationContext::enter`]
    pub fn leave(&mut self, table: &str) {
        debug_assert_eq!(self.visiting.last().map(String::as_str), Some(table));
        self.visiting.pop();
    }

    /// The cycle that re-entering `table` would close, as a chain of table names
    pub fn cycle_error(&self, table: &str) -> SeedError {
        let start = self
            .visiting
            .iter()
            .position(|t| t == table)
            .unwrap_or(0);
        let mut chain = self.visiting[start..].to_vec();
        chain.push(table.to_string());
        SeedError::CircularDependency { chain }
    }

    /// Hand out the next integer key for `table.column`.
    ///
    /// `current_max` is only consulted the first time a column is seen, so the
    /// counter keeps climbing even when some inserts are later skipped. Fails
    /// with [`SeedError::KeySpaceExhausted`] once no larger key exists.
    pub fn next_key(
        &mut self,
        table: &str,
        column: &str,
        current_max: impl FnOnce() -> Result<Option<i64>, SeedError>,
    ) -> Result<i64, SeedError> {
        let key = (table.to_string(), column.to_string());
        let next = match self.next_keys.get(&key) {
            Some(next) => *next,
            None => current_max()?.unwrap_or(0).checked_add(1),
        };
        let next = next.ok_or_else(|| SeedError::KeySpaceExhausted {
            table: table.to_string(),
            column: column.to_string(),
        })?;

        self.next_keys.insert(key, next.checked_add(1));
        Ok(next)
    }
}
