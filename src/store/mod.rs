//! Storage seam between the load/query core and the relational engine.

pub mod memory;
pub mod pg;

pub use memory::MemoryStore;
pub use pg::{ConnectionParams, PgStore};

use crate::error::Result;

/// One population observation. Natural key is `(city, state, year)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationRecord {
    pub city: String,
    /// Canonical full state name, e.g. "New York".
    pub state: String,
    pub year: i32,
    pub population: i32,
}

impl PopulationRecord {
    pub fn key(&self) -> (&str, &str, i32) {
        (&self.city, &self.state, self.year)
    }
}

/// Operations the core needs from the `city_population` table.
///
/// Implementations run in autocommit mode: each call is durable on return.
pub trait PopulationStore {
    /// Insert-or-overwrite every record in one write. On a natural-key
    /// collision the population is replaced; within one batch the later
    /// record wins.
    fn upsert_batch(&mut self, batch: &[PopulationRecord]) -> Result<()>;

    /// `None` when the table has no rows.
    fn latest_year(&mut self) -> Result<Option<i32>>;

    /// Grouped population sums for `states` in `year`. States with no rows
    /// are absent from the result; order is unspecified.
    fn sum_population(&mut self, states: &[&str], year: i32) -> Result<Vec<(String, i64)>>;

    fn count_rows(&mut self) -> Result<u64>;

    fn count_distinct_cities(&mut self) -> Result<u64>;

    fn count_distinct_states(&mut self) -> Result<u64>;

    /// `(year, rows)` ascending by year.
    fn rows_per_year(&mut self) -> Result<Vec<(i32, u64)>>;

    /// Up to `size` random rows. No reproducibility guarantee.
    fn sample(&mut self, size: usize) -> Result<Vec<PopulationRecord>>;
}
