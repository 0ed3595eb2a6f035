//! Post-load sanity snapshot of `city_population`.

use tracing::debug;

use crate::error::Result;
use crate::store::{PopulationRecord, PopulationStore};

pub const SAMPLE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub total_rows: u64,
    pub distinct_cities: u64,
    pub distinct_states: u64,
    /// `None` only when the table is empty.
    pub latest_year: Option<i32>,
    /// Ascending by year.
    pub rows_per_year: Vec<(i32, u64)>,
    /// Best-effort random rows; not reproducible.
    pub sample: Vec<PopulationRecord>,
}

/// Read-only statistics an operator can eyeball after a load.
pub fn summarize<S: PopulationStore + ?Sized>(store: &mut S) -> Result<LoadSummary> {
    let summary = LoadSummary {
        total_rows: store.count_rows()?,
        distinct_cities: store.count_distinct_cities()?,
        distinct_states: store.count_distinct_states()?,
        latest_year: store.latest_year()?,
        rows_per_year: store.rows_per_year()?,
        sample: store.sample(SAMPLE_SIZE)?,
    };
    debug!(rows_per_year = ?summary.rows_per_year, "load summary computed");
    Ok(summary)
}
