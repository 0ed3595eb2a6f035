//! Per-state population totals.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::store::PopulationStore;

/// Population per requested state for one year, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationResult {
    pub year: i32,
    pub per_state: Vec<(String, i64)>,
}

impl AggregationResult {
    pub fn grand_total(&self) -> i64 {
        self.per_state.iter().map(|(_, p)| p).sum()
    }
}

/// Drop repeated states, keeping the first occurrence. The flag is `true`
/// when anything was removed.
pub fn dedup_states<S: AsRef<str>>(states: &[S]) -> (Vec<String>, bool) {
    let mut out: Vec<String> = Vec::with_capacity(states.len());
    for s in states {
        if !out.iter().any(|seen| seen == s.as_ref()) {
            out.push(s.as_ref().to_string());
        }
    }
    let removed = out.len() != states.len();
    if removed {
        warn!("duplicate state inputs detected; deduplicating");
    }
    (out, removed)
}

/// Largest year present in the table.
pub fn latest_year<S: PopulationStore + ?Sized>(store: &mut S) -> Result<i32> {
    store.latest_year()?.ok_or(Error::EmptyTable)
}

/// Sum population per state for `year`.
///
/// `states` must already be canonical full names. Duplicates are removed
/// (first occurrence wins). Every requested state must have at least one row
/// for `year`; a missing one is an error, never a zero.
pub fn sum_population<S, T>(store: &mut S, states: &[T], year: i32) -> Result<AggregationResult>
where
    S: PopulationStore + ?Sized,
    T: AsRef<str>,
{
    let requested = states.len();
    let (states, deduplicated) = dedup_states(states);
    if deduplicated {
        debug!(requested, kept = states.len(), "querying deduplicated state list");
    }
    let names: Vec<&str> = states.iter().map(String::as_str).collect();
    let rows = store.sum_population(&names, year)?;
    debug!(?rows, year, "grouped population sums");

    let mut per_state: Vec<(String, i64)> = Vec::with_capacity(states.len());
    for state in states {
        let total = rows
            .iter()
            .find(|(s, _)| *s == state)
            .map(|(_, p)| *p)
            .ok_or_else(|| Error::MissingStateInResult {
                state: state.clone(),
                year,
            })?;
        per_state.push((state, total));
    }

    Ok(AggregationResult { year, per_state })
}
