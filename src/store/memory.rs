use std::collections::{BTreeMap, BTreeSet};

use rand::seq::IteratorRandom;

use super::{PopulationRecord, PopulationStore};
use crate::error::Result;

type Key = (String, String, i32);

/// In-process `city_population` table.
///
/// Keeps the size of every flushed batch so callers can inspect how a load
/// was split into writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: BTreeMap<Key, i32>,
    flushes: Vec<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `upsert_batch` calls so far.
    pub fn flush_count(&self) -> usize {
        self.flushes.len()
    }

    /// Batch sizes in flush order.
    pub fn flush_sizes(&self) -> &[usize] {
        &self.flushes
    }

    pub fn population(&self, city: &str, state: &str, year: i32) -> Option<i32> {
        self.rows
            .get(&(city.to_string(), state.to_string(), year))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl PopulationStore for MemoryStore {
    fn upsert_batch(&mut self, batch: &[PopulationRecord]) -> Result<()> {
        for r in batch {
            self.rows
                .insert((r.city.clone(), r.state.clone(), r.year), r.population);
        }
        self.flushes.push(batch.len());
        Ok(())
    }

    fn latest_year(&mut self) -> Result<Option<i32>> {
        Ok(self.rows.keys().map(|(_, _, year)| *year).max())
    }

    fn sum_population(&mut self, states: &[&str], year: i32) -> Result<Vec<(String, i64)>> {
        let mut sums: BTreeMap<&str, i64> = BTreeMap::new();
        for ((_, state, y), pop) in &self.rows {
            if *y == year && states.contains(&state.as_str()) {
                *sums.entry(state.as_str()).or_insert(0) += i64::from(*pop);
            }
        }
        Ok(sums.into_iter().map(|(s, p)| (s.to_string(), p)).collect())
    }

    fn count_rows(&mut self) -> Result<u64> {
        Ok(self.rows.len() as u64)
    }

    fn count_distinct_cities(&mut self) -> Result<u64> {
        let cities: BTreeSet<&str> = self.rows.keys().map(|(c, _, _)| c.as_str()).collect();
        Ok(cities.len() as u64)
    }

    fn count_distinct_states(&mut self) -> Result<u64> {
        let states: BTreeSet<&str> = self.rows.keys().map(|(_, s, _)| s.as_str()).collect();
        Ok(states.len() as u64)
    }

    fn rows_per_year(&mut self) -> Result<Vec<(i32, u64)>> {
        let mut per_year: BTreeMap<i32, u64> = BTreeMap::new();
        for (_, _, year) in self.rows.keys() {
            *per_year.entry(*year).or_insert(0) += 1;
        }
        Ok(per_year.into_iter().collect())
    }

    fn sample(&mut self, size: usize) -> Result<Vec<PopulationRecord>> {
        let mut rng = rand::thread_rng();
        Ok(self
            .rows
            .iter()
            .choose_multiple(&mut rng, size)
            .into_iter()
            .map(|((city, state, year), population)| PopulationRecord {
                city: city.clone(),
                state: state.clone(),
                year: *year,
                population: *population,
            })
            .collect())
    }
}
