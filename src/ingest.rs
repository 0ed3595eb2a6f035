//! Batched, idempotent CSV -> `city_population` load.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::io::cities_csv::RawCityRow;
use crate::states;
use crate::store::{PopulationRecord, PopulationStore};

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Coerce one raw CSV row. The state column may be a postal code or a full
/// name; the record always carries the canonical full name.
pub fn parse_row(raw: RawCityRow) -> Result<PopulationRecord> {
    let malformed = |reason: String| Error::MalformedRow {
        line: raw.line,
        reason,
    };

    let year: i32 = raw
        .year
        .parse()
        .map_err(|e| malformed(format!("year '{}': {e}", raw.year)))?;
    let population: i32 = raw
        .population
        .parse()
        .map_err(|e| malformed(format!("population '{}': {e}", raw.population)))?;
    if population < 0 {
        return Err(malformed(format!("population {population} is negative")));
    }
    let state = states::normalize(&raw.state)
        .map_err(|_| malformed(format!("unknown state '{}'", raw.state)))?;

    Ok(PopulationRecord {
        city: raw.city,
        state: state.to_string(),
        year,
        population,
    })
}

/// Stream `rows` into `store`, flushing one upsert per `batch_size` rows and
/// once more for any remainder.
///
/// Fails fast: the first unreadable or malformed row aborts the load. Batches
/// flushed before the failure stay committed.
///
/// Returns the number of rows presented, not the number the upsert actually
/// changed. Reloading an unchanged file reports the same count although no
/// population value moves.
pub fn ingest<S, I>(store: &mut S, rows: I, batch_size: usize) -> Result<u64>
where
    S: PopulationStore + ?Sized,
    I: IntoIterator<Item = Result<RawCityRow>>,
{
    if batch_size == 0 {
        return Err(Error::InvalidBatchSize);
    }

    let mut bucket: Vec<PopulationRecord> = Vec::with_capacity(batch_size.min(DEFAULT_BATCH_SIZE));
    let mut presented: u64 = 0;
    let mut flushes: usize = 0;

    for raw in rows {
        bucket.push(parse_row(raw?)?);
        presented += 1;
        if bucket.len() >= batch_size {
            store.upsert_batch(&bucket)?;
            flushes += 1;
            debug!(rows = bucket.len(), flushes, "batch flushed");
            bucket.clear();
        }
    }
    if !bucket.is_empty() {
        store.upsert_batch(&bucket)?;
        flushes += 1;
        debug!(rows = bucket.len(), flushes, "final batch flushed");
    }

    info!(rows = presented, flushes, "inserted/updated rows");
    Ok(presented)
}
