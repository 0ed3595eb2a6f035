use std::collections::HashMap;

use postgres::types::ToSql;
use postgres::{Client, NoTls};
use tracing::debug;

use super::{PopulationRecord, PopulationStore};
use crate::error::Result;

/// Postgres caps bind parameters per statement at 65535; four per row.
const MAX_ROWS_PER_STATEMENT: usize = 65535 / 4;

const UPSERT_PREFIX: &str = "INSERT INTO city_population (city, state, year, population) VALUES ";
const UPSERT_SUFFIX: &str =
    " ON CONFLICT (city, state, year) DO UPDATE SET population = EXCLUDED.population";

/// Where and as whom to connect. The password is never logged.
#[derive(Clone)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionParams {
    /// `user@host:port/database`, safe to log.
    pub fn describe(&self) -> String {
        format!("{}@{}:{}/{}", self.user, self.host, self.port, self.database)
    }
}

impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// One open connection to the `city_population` database.
///
/// The connection lives exactly as long as this value; dropping it closes
/// the socket on every exit path, including a failed batch.
pub struct PgStore {
    client: Client,
    target: String,
}

impl PgStore {
    pub fn connect(params: &ConnectionParams) -> Result<Self> {
        let mut cfg = postgres::Config::new();
        cfg.host(&params.host)
            .port(params.port)
            .user(&params.user)
            .password(&params.password)
            .dbname(&params.database);
        let client = cfg.connect(NoTls)?;
        let target = params.describe();
        debug!(db = %target, "connected to postgres");
        Ok(Self { client, target })
    }

    /// Create `city_population` and its natural-key constraint if missing.
    pub fn ensure_schema(&mut self) -> Result<()> {
        self.client.batch_execute(
            r#"
            CREATE TABLE IF NOT EXISTS city_population (
              city TEXT NOT NULL,
              state TEXT NOT NULL,
              year INTEGER NOT NULL,
              population INTEGER NOT NULL CHECK (population >= 0),
              CONSTRAINT city_population_natural_key UNIQUE (city, state, year)
            );
            "#,
        )?;
        Ok(())
    }

    fn count(&mut self, sql: &str) -> Result<u64> {
        let row = self.client.query_one(sql, &[])?;
        let n: i64 = row.get(0);
        Ok(n.max(0) as u64)
    }
}

impl Drop for PgStore {
    fn drop(&mut self) {
        debug!(db = %self.target, "postgres connection closed");
    }
}

/// Postgres rejects an ON CONFLICT DO UPDATE that touches the same row twice
/// in one statement, so collapse repeated keys, keeping the last value.
fn last_write_wins(batch: &[PopulationRecord]) -> Vec<&PopulationRecord> {
    let mut slot: HashMap<(&str, &str, i32), usize> = HashMap::with_capacity(batch.len());
    let mut out: Vec<&PopulationRecord> = Vec::with_capacity(batch.len());
    for r in batch {
        match slot.get(&r.key()) {
            Some(&i) => out[i] = r,
            None => {
                slot.insert(r.key(), out.len());
                out.push(r);
            }
        }
    }
    out
}

fn upsert_sql(rows: usize) -> String {
    let mut sql = String::with_capacity(UPSERT_PREFIX.len() + rows * 24 + UPSERT_SUFFIX.len());
    sql.push_str(UPSERT_PREFIX);
    for i in 0..rows {
        if i > 0 {
            sql.push(',');
        }
        let p = i * 4;
        sql.push_str(&format!("(${},${},${},${})", p + 1, p + 2, p + 3, p + 4));
    }
    sql.push_str(UPSERT_SUFFIX);
    sql
}

impl PopulationStore for PgStore {
    fn upsert_batch(&mut self, batch: &[PopulationRecord]) -> Result<()> {
        let rows = last_write_wins(batch);
        for chunk in rows.chunks(MAX_ROWS_PER_STATEMENT) {
            let sql = upsert_sql(chunk.len());
            let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(chunk.len() * 4);
            for r in chunk {
                params.push(&r.city);
                params.push(&r.state);
                params.push(&r.year);
                params.push(&r.population);
            }
            let affected = self.client.execute(sql.as_str(), &params)?;
            debug!(rows = chunk.len(), affected, "flushed upsert batch");
        }
        Ok(())
    }

    fn latest_year(&mut self) -> Result<Option<i32>> {
        let row = self
            .client
            .query_one("SELECT MAX(year) FROM city_population", &[])?;
        Ok(row.get(0))
    }

    fn sum_population(&mut self, states: &[&str], year: i32) -> Result<Vec<(String, i64)>> {
        let names: Vec<&str> = states.to_vec();
        let sql = "SELECT state, SUM(population) FROM city_population \
                   WHERE state = ANY($1) AND year = $2 GROUP BY state";
        debug!(sql, ?names, year, "executing");
        let rows = self.client.query(sql, &[&names, &year])?;
        Ok(rows
            .iter()
            .map(|row| (row.get::<_, String>(0), row.get::<_, i64>(1)))
            .collect())
    }

    fn count_rows(&mut self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM city_population")
    }

    fn count_distinct_cities(&mut self) -> Result<u64> {
        self.count("SELECT COUNT(DISTINCT city) FROM city_population")
    }

    fn count_distinct_states(&mut self) -> Result<u64> {
        self.count("SELECT COUNT(DISTINCT state) FROM city_population")
    }

    fn rows_per_year(&mut self) -> Result<Vec<(i32, u64)>> {
        let rows = self.client.query(
            "SELECT year, COUNT(*) FROM city_population GROUP BY year ORDER BY year",
            &[],
        )?;
        Ok(rows
            .iter()
            .map(|row| (row.get::<_, i32>(0), row.get::<_, i64>(1).max(0) as u64))
            .collect())
    }

    fn sample(&mut self, size: usize) -> Result<Vec<PopulationRecord>> {
        let limit = i64::try_from(size).unwrap_or(i64::MAX);
        let rows = self.client.query(
            "SELECT city, state, year, population FROM city_population ORDER BY random() LIMIT $1",
            &[&limit],
        )?;
        Ok(rows
            .iter()
            .map(|row| PopulationRecord {
                city: row.get(0),
                state: row.get(1),
                year: row.get(2),
                population: row.get(3),
            })
            .collect())
    }
}
