pub mod config;
pub mod credentials;
pub mod error;
pub mod ingest;
pub mod io;
pub mod query;
pub mod render;
pub mod report;
pub mod states;
pub mod store;

pub use error::{Error, Result};
pub use query::AggregationResult;
pub use report::LoadSummary;
pub use store::{MemoryStore, PgStore, PopulationRecord, PopulationStore};
