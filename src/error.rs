use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown state: '{0}'")]
    UnknownState(String),
    #[error("malformed CSV row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
    #[error("table city_population is empty")]
    EmptyTable,
    #[error("no population rows for state '{state}' in year {year}")]
    MissingStateInResult { state: String, year: i32 },
    #[error("batch size must be at least 1")]
    InvalidBatchSize,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("postgres error: {0}")]
    Store(#[from] postgres::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
