use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct CsvFields {
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "State")]
    state: String,
    year: String,
    #[serde(rename = "Population")]
    population: String,
}

/// One CSV row before type coercion. `line` is the 1-based line number in
/// the file, used in error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCityRow {
    pub line: u64,
    pub city: String,
    pub state: String,
    pub year: String,
    pub population: String,
}

/// Forward-only stream over a city population CSV with columns
/// `City,State,year,Population`. Extra columns are ignored; fields are
/// trimmed. Single pass: once exhausted it stays exhausted.
pub struct CityRows<R> {
    headers: csv::StringRecord,
    records: csv::StringRecordsIntoIter<R>,
}

impl CityRows<File> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::from_csv(rdr)
    }
}

impl<R: Read> CityRows<R> {
    pub fn from_reader(reader: R) -> Result<Self> {
        let rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::from_csv(rdr)
    }

    fn from_csv(mut rdr: csv::Reader<R>) -> Result<Self> {
        let headers = rdr.headers()?.clone();
        Ok(Self {
            headers,
            records: rdr.into_records(),
        })
    }
}

impl<R: Read> Iterator for CityRows<R> {
    type Item = Result<RawCityRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(Error::Csv(e))),
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let fields: CsvFields = match record.deserialize(Some(&self.headers)) {
            Ok(fields) => fields,
            Err(e) => {
                return Some(Err(Error::MalformedRow {
                    line,
                    reason: e.to_string(),
                }))
            }
        };
        Some(Ok(RawCityRow {
            line,
            city: fields.city,
            state: fields.state,
            year: fields.year,
            population: fields.population,
        }))
    }
}
