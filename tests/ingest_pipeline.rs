use std::io::Write;

use uscities::ingest::{ingest, parse_row, DEFAULT_BATCH_SIZE};
use uscities::io::cities_csv::{CityRows, RawCityRow};
use uscities::{Error, MemoryStore, PopulationStore};

fn raw(line: u64, city: &str, state: &str, year: &str, pop: &str) -> RawCityRow {
    RawCityRow {
        line,
        city: city.to_string(),
        state: state.to_string(),
        year: year.to_string(),
        population: pop.to_string(),
    }
}

fn rows(n: usize) -> Vec<uscities::Result<RawCityRow>> {
    (0..n)
        .map(|i| Ok(raw(i as u64 + 2, &format!("City {i}"), "TX", "2020", "1000")))
        .collect()
}

fn write_csv(body: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    f.write_all(body.as_bytes()).expect("write csv");
    f
}

#[test]
fn flush_count_is_ceil_of_rows_over_batch_size() {
    for (n, batch, expected) in [
        (0usize, 3usize, Vec::<usize>::new()),
        (2, 3, vec![2]),
        (3, 3, vec![3]),
        (6, 3, vec![3, 3]),
        (7, 3, vec![3, 3, 1]),
        (1001, DEFAULT_BATCH_SIZE, vec![500, 500, 1]),
    ] {
        let mut store = MemoryStore::new();
        let written = ingest(&mut store, rows(n), batch).unwrap();
        assert_eq!(written, n as u64);
        assert_eq!(store.flush_count(), n.div_ceil(batch));
        assert_eq!(store.flush_sizes(), expected.as_slice(), "n={n} batch={batch}");
        assert_eq!(store.len(), n);
    }
}

#[test]
fn zero_batch_size_is_rejected() {
    let mut store = MemoryStore::new();
    let err = ingest(&mut store, rows(1), 0).unwrap_err();
    assert!(matches!(err, Error::InvalidBatchSize));
    assert_eq!(store.flush_count(), 0);
}

#[test]
fn huge_batch_size_flushes_once_at_end() {
    let mut store = MemoryStore::new();
    let written = ingest(&mut store, rows(3), usize::MAX).unwrap();
    assert_eq!(written, 3);
    assert_eq!(store.flush_sizes(), &[3]);
}

#[test]
fn row_state_is_canonicalized() {
    let rec = parse_row(raw(2, "Albany", " ny ", "2020", "100")).unwrap();
    assert_eq!(rec.state, "New York");
    let rec = parse_row(raw(3, "Austin", "texas", "2020", "100")).unwrap();
    assert_eq!(rec.state, "Texas");
}

#[test]
fn malformed_rows_abort_and_name_the_line() {
    let cases = [
        raw(7, "Albany", "NY", "twenty", "100"),
        raw(7, "Albany", "NY", "2020", "1e3"),
        raw(7, "Albany", "NY", "2020", "-5"),
        raw(7, "Albany", "Atlantis", "2020", "5"),
    ];
    for case in cases {
        match parse_row(case.clone()) {
            Err(Error::MalformedRow { line, .. }) => assert_eq!(line, 7),
            other => panic!("expected MalformedRow for {case:?}, got {other:?}"),
        }
    }
}

#[test]
fn failure_mid_stream_keeps_earlier_batches_only() {
    let mut input = rows(4);
    input.push(Ok(raw(6, "Bad", "TX", "2020", "lots")));
    input.extend(rows(2));

    let mut store = MemoryStore::new();
    let err = ingest(&mut store, input, 3).unwrap_err();
    assert!(matches!(err, Error::MalformedRow { line: 6, .. }));
    assert_eq!(store.flush_sizes(), &[3]);
    assert_eq!(store.len(), 3);
}

#[test]
fn reloading_is_idempotent_and_last_write_wins() {
    let first = write_csv(
        "City,State,year,Population\n\
         Albany,NY,2020,100\n\
         Buffalo,NY,2020,50\n",
    );
    let second = write_csv(
        "City,State,year,Population\n\
         Albany,New York,2020,110\n\
         Buffalo,NY,2020,50\n\
         Albany,NY,2020,120\n",
    );

    let mut store = MemoryStore::new();
    ingest(&mut store, CityRows::from_path(first.path()).unwrap(), 500).unwrap();
    ingest(&mut store, CityRows::from_path(first.path()).unwrap(), 500).unwrap();
    assert_eq!(store.count_rows().unwrap(), 2);

    let written = ingest(&mut store, CityRows::from_path(second.path()).unwrap(), 2).unwrap();
    assert_eq!(written, 3, "count reflects rows presented, not rows changed");
    assert_eq!(store.count_rows().unwrap(), 2);
    assert_eq!(store.population("Albany", "New York", 2020), Some(120));
    assert_eq!(store.population("Buffalo", "New York", 2020), Some(50));
}

#[test]
fn csv_reader_trims_ignores_extra_columns_and_reports_lines() {
    let csv = "Rank, City ,State,year,Population\n\
               1, Albany , NY ,2020, 100 \n\
               2,Buffalo,NY,20x0,50\n";
    let mut it = CityRows::from_reader(csv.as_bytes()).unwrap();

    let first = it.next().unwrap().unwrap();
    assert_eq!(first, raw(2, "Albany", "NY", "2020", "100"));

    let second = it.next().unwrap().unwrap();
    assert_eq!(second.line, 3);
    match parse_row(second) {
        Err(Error::MalformedRow { line, reason }) => {
            assert_eq!(line, 3);
            assert!(reason.contains("20x0"), "{reason}");
        }
        other => panic!("expected MalformedRow, got {other:?}"),
    }
    assert!(it.next().is_none());
    assert!(it.next().is_none());
}

#[test]
fn missing_column_is_a_malformed_row() {
    let csv = "City,State,year\nAlbany,NY,2020\n";
    let mut store = MemoryStore::new();
    let err = ingest(&mut store, CityRows::from_reader(csv.as_bytes()).unwrap(), 10).unwrap_err();
    assert!(matches!(err, Error::MalformedRow { line: 2, .. }), "{err}");
}
