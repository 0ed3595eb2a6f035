use uscities::ingest::ingest;
use uscities::io::cities_csv::CityRows;
use uscities::query::{dedup_states, latest_year, sum_population};
use uscities::render::render_totals;
use uscities::states::normalize;
use uscities::{Error, MemoryStore, PopulationRecord, PopulationStore};

fn loaded_store() -> MemoryStore {
    let csv = "City,State,year,Population\n\
               Albany,NY,2020,100\n\
               Buffalo,NY,2020,50\n\
               Los Angeles,CA,2020,200\n\
               Albany,NY,2010,90\n";
    let mut store = MemoryStore::new();
    ingest(&mut store, CityRows::from_reader(csv.as_bytes()).unwrap(), 500).unwrap();
    store
}

fn canonical(tokens: &[&str]) -> Vec<&'static str> {
    tokens.iter().map(|t| normalize(t).unwrap()).collect()
}

#[test]
fn load_then_query_ny_ca() {
    let mut store = loaded_store();
    let year = latest_year(&mut store).unwrap();
    assert_eq!(year, 2020);

    let result = sum_population(&mut store, &canonical(&["NY", "CA"]), year).unwrap();
    assert_eq!(
        result.per_state,
        vec![("New York".to_string(), 150), ("California".to_string(), 200)]
    );
    assert_eq!(result.grand_total(), 350);

    let out = render_totals(&result);
    insta::assert_snapshot!(out.trim_end(), @r"
    New York                  150
    California                200
    ----------------------------------
    Grand Total               350
    ");
}

#[test]
fn output_follows_request_order() {
    let mut store = loaded_store();
    let result = sum_population(&mut store, &canonical(&["california", "new york"]), 2020).unwrap();
    let order: Vec<&str> = result.per_state.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(order, ["California", "New York"]);
}

#[test]
fn duplicate_states_collapse_to_one_line() {
    let (states, removed) = dedup_states(&canonical(&["NY", "New York"]));
    assert!(removed);
    assert_eq!(states, ["New York"]);

    let (_, removed) = dedup_states(&canonical(&["NY", "CA"]));
    assert!(!removed);

    let mut store = loaded_store();
    let both = sum_population(&mut store, &canonical(&["NY", "New York"]), 2020).unwrap();
    let single = sum_population(&mut store, &canonical(&["New York"]), 2020).unwrap();
    assert_eq!(both, single);
    assert_eq!(both.per_state.len(), 1);
    assert_eq!(both.grand_total(), 150);
}

#[test]
fn state_without_rows_for_the_year_is_an_error() {
    let mut store = loaded_store();
    let err = sum_population(&mut store, &canonical(&["NY", "TX"]), 2020).unwrap_err();
    match err {
        Error::MissingStateInResult { state, year } => {
            assert_eq!(state, "Texas");
            assert_eq!(year, 2020);
        }
        other => panic!("expected MissingStateInResult, got {other:?}"),
    }

    let err = sum_population(&mut store, &canonical(&["CA"]), 2010).unwrap_err();
    assert!(matches!(err, Error::MissingStateInResult { .. }));
}

#[test]
fn earlier_year_can_be_queried_explicitly() {
    let mut store = loaded_store();
    let result = sum_population(&mut store, &canonical(&["NY"]), 2010).unwrap();
    assert_eq!(result.grand_total(), 90);
}

#[test]
fn latest_year_on_empty_table_fails() {
    let mut store = MemoryStore::new();
    assert!(matches!(latest_year(&mut store), Err(Error::EmptyTable)));

    let rec = |year| PopulationRecord {
        city: "Albany".into(),
        state: "New York".into(),
        year,
        population: 1,
    };
    store.upsert_batch(&[rec(2010), rec(2020)]).unwrap();
    assert_eq!(latest_year(&mut store).unwrap(), 2020);
}
