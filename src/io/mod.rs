pub mod cities_csv;
