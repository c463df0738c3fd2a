pub mod csv_loader;

pub use csv_loader::{parse_csv, LoadedListings, PropertyCsvLoader};
