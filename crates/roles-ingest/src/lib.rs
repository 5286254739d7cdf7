pub mod config_file;
pub mod csv_store;

pub use config_file::{load_raw_config, parse_raw_config};
pub use csv_store::{CsvStore, default_output_path};
