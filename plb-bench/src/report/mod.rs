//! Result output: CSV table and run summary

pub mod csv_writer;
pub mod summary;

pub use csv_writer::{write_csv, write_report, CSV_HEADER};
pub use summary::{log_summary, render_summary};
