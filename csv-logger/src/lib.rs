//! Append-only CSV log of sampled snapshots.
pub mod constants;
pub mod errors;
mod logger;

pub use errors::LoggerError;
pub use logger::{format_record, CsvLogger};
