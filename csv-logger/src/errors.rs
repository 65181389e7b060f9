//! Module errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Log file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A previous append failed; the log file no longer accepts records.
    #[error("Logger disabled after a previous write failure")]
    Disabled,
}
