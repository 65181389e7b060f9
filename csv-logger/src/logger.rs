use chrono::{Local, NaiveDateTime};
use log::{error, info};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use common::types::{AccelerometerReading, LocationFix, Snapshot};

use crate::constants::{
    LOG_DIR_ENV, LOG_DIR_NAME, LOG_FILE_PREFIX, LOG_FILE_TIME_FORMAT, LOG_HEADER,
    RECORD_TIME_FORMAT,
};
use crate::errors::LoggerError;

struct LogFile {
    file: File,
    record_count: u64,
    failed: bool,
}

/// Appends one CSV row per complete [`Snapshot`] to a timestamped log file.
///
/// Every append happens under a single lock, so rows from concurrent callers never
/// interleave and land on disk in the order the lock was acquired. After the first write
/// failure the logger stays disabled and rejects further rows.
pub struct CsvLogger {
    path: PathBuf,
    state: Mutex<LogFile>,
}

impl CsvLogger {
    /// Creates `base_dir/DataCollector` if needed and opens a new
    /// `sensor_data_<yyyyMMdd_HHmmss>.csv` file in it, starting with the header row.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, LoggerError> {
        let dir = base_dir.as_ref().join(LOG_DIR_NAME);
        fs::create_dir_all(&dir)?;

        let file_name = format!(
            "{}{}.csv",
            LOG_FILE_PREFIX,
            Local::now().format(LOG_FILE_TIME_FORMAT)
        );
        let path = dir.join(file_name);
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        writeln!(file, "{}", LOG_HEADER)?;
        file.flush()?;

        info!("Logging sensor data to {}", path.display());
        Ok(Self {
            path,
            state: Mutex::new(LogFile {
                file,
                record_count: 0,
                failed: false,
            }),
        })
    }

    /// Opens the log under `$DATA_COLLECTOR_DIR`, falling back to `$HOME/Documents` and then
    /// to the system temp directory.
    pub fn with_default_location() -> Result<Self, LoggerError> {
        Self::new(default_base_dir())
    }

    /// Appends a row for `snapshot`. Returns `Ok(false)` without writing when either half of
    /// the snapshot is missing.
    pub fn log_data(&self, snapshot: &Snapshot) -> Result<bool, LoggerError> {
        let (Some(reading), Some(fix)) = (&snapshot.accelerometer, &snapshot.location) else {
            return Ok(false);
        };

        let mut state = self.lock_state();
        if state.failed {
            return Err(LoggerError::Disabled);
        }
        let record = format_record(Local::now().naive_local(), reading, fix);
        let result = state
            .file
            .write_all(record.as_bytes())
            .and_then(|_| state.file.flush());
        if let Err(e) = result {
            state.failed = true;
            error!("Failed to append to {}: {}", self.path.display(), e);
            return Err(e.into());
        }
        state.record_count += 1;
        Ok(true)
    }

    /// Number of data rows written so far, header excluded.
    pub fn record_count(&self) -> u64 {
        self.lock_state().record_count
    }

    pub fn is_disabled(&self) -> bool {
        self.lock_state().failed
    }

    pub fn file_path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }

    fn lock_state(&self) -> MutexGuard<'_, LogFile> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn default_base_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(LOG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home).join("Documents");
    }
    std::env::temp_dir()
}

/// Formats one log row, newline included.
///
/// Accelerations use 4 decimals, latitude and longitude 6, altitude, speed and course 2.
/// The fix type is double quoted.
pub fn format_record(
    capture_time: NaiveDateTime,
    reading: &AccelerometerReading,
    fix: &LocationFix,
) -> String {
    format!(
        "{},{:.4},{:.4},{:.4},{:.6},{:.6},{:.2},{:.2},{:.2},{},\"{}\",{}\n",
        capture_time.format(RECORD_TIME_FORMAT),
        reading.x,
        reading.y,
        reading.z,
        fix.latitude,
        fix.longitude,
        fix.altitude,
        fix.speed,
        fix.course,
        fix.satellite_count,
        fix.fix_type,
        fix.timestamp.format(RECORD_TIME_FORMAT),
    )
}
