use std::error::Error;
use std::path::Path;

use csv::{Reader, StringRecord};

use common::types::{AccelerometerReading, FixType};

#[repr(usize)]
#[derive(Debug, Clone, Copy)]
pub enum LogColumn {
    Timestamp,
    XAcceleration,
    YAcceleration,
    ZAcceleration,
    Latitude,
    Longitude,
    Altitude,
    Speed,
    Course,
    SatelliteCount,
    FixType,
    GpsTimestamp,
}

impl From<LogColumn> for usize {
    fn from(value: LogColumn) -> Self {
        value as usize
    }
}

#[derive(Clone, Debug, Default)]
pub struct LogColumnMapper {
    columns: Vec<usize>,
}

impl LogColumnMapper {
    pub fn new() -> Self {
        Self { columns: vec![] }
    }

    pub fn columns(&self) -> Vec<usize> {
        self.columns.clone()
    }

    pub fn add_acceleration(&mut self) -> &mut Self {
        self.columns.push(LogColumn::XAcceleration.into());
        self.columns.push(LogColumn::YAcceleration.into());
        self.columns.push(LogColumn::ZAcceleration.into());
        self
    }

    pub fn add_position(&mut self) -> &mut Self {
        self.columns.push(LogColumn::Latitude.into());
        self.columns.push(LogColumn::Longitude.into());
        self
    }

    pub fn add_motion(&mut self) -> &mut Self {
        self.columns.push(LogColumn::Altitude.into());
        self.columns.push(LogColumn::Speed.into());
        self.columns.push(LogColumn::Course.into());
        self
    }
}

/// One data row of a sensor log, with timestamps kept as written.
#[derive(Clone, Debug, PartialEq)]
pub struct LogRow {
    pub timestamp: String,
    pub acceleration: AccelerometerReading,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub speed: f64,
    pub course: f64,
    pub satellite_count: u32,
    pub fix_type: FixType,
    pub gps_timestamp: String,
}

fn field(record: &StringRecord, column: LogColumn) -> Result<&str, Box<dyn Error>> {
    record
        .get(column.into())
        .ok_or_else(|| format!("Missing column {:?}", column).into())
}

fn number(record: &StringRecord, column: LogColumn) -> Result<f64, Box<dyn Error>> {
    Ok(field(record, column)?.parse::<f64>()?)
}

impl TryFrom<&StringRecord> for LogRow {
    type Error = Box<dyn Error>;

    fn try_from(record: &StringRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            timestamp: field(record, LogColumn::Timestamp)?.to_string(),
            acceleration: AccelerometerReading::new(
                number(record, LogColumn::XAcceleration)?,
                number(record, LogColumn::YAcceleration)?,
                number(record, LogColumn::ZAcceleration)?,
            ),
            latitude: number(record, LogColumn::Latitude)?,
            longitude: number(record, LogColumn::Longitude)?,
            altitude: number(record, LogColumn::Altitude)?,
            speed: number(record, LogColumn::Speed)?,
            course: number(record, LogColumn::Course)?,
            satellite_count: field(record, LogColumn::SatelliteCount)?.parse::<u32>()?,
            fix_type: FixType::try_from(field(record, LogColumn::FixType)?)?,
            gps_timestamp: field(record, LogColumn::GpsTimestamp)?.to_string(),
        })
    }
}

/// Header and typed data rows of a sensor log.
#[derive(Clone, Debug)]
pub struct LogFile {
    pub header: Vec<String>,
    pub rows: Vec<LogRow>,
}

pub fn load_log(file_path: impl AsRef<Path>) -> Result<LogFile, Box<dyn Error>> {
    let mut rdr = Reader::from_path(file_path)?;
    let header = rdr.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(LogRow::try_from(&record)?);
    }

    Ok(LogFile { header, rows })
}

pub fn load_log_columns<T: TryFrom<Vec<f64>>>(
    file_path: impl AsRef<Path>,
    columns: &[usize],
) -> Result<Vec<T>, Box<dyn Error>> {
    if columns.is_empty() {
        return Err("No columns provided".into());
    }

    let mut rdr = Reader::from_path(file_path)?;
    let mut result = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let values = columns
            .iter()
            .map(|&i| -> Result<f64, String> {
                record
                    .get(i)
                    .ok_or_else(|| format!("Column index {} out of bounds", i))?
                    .parse::<f64>()
                    .map_err(|e| e.to_string())
            })
            .collect::<Result<Vec<f64>, String>>()?;
        let value = T::try_from(values).map_err(|_| "Failed to convert to T".to_string())?;
        result.push(value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const LOG: &str = "Timestamp,X_Acceleration,Y_Acceleration,Z_Acceleration,Latitude,Longitude,Altitude,Speed,Course,SatelliteCount,FixType,GPSTimestamp
2024-03-09 14:05:07.042,1.0000,2.0000,3.0000,-19.815712,-43.954200,852.35,1.50,270.00,6,\"3D Fix\",2024-03-09 17:05:06.000
2024-03-09 14:05:07.142,0.1000,0.2000,9.8100,-19.815713,-43.954201,852.40,1.60,271.00,0,\"Awaiting signal\",2024-03-09 17:05:07.000
";

    fn write_log() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sensor_data.csv");
        fs::write(&path, LOG).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_log() {
        let (_dir, path) = write_log();
        let log = load_log(&path).unwrap();

        assert_eq!(log.header.len(), 12);
        assert_eq!(log.header[10], "FixType");
        assert_eq!(log.rows.len(), 2);

        let row = &log.rows[0];
        assert_eq!(row.timestamp, "2024-03-09 14:05:07.042");
        assert_eq!(row.acceleration, AccelerometerReading::new(1.0, 2.0, 3.0));
        assert_eq!(row.latitude, -19.815712);
        assert_eq!(row.satellite_count, 6);
        assert_eq!(row.fix_type, FixType::Fix3D);
        assert_eq!(row.gps_timestamp, "2024-03-09 17:05:06.000");
        assert_eq!(log.rows[1].fix_type, FixType::AwaitingSignal);
    }

    #[test]
    fn test_load_inexistent_log() {
        let dir = tempdir().unwrap();
        assert!(load_log(dir.path().join("missing.csv")).is_err());
    }

    #[test]
    fn test_load_acceleration_columns() {
        let (_dir, path) = write_log();
        let mut mapper = LogColumnMapper::new();
        mapper.add_acceleration();

        let data = load_log_columns::<AccelerometerReading>(&path, &mapper.columns()).unwrap();
        assert_eq!(
            data,
            vec![
                AccelerometerReading::new(1.0, 2.0, 3.0),
                AccelerometerReading::new(0.1, 0.2, 9.81)
            ]
        );
    }

    #[test]
    fn test_load_position_and_motion_columns() {
        let (_dir, path) = write_log();
        let mut mapper = LogColumnMapper::new();
        mapper.add_position().add_motion();

        let data = load_log_columns::<Vec<f64>>(&path, &mapper.columns()).unwrap();
        assert_eq!(data[0], vec![-19.815712, -43.9542, 852.35, 1.5, 270.0]);
    }

    #[test]
    fn test_load_non_numeric_column() {
        let (_dir, path) = write_log();
        let columns = vec![LogColumn::FixType.into()];
        assert!(load_log_columns::<Vec<f64>>(&path, &columns).is_err());
    }

    #[test]
    fn test_load_no_columns() {
        let (_dir, path) = write_log();
        assert!(load_log_columns::<Vec<f64>>(&path, &[]).is_err());
    }

    #[test]
    fn test_load_out_of_bounds_column() {
        let (_dir, path) = write_log();
        assert!(load_log_columns::<Vec<f64>>(&path, &[0, 1, 20]).is_err());
    }
}
