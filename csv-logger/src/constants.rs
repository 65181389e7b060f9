pub const LOG_HEADER: &str = "Timestamp,X_Acceleration,Y_Acceleration,Z_Acceleration,Latitude,Longitude,Altitude,Speed,Course,SatelliteCount,FixType,GPSTimestamp";
pub const LOG_DIR_NAME: &str = "DataCollector";
pub const LOG_FILE_PREFIX: &str = "sensor_data_";
pub const LOG_FILE_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";
pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Overrides the base directory picked by `CsvLogger::with_default_location`.
pub const LOG_DIR_ENV: &str = "DATA_COLLECTOR_DIR";
