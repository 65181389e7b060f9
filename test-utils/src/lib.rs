//! Helpers shared by the workspace tests: a reader for CSV sensor logs and a sink that
//! collects emitted snapshots.
pub mod csv_loader;
pub mod sink_mock;

pub use csv_loader::{load_log, load_log_columns, LogColumn, LogColumnMapper, LogRow};
pub use sink_mock::SinkMock;
