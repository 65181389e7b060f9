use clap::Parser;
use log::{debug, error, info};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use common::types::{FixType, Snapshot};
use csv_logger::{CsvLogger, LoggerError};
use publisher::{listener, Listener};
use sampler::constants::DEFAULT_SAMPLING_PERIOD_MILLIS;
use sampler::Sampler;
use sensors::adapters::mock::{
    SimulatedAccelerometer, SimulatedLocationProvider, SimulatedSatelliteStatus,
};
use sensors::ports::SatelliteStatusSource;
use sensors::{AccelerometerSource, LocationSource};

const ACCELEROMETER_PERIOD_MILLIS: u64 = 20;
const TIME_TO_FIRST_FIX_MILLIS: u64 = 1500;
const SATELLITE_STATUS_PERIOD_MILLIS: u64 = 1000;

#[derive(Parser, Debug)]
#[command(name = "data-collector")]
#[command(about = "Samples accelerometer and GPS readings into a CSV log", long_about = None)]
struct Args {
    /// Sampling interval in milliseconds
    #[arg(long, default_value_t = DEFAULT_SAMPLING_PERIOD_MILLIS)]
    interval_ms: u64,

    /// Base directory for the log; a DataCollector subdirectory is created inside it
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Stop after this many milliseconds instead of waiting for Ctrl+C
    #[arg(long)]
    run_for_ms: Option<u64>,

    /// Starting latitude of the simulated receiver
    #[arg(long, default_value_t = -19.9167, allow_hyphen_values = true)]
    latitude: f64,

    /// Starting longitude of the simulated receiver
    #[arg(long, default_value_t = -43.9345, allow_hyphen_values = true)]
    longitude: f64,
}

struct ConsolePresenter;

impl ConsolePresenter {
    fn present(&self, _id: Uuid, snapshot: Arc<Snapshot>) {
        if let (Some(accel), Some(fix)) = (&snapshot.accelerometer, &snapshot.location) {
            debug!(
                "accel=({:.3}, {:.3}, {:.3}) position=({:.6}, {:.6}) alt={:.1} sats={} fix={}",
                accel.x,
                accel.y,
                accel.z,
                fix.latitude,
                fix.longitude,
                fix.altitude,
                fix.satellite_count,
                fix.fix_type
            );
        }
    }
}

fn logger_listener(logger: Arc<CsvLogger>) -> Listener<Snapshot> {
    Listener::new(move |_id: Uuid, snapshot: Arc<Snapshot>| {
        match logger.log_data(&snapshot) {
            Ok(_) | Err(LoggerError::Disabled) => {}
            Err(e) => error!("Sensor logging stopped: {}", e),
        }
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let accelerometer = Arc::new(AccelerometerSource::new(Arc::new(
        SimulatedAccelerometer::new(Duration::from_millis(ACCELEROMETER_PERIOD_MILLIS))?,
    )));
    let side_channel: Arc<dyn SatelliteStatusSource> = Arc::new(SimulatedSatelliteStatus::new(
        Duration::from_millis(TIME_TO_FIRST_FIX_MILLIS),
        Duration::from_millis(SATELLITE_STATUS_PERIOD_MILLIS),
    ));
    let location = Arc::new(LocationSource::new(
        Arc::new(
            SimulatedLocationProvider::new(args.latitude, args.longitude)?
                .with_motion(850.0, 1.4, 90.0),
        ),
        Some(side_channel),
    ));

    let mut fix_type_listener = Listener::new(|_id: Uuid, fix_type: Arc<FixType>| {
        info!("GPS status: {}", fix_type);
    });
    location
        .status_tracker()
        .register_fix_type_listener(&mut fix_type_listener);

    let logger = Arc::new(match args.output_dir {
        Some(dir) => CsvLogger::new(dir)?,
        None => CsvLogger::with_default_location()?,
    });

    let collector = Arc::new(Sampler::new(accelerometer, location));
    let presenter = Arc::new(ConsolePresenter);
    collector.register_listener(&mut listener!(presenter.present));
    collector.register_listener(&mut logger_listener(logger.clone()));

    let handle = sampler::run(
        collector.clone(),
        Duration::from_millis(args.interval_ms),
        args.run_for_ms,
        CancellationToken::new(),
    )?;
    handle.await?;

    info!(
        "Wrote {} records to {}",
        logger.record_count(),
        logger.file_path().display()
    );
    Ok(())
}
