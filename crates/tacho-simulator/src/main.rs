//! Desktop simulator for the tacho wheel-speed data logger.
//!
//! Drives the full pipeline — edge timer, rolling window, sequence
//! discovery, CSV session — without hardware: a synthetic wheel run
//! (accelerate, cruise, brake) is converted to edge periods on a virtual
//! microsecond clock, and a `std::fs` directory stands in for the SD
//! card. Passing a directory as the first argument selects the fake
//! card's mount point (default `sim-card`); re-running against the same
//! directory exercises sequence continuation.
//!
//! The virtual clock deliberately starts just below the u32 boundary so
//! every run covers the wraparound-safe period arithmetic.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use log::info;

use tacho_core::config::{Config, LogConfig, RPM_WINDOW_SLOTS};
use tacho_core::speed::{EdgeRecorder, EdgeTimer, SharedRpmWindow, SpeedEstimator};
use tacho_core::storage::{CsvRow, LogSession, StorageError, Volume};

/// Virtual rotation clock rate: 1 MHz, like the device's tick source.
const TICKS_PER_SECOND: u32 = 1_000_000;

/// Edges between foreground polls, standing in for the poll interval.
const EDGES_PER_POLL: u32 = 10;

/// Storage volume backed by a host directory.
struct FsVolume {
    root: PathBuf,
}

impl FsVolume {
    fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl Volume for FsVolume {
    fn ensure_dir(&mut self, dir: &str) -> Result<(), StorageError> {
        fs::create_dir_all(self.root.join(dir)).map_err(StorageError::unavailable)
    }

    fn list_dir(&mut self, dir: &str, visit: &mut dyn FnMut(&str)) -> Result<(), StorageError> {
        let entries = fs::read_dir(self.root.join(dir)).map_err(StorageError::unavailable)?;
        for entry in entries {
            let entry = entry.map_err(StorageError::unavailable)?;
            if let Some(name) = entry.file_name().to_str() {
                visit(name);
            }
        }
        Ok(())
    }

    fn append(&mut self, dir: &str, name: &str, parts: &[&[u8]]) -> Result<(), StorageError> {
        let path = self.root.join(dir).join(name);
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(StorageError::write_failure)?;
        for part in parts {
            file.write_all(part).map_err(StorageError::write_failure)?;
        }
        file.sync_all().map_err(StorageError::write_failure)?;
        Ok(())
    }
}

/// Target wheel RPM over the simulated run: ramp up, hold, ramp down.
fn target_rpm(edge: u32, total: u32) -> f32 {
    let ramp = total / 4;
    let cruise = 900.0;
    if edge < ramp {
        60.0 + (cruise - 60.0) * edge as f32 / ramp as f32
    } else if edge < total - ramp {
        cruise
    } else {
        let left = (total - edge) as f32 / ramp as f32;
        60.0 + (cruise - 60.0) * left
    }
}

fn main() -> Result<(), StorageError> {
    env_logger::init();

    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sim-card"));
    info!("simulated card mounted at {}", root.display());

    let config = Config {
        log: LogConfig {
            header: Some("uptime_s,rpm,speed_kph"),
            ..LogConfig::default()
        },
        ..Config::default()
    };

    let window = SharedRpmWindow::<RPM_WINDOW_SLOTS>::new();
    let mut recorder = EdgeRecorder::new(EdgeTimer::new(TICKS_PER_SECOND), &window);
    let estimator = SpeedEstimator::new(&window, config.wheel);

    let mut session = LogSession::start(FsVolume::new(root), &config.log)?;
    info!("logging to {}", session.file_name());

    // Start the virtual clock half a second before the counter wraps.
    let mut clock: u32 = u32::MAX - TICKS_PER_SECOND / 2;
    let mut uptime_ticks: u64 = 0;
    let total_edges = 600;

    let mut row: CsvRow = CsvRow::new(config.log.delimiter);
    for edge in 0..total_edges {
        let rpm = target_rpm(edge, total_edges);
        let period = (60.0 * TICKS_PER_SECOND as f32 / rpm) as u32;
        clock = clock.wrapping_add(period);
        uptime_ticks += u64::from(period);
        recorder.record(clock);

        if edge % EDGES_PER_POLL != EDGES_PER_POLL - 1 {
            continue;
        }

        // Foreground poll: snapshot the estimator and append a row.
        let Some(sample) = estimator.sample() else {
            continue;
        };
        let uptime_s = uptime_ticks as f64 / f64::from(TICKS_PER_SECOND);

        row.clear();
        row.field(format_args!("{uptime_s:.1}"))?;
        row.field(format_args!("{:.1}", sample.rpm))?;
        row.field(format_args!("{:.2}", sample.kph))?;
        session.append_row(&row)?;
    }

    info!(
        "run complete: {} rows in {}",
        session.rows_written(),
        session.file_name()
    );
    Ok(())
}
