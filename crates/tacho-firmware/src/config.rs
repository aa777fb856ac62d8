//! Tuning constants for the tacho firmware

use tacho_core::config::LogConfig;

/// Rotation clock rate: the edge task stamps edges with the microsecond
/// uptime counter, truncated to u32.
pub const TICKS_PER_SECOND: u32 = 1_000_000;

/// Foreground poll interval between CSV rows
pub const POLL_INTERVAL_MS: u64 = 1_000;

/// SD SPI initialization frequency (slow for card init)
pub const SD_SPI_INIT_FREQ_KHZ: u32 = 400;

/// SD SPI working frequency after init
pub const SD_SPI_WORK_FREQ_MHZ: u32 = 16;

/// Max retries for SD card initialization
pub const SD_INIT_RETRIES: u8 = 3;

/// Consecutive row-write failures tolerated before logging halts
pub const MAX_WRITE_FAILURES: u8 = 5;

/// System state values for LED indication (AtomicU8)
pub const STATE_INIT: u8 = 0;
pub const STATE_SD_ERROR: u8 = 1;
pub const STATE_LOGGING: u8 = 2;

/// Log file naming and row formatting for this build
pub const LOG: LogConfig<'static> = LogConfig {
    directory: "logs",
    base_name: "log",
    extension: "csv",
    delimiter: ",",
    header: Some("uptime_s,rpm,speed_kph"),
};
