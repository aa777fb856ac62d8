use embassy_time::Instant;
use embedded_sdmmc::{TimeSource, Timestamp};

/// Time source based on uptime since boot (no RTC on board).
/// Base date: 2025-01-01 00:00:00 + uptime offset, so files carry
/// distinguishable timestamps for ordering.
pub struct UptimeTimeSource;

impl TimeSource for UptimeTimeSource {
    fn get_timestamp(&self) -> Timestamp {
        let uptime_secs = Instant::now().as_secs();
        let secs_in_day: u64 = 86400;

        let days = uptime_secs / secs_in_day;
        let rem = uptime_secs % secs_in_day;
        let hours = (rem / 3600) as u8;
        let minutes = ((rem % 3600) / 60) as u8;
        let seconds = (rem % 60) as u8;

        // Stay within 28 days per month to avoid calendar overflow.
        let month = (1 + (days / 28) % 12) as u8;
        let day = 1 + (days % 28) as u8;

        Timestamp::from_calendar(2025, month, day, hours, minutes, seconds)
            .unwrap_or(Timestamp::from_calendar(2025, 1, 1, 0, 0, 0).unwrap())
    }
}
