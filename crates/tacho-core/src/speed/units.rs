//! Pure unit conversions. No shared state, safe in any context.

/// Convert an inter-edge period in clock ticks to revolutions per minute.
pub fn period_to_rpm(ticks_per_second: u32, period_ticks: u32) -> f32 {
    60.0 * ticks_per_second as f32 / period_ticks as f32
}

/// Linear speed in metres per minute for a given shaft RPM.
///
/// `gear_scale` is the ratio of sensed revolutions to wheel revolutions.
pub fn linear_speed(rpm: f32, circumference_m: f32, gear_scale: f32) -> f32 {
    rpm * circumference_m * gear_scale
}

/// Metres per minute to kilometres per hour.
pub fn m_per_min_to_kph(m_per_min: f32) -> f32 {
    m_per_min * 60.0 / 1000.0
}

/// Metres per minute to metres per second.
pub fn m_per_min_to_mps(m_per_min: f32) -> f32 {
    m_per_min / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_to_rpm() {
        // One edge per second on a 1 MHz clock is 60 RPM.
        assert_eq!(period_to_rpm(1_000_000, 1_000_000), 60.0);
        // Half-second period doubles it.
        assert_eq!(period_to_rpm(1_000_000, 500_000), 120.0);
    }

    #[test]
    fn test_speed_conversions() {
        assert_eq!(linear_speed(100.0, 2.0, 1.0), 200.0);
        assert_eq!(m_per_min_to_kph(1000.0), 60.0);
        assert_eq!(m_per_min_to_mps(120.0), 2.0);
    }
}
