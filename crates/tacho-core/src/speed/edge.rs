//! Interrupt-side rotation timing.

use super::SharedRpmWindow;
use super::units;

/// Measures the period between consecutive sensor edges and converts it
/// to an instantaneous RPM figure.
///
/// The whole of [`EdgeTimer::on_edge`] runs in the interrupt/async edge
/// context: no blocking, no allocation, no storage access. The tick
/// counter is treated as modulo 2³², so periods stay correct across the
/// counter wrapping.
pub struct EdgeTimer {
    ticks_per_second: u32,
    last_tick: Option<u32>,
}

impl EdgeTimer {
    pub const fn new(ticks_per_second: u32) -> Self {
        Self {
            ticks_per_second,
            last_tick: None,
        }
    }

    /// Handle one sensor edge at tick `now`.
    ///
    /// The first edge after startup only seeds the timestamp and produces
    /// no sample. A zero period (contact bounce, spurious trigger) is
    /// discarded without touching any state.
    pub fn on_edge(&mut self, now: u32) -> Option<f32> {
        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return None;
        };

        let period = now.wrapping_sub(last);
        if period == 0 {
            return None;
        }

        self.last_tick = Some(now);
        Some(units::period_to_rpm(self.ticks_per_second, period))
    }
}

/// The one object handed to the edge execution context: an [`EdgeTimer`]
/// paired with the shared window it publishes into.
pub struct EdgeRecorder<'a, const N: usize> {
    timer: EdgeTimer,
    window: &'a SharedRpmWindow<N>,
}

impl<'a, const N: usize> EdgeRecorder<'a, N> {
    pub const fn new(timer: EdgeTimer, window: &'a SharedRpmWindow<N>) -> Self {
        Self { timer, window }
    }

    /// Record one edge; pushes into the window only when the timer
    /// produced a valid sample.
    pub fn record(&mut self, now_tick: u32) {
        if let Some(rpm) = self.timer.on_edge(now_tick) {
            self.window.push(rpm);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const US_PER_SEC: u32 = 1_000_000;

    #[test]
    fn test_first_edge_seeds_without_sample() {
        let mut timer = EdgeTimer::new(US_PER_SEC);
        assert_eq!(timer.on_edge(1_000), None);
        // Second edge one second later: 60 RPM.
        assert_eq!(timer.on_edge(1_000 + US_PER_SEC), Some(60.0));
    }

    #[test]
    fn test_zero_period_is_discarded() {
        let mut timer = EdgeTimer::new(US_PER_SEC);
        timer.on_edge(5_000);
        assert_eq!(timer.on_edge(5_000), None);
        // The duplicate edge must not have moved the reference tick.
        assert_eq!(timer.on_edge(5_000 + US_PER_SEC), Some(60.0));
    }

    #[test]
    fn test_period_survives_counter_wraparound() {
        let mut timer = EdgeTimer::new(US_PER_SEC);
        timer.on_edge(u32::MAX - 499_999);
        // 500k ticks before the wrap plus 500k after: a 1 s period.
        assert_eq!(timer.on_edge(500_000), Some(60.0));
    }

    #[test]
    fn test_recorder_only_pushes_valid_samples() {
        let window = SharedRpmWindow::<5>::new();
        let mut recorder = EdgeRecorder::new(EdgeTimer::new(US_PER_SEC), &window);

        recorder.record(0);
        assert_eq!(window.mean(), None);

        recorder.record(US_PER_SEC); // 60 RPM
        recorder.record(US_PER_SEC); // spurious duplicate, ignored
        recorder.record(US_PER_SEC + US_PER_SEC / 2); // 120 RPM

        assert_eq!(window.mean(), Some(90.0));
    }
}
