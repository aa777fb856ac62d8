//! Rotation timing and speed estimation.
//!
//! The edge side of this module runs in interrupt/async context and must
//! stay short, allocation-free and non-blocking; the estimator side runs
//! in the foreground loop. The two meet in [`SharedRpmWindow`], the only
//! state touched from both contexts.

pub mod edge;
pub mod units;
mod window;

pub use edge::{EdgeRecorder, EdgeTimer};
pub use window::RollingWindow;

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::config::WheelConfig;

/// A [`RollingWindow`] behind a critical-section lock.
///
/// `push` runs in edge context, `mean` in the foreground; both take the
/// same lock, so the foreground can never observe a half-updated window.
/// The lock never blocks, it only masks the interrupt source for the
/// duration of the slot update.
pub struct SharedRpmWindow<const N: usize> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<RollingWindow<N>>>,
}

impl<const N: usize> SharedRpmWindow<N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(RollingWindow::new())),
        }
    }

    /// Insert an instantaneous RPM sample, evicting the oldest when full.
    ///
    /// Called from the edge context only.
    pub fn push(&self, rpm: f32) {
        self.inner.lock(|window| window.borrow_mut().push(rpm));
    }

    /// Mean of the samples currently in the window, or `None` when no
    /// sample has arrived yet.
    ///
    /// Called from the foreground only.
    pub fn mean(&self) -> Option<f32> {
        self.inner.lock(|window| window.borrow().mean())
    }
}

impl<const N: usize> Default for SharedRpmWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// One coherent reading: the smoothed RPM and the speed derived from
/// that same RPM figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedSample {
    pub rpm: f32,
    pub kph: f32,
}

/// Foreground-side handle that turns the smoothed RPM into a speed
/// reading using the configured wheel geometry.
pub struct SpeedEstimator<'a, const N: usize> {
    window: &'a SharedRpmWindow<N>,
    wheel: WheelConfig,
}

impl<'a, const N: usize> SpeedEstimator<'a, N> {
    pub const fn new(window: &'a SharedRpmWindow<N>, wheel: WheelConfig) -> Self {
        Self { window, wheel }
    }

    /// Smoothed shaft RPM, `None` until the first edge pair has been seen.
    pub fn current_rpm(&self) -> Option<f32> {
        self.window.mean()
    }

    /// Linear speed in metres per minute, `None` when there is no data.
    pub fn speed_m_per_min(&self) -> Option<f32> {
        self.current_rpm()
            .map(|rpm| units::linear_speed(rpm, self.wheel.circumference_m, self.wheel.gear_scale))
    }

    /// Linear speed in km/h, `None` when there is no data.
    pub fn speed_kph(&self) -> Option<f32> {
        self.speed_m_per_min().map(units::m_per_min_to_kph)
    }

    /// RPM and speed from a single window read, so a logged row never
    /// pairs figures from two different snapshots.
    pub fn sample(&self) -> Option<SpeedSample> {
        let rpm = self.window.mean()?;
        let m_per_min =
            units::linear_speed(rpm, self.wheel.circumference_m, self.wheel.gear_scale);
        Some(SpeedSample {
            rpm,
            kph: units::m_per_min_to_kph(m_per_min),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_window_mean_matches_plain_window() {
        let shared = SharedRpmWindow::<5>::new();
        shared.push(10.0);
        shared.push(20.0);
        shared.push(30.0);

        assert_eq!(shared.mean(), Some(20.0));
    }

    #[test]
    fn test_estimator_no_data_propagates() {
        let shared = SharedRpmWindow::<5>::new();
        let estimator = SpeedEstimator::new(&shared, WheelConfig::default());

        assert_eq!(estimator.current_rpm(), None);
        assert_eq!(estimator.speed_m_per_min(), None);
        assert_eq!(estimator.speed_kph(), None);
    }

    #[test]
    fn test_estimator_speed_scales_with_wheel() {
        let shared = SharedRpmWindow::<5>::new();
        let wheel = WheelConfig {
            circumference_m: 2.0,
            gear_scale: 0.5,
        };
        let estimator = SpeedEstimator::new(&shared, wheel);

        shared.push(100.0);

        // 100 rpm * 2.0 m * 0.5 = 100 m/min = 6 km/h
        assert_eq!(estimator.speed_m_per_min(), Some(100.0));
        assert_eq!(estimator.speed_kph(), Some(6.0));
    }

    #[test]
    fn test_sample_pairs_rpm_with_its_own_speed() {
        let shared = SharedRpmWindow::<5>::new();
        let wheel = WheelConfig {
            circumference_m: 2.0,
            gear_scale: 0.5,
        };
        let estimator = SpeedEstimator::new(&shared, wheel);

        assert_eq!(estimator.sample(), None);

        shared.push(100.0);
        let sample = estimator.sample().unwrap();
        assert_eq!(sample.rpm, 100.0);
        assert_eq!(sample.kph, 6.0);
    }
}
