/// Fixed-capacity FIFO of recent RPM samples.
///
/// Slots start out unset and are excluded from the mean until the window
/// fills; once full, each insert evicts the oldest sample. The window
/// itself is lock-free; cross-context sharing goes through
/// [`SharedRpmWindow`](super::SharedRpmWindow).
#[derive(Debug)]
pub struct RollingWindow<const N: usize> {
    slots: [Option<f32>; N],
    /// Index of the slot the next push overwrites.
    next: usize,
}

impl<const N: usize> RollingWindow<N> {
    pub const fn new() -> Self {
        Self {
            slots: [None; N],
            next: 0,
        }
    }

    /// Insert a sample, evicting the oldest when the window is full.
    pub fn push(&mut self, rpm: f32) {
        self.slots[self.next] = Some(rpm);
        self.next = (self.next + 1) % N;
    }

    /// Number of slots currently holding a sample.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    /// Arithmetic mean of the set slots, or `None` when all are unset.
    pub fn mean(&self) -> Option<f32> {
        let mut sum = 0.0f32;
        let mut count = 0u32;
        for slot in self.slots.iter().flatten() {
            sum += slot;
            count += 1;
        }
        if count == 0 {
            None
        } else {
            Some(sum / count as f32)
        }
    }
}

impl<const N: usize> Default for RollingWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_window_has_no_mean() {
        let window = RollingWindow::<5>::new();
        assert!(window.is_empty());
        assert_eq!(window.mean(), None);
    }

    #[test]
    fn test_partial_window_averages_set_slots_only() {
        let mut window = RollingWindow::<5>::new();
        window.push(10.0);
        window.push(20.0);
        window.push(30.0);

        assert_eq!(window.len(), 3);
        assert_eq!(window.mean(), Some(20.0));

        window.push(40.0);
        assert_eq!(window.mean(), Some(25.0));
    }

    #[test]
    fn test_full_window_evicts_oldest() {
        let mut window = RollingWindow::<5>::new();
        for rpm in [10.0, 20.0, 30.0, 40.0, 50.0] {
            window.push(rpm);
        }
        assert_eq!(window.mean(), Some(30.0));

        // Sixth push evicts the 10.0; mean is now (20+30+40+50+60)/5.
        window.push(60.0);
        assert_eq!(window.len(), 5);
        assert_eq!(window.mean(), Some(40.0));
    }
}
