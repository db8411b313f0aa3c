// lidar_core/src/sensor/pacer.rs

/// Decides on which fixed steps the beams actually fire.
///
/// Every call to [`TickPacer::advance`] counts one step; once the count reaches
/// `floor(tick_skip)` the counter starts over and the step is a sampling step.
/// A `tick_skip` below 2 therefore samples on every step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickPacer {
    counter: u32,
}

impl TickPacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one step and returns whether sampling is due on it.
    pub fn advance(&mut self, tick_skip: f64) -> bool {
        self.counter = self.counter.saturating_add(1);
        // NaN and negatives saturate to 0.
        let interval = tick_skip.floor() as u32;
        if self.counter >= interval {
            self.counter = 0;
            true
        } else {
            false
        }
    }

    /// Steps counted since the last sampling step.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}
