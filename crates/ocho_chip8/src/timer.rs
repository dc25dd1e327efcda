use std::time::Duration;

use crate::TIMER_HZ;

/// Converts elapsed real time into whole 60 Hz timer ticks.
///
/// The clock carries the sub-period remainder forward, so the long-run tick
/// rate stays at 60 Hz no matter how irregular the frame cadence is. This is
/// what keeps the delay/sound timers decoupled from instruction throughput.
#[derive(Debug, Default)]
pub struct TimerClock {
    residual: Duration,
}

impl TimerClock {
    const PERIOD: Duration = Duration::from_nanos(1_000_000_000 / TIMER_HZ as u64);

    pub fn new() -> Self {
        Self::default()
    }

    /// Account for `elapsed` wall time and return the number of whole
    /// 1/60 s periods that fit, keeping the remainder for the next call.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.residual += elapsed;
        let ticks = (self.residual.as_nanos() / Self::PERIOD.as_nanos()) as u32;
        self.residual -= Self::PERIOD * ticks;
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_period_elapses_no_tick() {
        let mut clock = TimerClock::new();
        assert_eq!(clock.advance(Duration::from_millis(10)), 0);
    }

    #[test]
    fn residual_carries_across_calls() {
        let mut clock = TimerClock::new();
        // Two 10ms advances straddle one 16.67ms period.
        assert_eq!(clock.advance(Duration::from_millis(10)), 0);
        assert_eq!(clock.advance(Duration::from_millis(10)), 1);
        // 3.33ms left over; 14ms more crosses the next boundary.
        assert_eq!(clock.advance(Duration::from_millis(14)), 1);
    }

    #[test]
    fn long_gap_yields_many_ticks() {
        let mut clock = TimerClock::new();
        assert_eq!(clock.advance(Duration::from_secs(1)), 60);
    }

    #[test]
    fn rate_is_exact_over_time() {
        let mut clock = TimerClock::new();
        let mut total = 0;
        // 600 frames of 16ms = 9.6s = 576 periods exactly.
        for _ in 0..600 {
            total += clock.advance(Duration::from_millis(16));
        }
        assert_eq!(total, 576);
    }
}
