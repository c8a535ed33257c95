//! Frame clock for the per-frame update.
//!
//! Elapsed time is accumulated in integer microseconds so debounce decisions
//! do not drift with floating-point rounding. Wall-clock deltas are taken as
//! measured, including long stalls. Replays drive the clock with `advance_us`
//! instead of the wall clock.

use std::time::Instant;

pub struct FrameClock {
    elapsed_us: u64,
    pub frame_count: u64,
    last_instant: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            elapsed_us: 0,
            frame_count: 0,
            last_instant: Instant::now(),
        }
    }

    /// Sample the wall clock and start a new frame.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let dt_us = u64::try_from(now.duration_since(self.last_instant).as_micros())
            .unwrap_or(u64::MAX);
        self.last_instant = now;
        self.advance_us(dt_us);
    }

    /// Move the clock forward by a fixed amount without touching the wall clock.
    pub fn advance_us(&mut self, dt_us: u64) {
        self.elapsed_us = self.elapsed_us.saturating_add(dt_us);
        self.frame_count += 1;
    }

    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_us / 1000
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas_cycle::{DebounceGate, DEFAULT_DEBOUNCE_MS};
    use std::time::Duration;

    #[test]
    fn new_clock_starts_at_zero() {
        let clock = FrameClock::new();
        assert_eq!(clock.elapsed_us(), 0);
        assert_eq!(clock.elapsed_ms(), 0);
        assert_eq!(clock.frame_count, 0);
    }

    #[test]
    fn advance_accumulates_integer_time() {
        let mut clock = FrameClock::new();
        for _ in 0..3 {
            clock.advance_us(16_667);
        }
        assert_eq!(clock.elapsed_us(), 50_001);
        assert_eq!(clock.elapsed_ms(), 50);
        assert_eq!(clock.frame_count, 3);
    }

    #[test]
    fn advance_saturates_instead_of_overflowing() {
        let mut clock = FrameClock::new();
        clock.advance_us(u64::MAX - 5);
        clock.advance_us(100);
        assert_eq!(clock.elapsed_us(), u64::MAX);
    }

    #[test]
    fn single_long_step_opens_debounce_gate() {
        let mut clock = FrameClock::new();
        clock.advance_us(16_000);
        let gate = DebounceGate::new(DEFAULT_DEBOUNCE_MS, clock.elapsed_ms());
        clock.advance_us(1_000_000);
        assert!(gate.is_open(clock.elapsed_ms()));
    }

    #[test]
    fn stalled_frame_is_not_capped() {
        let mut clock = FrameClock::new();
        clock.begin_frame();
        let gate = DebounceGate::new(DEFAULT_DEBOUNCE_MS, clock.elapsed_ms());
        std::thread::sleep(Duration::from_millis(600));
        clock.begin_frame();
        assert_eq!(clock.frame_count, 2);
        assert!(gate.elapsed_ms(clock.elapsed_ms()) >= 600);
        assert!(gate.is_open(clock.elapsed_ms()));
    }
}
