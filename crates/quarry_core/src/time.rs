//! Deterministic fixed-step clock
//!
//! The sandbox simulates at a fixed 60Hz; rendering interpolates between
//! ticks and is outside this crate.

use std::time::Duration;

/// Fixed simulation tick rate (60 Hz = 16.666ms per tick)
pub const TICK_RATE_HZ: u32 = 60;
pub const TICK_DURATION: Duration = Duration::from_micros(16_666); // ~16.666ms

/// Tracks how far the simulation has advanced, in whole ticks.
pub struct FrameClock {
    ticks: u64,
    elapsed: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            ticks: 0,
            elapsed: Duration::ZERO,
        }
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn advance(&mut self) {
        self.ticks += 1;
        self.elapsed += TICK_DURATION;
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
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

    #[test]
    fn clock_advances_in_fixed_steps() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.ticks(), 0);
        for _ in 0..TICK_RATE_HZ {
            clock.advance();
        }
        assert_eq!(clock.ticks(), u64::from(TICK_RATE_HZ));
        // One simulated second, within the 16.666ms rounding.
        let drift = Duration::from_secs(1).abs_diff(clock.elapsed());
        assert!(drift < Duration::from_millis(1));
    }
}
