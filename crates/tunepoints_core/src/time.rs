//! Wall-clock access for completion timestamps.
//!
//! Stores stamp `completed_at` / `last_played_at` through a [`Clock`] so
//! tests can pin time without touching the system clock.

use std::time::{SystemTime, UNIX_EPOCH};

/// Time source measured in Unix epoch milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// Reads the system clock on every call.
    #[default]
    System,
    /// Always returns the stored instant until advanced.
    Fixed(i64),
}

impl Clock {
    /// Returns a clock pinned at `epoch_ms`.
    pub fn fixed(epoch_ms: i64) -> Self {
        Self::Fixed(epoch_ms)
    }

    /// Returns the current instant according to this clock.
    pub fn now_ms(&self) -> i64 {
        match self {
            Self::System => system_now_ms(),
            Self::Fixed(epoch_ms) => *epoch_ms,
        }
    }

    /// Moves a fixed clock forward. No effect on `Clock::System`.
    pub fn advance(&mut self, delta_ms: i64) {
        if let Self::Fixed(epoch_ms) = self {
            *epoch_ms = epoch_ms.saturating_add(delta_ms);
        }
    }
}

fn system_now_ms() -> i64 {
    // A clock set before 1970 reports the epoch itself.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::Clock;

    #[test]
    fn fixed_clock_is_stable_and_advances() {
        let mut clock = Clock::fixed(1_700_000_000_000);
        assert_eq!(clock.now_ms(), 1_700_000_000_000);
        assert_eq!(clock.now_ms(), 1_700_000_000_000);

        clock.advance(1_500);
        assert_eq!(clock.now_ms(), 1_700_000_001_500);
    }

    #[test]
    fn system_clock_ignores_advance_and_reports_recent_time() {
        let mut clock = Clock::System;
        clock.advance(10_000_000);
        // 2020-01-01T00:00:00Z
        assert!(clock.now_ms() > 1_577_836_800_000);
    }
}
