use chrono::{DateTime, Duration, Utc};

/// Time source injected into services so tests can pin the clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// Wall-clock time.
    #[default]
    System,
    /// Frozen time for deterministic tests.
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock frozen at the given instant.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current instant according to this clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// Moves a frozen clock forward. Has no effect on `Clock::System`.
    pub fn advance(&mut self, by: Duration) {
        if let Clock::Fixed(at) = self {
            *at += by;
        }
    }
}

/// Deterministic Unix timestamp for tests (2025-06-15T06:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_750_000_000;

/// Returns the instant every frozen test clock starts from.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be representable")
}

/// Returns a `Clock` frozen at [`fixed_now`].
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

//
// ─── TESTS ──────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_returns_pinned_instant() {
        let clock = fixed_clock();
        assert_eq!(clock.now(), fixed_now());
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn advance_moves_frozen_clock() {
        let mut clock = fixed_clock();
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(90));
    }

    #[test]
    fn advance_leaves_system_clock_alone() {
        let mut clock = Clock::System;
        clock.advance(Duration::hours(1));
        assert_eq!(clock, Clock::System);
    }
}
