use chrono::{DateTime, Duration, Utc};

/// Source of "now" for cache expiry, swappable for a fixed instant in tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    /// The instant an entry written now with `ttl` stops being valid.
    #[must_use]
    pub fn deadline(&self, ttl: Duration) -> DateTime<Utc> {
        self.now() + ttl
    }

    #[must_use]
    pub fn has_passed(&self, deadline: DateTime<Utc>) -> bool {
        self.now() >= deadline
    }
}

/// Deterministic timestamp for tests (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_passes_after_ttl() {
        let mut clock = fixed_clock();
        let deadline = clock.deadline(Duration::hours(24));

        clock.advance(Duration::hours(23));
        assert!(!clock.has_passed(deadline));

        clock.advance(Duration::hours(1));
        assert!(clock.has_passed(deadline));
    }

    #[test]
    fn advance_ignores_default_clock() {
        let mut clock = Clock::default();
        clock.advance(Duration::days(365));
        assert!(matches!(clock, Clock::Default));
    }
}
