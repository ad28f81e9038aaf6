//! Wall-clock access for the date and time injectors.
//!
//! [`Clock`] wraps a [`ClockProvider`] so the built-in injectors can be tested
//! against a frozen or advancing clock instead of the system time.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::{DateTime, TimeZone, Utc};
//! use quill_core::{Clock, ClockProvider};
//!
//! /// A clock that always returns the same instant.
//! struct FixedClock(DateTime<Utc>);
//!
//! impl ClockProvider for FixedClock {
//!     fn now(&self) -> DateTime<Utc> {
//!         self.0
//!     }
//! }
//!
//! let instant = Utc.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).unwrap();
//! let clock = Clock::with_provider(Arc::new(FixedClock(instant)));
//! assert_eq!(clock.now(), instant);
//! ```

use chrono::{DateTime, Utc};
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// ClockProvider Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Source of the current time.
pub trait ClockProvider: Send + Sync + 'static {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// System clock provider using [`Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockProvider for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clock
// ─────────────────────────────────────────────────────────────────────────────

/// Cloneable handle to a [`ClockProvider`].
///
/// Uses the system clock by default.
#[derive(Clone)]
pub struct Clock {
    provider: Arc<dyn ClockProvider>,
}

impl Clock {
    /// Creates a clock backed by the system time.
    #[must_use]
    pub fn system() -> Self {
        Self {
            provider: Arc::new(SystemClock),
        }
    }

    /// Creates a clock with a custom provider.
    #[must_use]
    pub fn with_provider(provider: Arc<dyn ClockProvider>) -> Self {
        Self { provider }
    }

    /// Returns the current instant.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.provider.now()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl core::fmt::Debug for Clock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Clock").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MockClock for Testing
// ─────────────────────────────────────────────────────────────────────────────

/// Mock clock with controllable time.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use quill_core::{Clock, MockClock};
///
/// let mock = Arc::new(MockClock::new(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap()));
/// let clock = Clock::with_provider(mock.clone());
///
/// mock.advance(TimeDelta::minutes(1));
/// // clock.now() is now 2025-01-01T00:00:00Z
/// ```
#[cfg(any(test, feature = "test-utils"))]
pub struct MockClock {
    current: parking_lot::RwLock<DateTime<Utc>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockClock {
    /// Creates a mock clock set to the given instant.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: parking_lot::RwLock::new(start),
        }
    }

    /// Advances the clock by the given delta.
    pub fn advance(&self, delta: chrono::TimeDelta) {
        *self.current.write() += delta;
    }

    /// Sets the clock to a specific instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.current.write() = instant;
    }

    /// Returns the current instant.
    #[must_use]
    pub fn current(&self) -> DateTime<Utc> {
        *self.current.read()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl ClockProvider for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    #[test]
    fn clock_default_uses_system_time() {
        let clock = Clock::default();
        let before = Utc::now();
        let clock_now = clock.now();
        let after = Utc::now();

        assert!(clock_now >= before);
        assert!(clock_now <= after);
    }

    #[test]
    fn mock_clock_advance() {
        let start = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();
        let mock = MockClock::new(start);

        mock.advance(TimeDelta::minutes(1));

        assert_eq!(
            mock.current(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn clock_reads_through_provider() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mock = Arc::new(MockClock::new(start));
        let clock = Clock::with_provider(mock.clone());

        let target = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        mock.set(target);

        assert_eq!(clock.now(), target);
    }
}
