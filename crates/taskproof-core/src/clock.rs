//! Time sources for stamping attestation messages.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Source of "now".
pub trait Clock: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to.
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(initial: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(initial),
        }
    }

    /// Advance time.
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }

    /// Set the time to a specific value.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_advances_only_on_request() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::seconds(5));
        assert_eq!(clock.now(), start + Duration::seconds(5));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
