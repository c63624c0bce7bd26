//! Current-time sources.
//!
//! Time-sensitive computations take a [`Clock`] instead of reading the wall
//! clock themselves. Production code uses [`SystemClock`]; tests pin time with
//! [`FrozenClock`].

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> SystemTime;
}

/// Reads the operating system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Always reports the same instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrozenClock {
    at: SystemTime,
}

impl FrozenClock {
    /// Freeze at the given instant.
    pub fn new(at: SystemTime) -> Self {
        Self { at }
    }

    /// Freeze at `secs` seconds after the unix epoch.
    pub fn at_unix(secs: u64) -> Self {
        Self::new(UNIX_EPOCH + Duration::from_secs(secs))
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> SystemTime {
        self.at
    }
}

/// Seconds since the unix epoch, with sub-second precision.
///
/// Instants before the epoch are negative.
pub fn unix_seconds_f64(t: SystemTime) -> f64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

/// Whole seconds since the unix epoch, saturating at zero before it.
pub fn unix_seconds(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2021-01-01T00:00:00Z.
    const NEW_YEAR_2021: u64 = 1_609_459_200;

    #[test]
    fn test_frozen_clock_does_not_move() {
        let clock = FrozenClock::at_unix(NEW_YEAR_2021);
        assert_eq!(clock.now(), clock.now());
        assert_eq!(unix_seconds(clock.now()), NEW_YEAR_2021);
    }

    #[test]
    fn test_unix_seconds_f64_fractional() {
        let t = UNIX_EPOCH + Duration::from_millis(1_500);
        assert_eq!(unix_seconds_f64(t), 1.5);
    }

    #[test]
    fn test_unix_seconds_before_epoch() {
        let t = UNIX_EPOCH - Duration::from_secs(10);
        assert_eq!(unix_seconds_f64(t), -10.0);
        assert_eq!(unix_seconds(t), 0);
    }

    #[test]
    fn test_system_clock_is_after_2021() {
        assert!(unix_seconds(SystemClock.now()) > NEW_YEAR_2021);
    }
}
