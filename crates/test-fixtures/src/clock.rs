use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, Utc};
use vitals_core::traits::start_of_day_in;
use vitals_core::Clock;

/// A clock that only moves when told to. Days follow UTC.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// 2026-10-18T12:00:00Z.
    pub fn noon() -> Self {
        Self::new(
            DateTime::parse_from_rfc3339("2026-10-18T12:00:00Z")
                .expect("valid timestamp")
                .with_timezone(&Utc),
        )
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap() = to;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    fn start_of_day(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        start_of_day_in(at, &Utc)
    }
}

/// A clock driven by Tokio's time source, so paused-time tests see
/// timestamps advance with `tokio::time::sleep`. Days follow UTC.
#[derive(Debug)]
pub struct TokioClock {
    base: DateTime<Utc>,
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn new(base: DateTime<Utc>) -> Self {
        Self {
            base,
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = tokio::time::Instant::now() - self.origin;
        self.base + TimeDelta::from_std(elapsed).unwrap_or(TimeDelta::zero())
    }

    fn start_of_day(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        start_of_day_in(at, &Utc)
    }
}
