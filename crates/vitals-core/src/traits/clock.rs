use chrono::{DateTime, Local, TimeZone, Utc};

/// Source of "now" and of calendar-day boundaries.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;

    /// Midnight that opens the calendar day containing `at`.
    fn start_of_day(&self, at: DateTime<Utc>) -> DateTime<Utc>;
}

/// Wall clock; days follow the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn start_of_day(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        start_of_day_in(at, &Local)
    }
}

/// Midnight of `at`'s calendar day in `tz`, expressed in UTC.
///
/// Falls back to `at` itself when midnight does not exist in `tz`.
pub fn start_of_day_in<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    at.with_timezone(tz)
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(tz.clone()).earliest())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or(at)
}
