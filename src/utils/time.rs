use chrono::{DateTime, Days, NaiveTime, Utc};

/// Source of "now" for anything that reasons about UTC day boundaries or expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 00:00:00 UTC of the day after `now`.
pub fn next_midnight_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = now.date_naive() + Days::new(1);
    tomorrow.and_time(NaiveTime::default()).and_utc()
}

/// Whole seconds from `now` until `deadline`, never less than one.
pub fn seconds_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (deadline - now).num_seconds().max(1) as u64
}
