use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Mutex;

/// Source of "now" for services; swapped for a manual clock in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub fn format_exact(dt: DateTime<Utc>) -> String {
    dt.format("%d/%m/%Y %H:%M").to_string()
}

/// Human-relative rendering of `then` as seen from `now`.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return plural(minutes, "minute");
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return plural(hours, "hour");
    }
    let days = elapsed.num_days();
    if days < 7 {
        return plural(days, "day");
    }
    let weeks = days / 7;
    if weeks < 5 {
        return plural(weeks, "week");
    }
    then.format("%d/%m/%Y").to_string()
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 20, h, m, 0).unwrap()
    }

    #[test]
    fn renders_short_spans() {
        let now = at(12, 0);
        assert_eq!(relative_time(now - Duration::seconds(20), now), "just now");
        assert_eq!(relative_time(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(relative_time(now - Duration::minutes(3), now), "3 minutes ago");
        assert_eq!(relative_time(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(relative_time(now - Duration::days(2), now), "2 days ago");
        assert_eq!(relative_time(now - Duration::days(14), now), "2 weeks ago");
    }

    #[test]
    fn falls_back_to_date_for_old_entries() {
        let now = at(12, 0);
        let then = now - Duration::days(90);
        assert_eq!(relative_time(then, now), then.format("%d/%m/%Y").to_string());
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let now = at(12, 0);
        assert_eq!(relative_time(now + Duration::minutes(5), now), "just now");
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(at(8, 0));
        clock.advance(Duration::minutes(61));
        assert_eq!(clock.now(), at(9, 1));
        assert_eq!(format_exact(clock.now()), "20/05/2026 09:01");
    }
}
