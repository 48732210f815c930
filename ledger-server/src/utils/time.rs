//! Clock and calendar-date helpers
//!
//! Dates on the wire are `YYYY/M/D` (no zero padding) in the store's
//! reference time zone.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Source of "now" for expiry decisions
pub trait Clock: Send + Sync {
    /// Unix millis
    fn now_millis(&self) -> i64;

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_millis()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        shared::util::now_millis()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    pub fn at(at: DateTime<Utc>) -> Self {
        Self::new(at.timestamp_millis())
    }

    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// `YYYY/M/D`
pub fn format_ymd(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.year(), date.month(), date.day())
}

/// Calendar date of `at` in `tz`, formatted `YYYY/M/D`
pub fn local_ymd(at: DateTime<Utc>, tz: Tz) -> String {
    format_ymd(at.with_timezone(&tz).date_naive())
}

/// Local midnight of `date` in `tz` as an instant
///
/// DST gap fallback: if local midnight does not exist, use UTC midnight.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Parse typed date text: `YYYY/M/D`, `YYYY-MM-DD`, `YYYY年M月D日`
///
/// Anything after the first whitespace (a time of day) is ignored.
pub fn parse_ymd(text: &str) -> Option<NaiveDate> {
    let date_part = text.split_whitespace().next()?;
    let unified: String = date_part
        .chars()
        .filter(|c| *c != '日')
        .map(|c| match c {
            '年' | '月' | '-' => '/',
            other => other,
        })
        .collect();

    let mut parts = unified.split('/');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() || year < 1000 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}
