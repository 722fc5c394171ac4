//! Reference zones and day-boundary math.
//!
//! # Invariants
//! - `end_of_day(t) == start_of_day(t) + END_OF_DAY_OFFSET_MS`.
//! - Instants that cannot be represented as a calendar date are a caller
//!   contract violation; stores reject them before they reach this module.

use chrono::{
    DateTime, Datelike, Local, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Milliseconds in a nominal 24h day.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;
/// Offset from `start_of_day` to the last millisecond of the same day window.
pub const END_OF_DAY_OFFSET_MS: i64 = DAY_MS - 1;

const GAP_PROBE_STEP_MINUTES: i64 = 15;
const GAP_PROBE_MAX_STEPS: usize = 4 * 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    UnknownTimezone(String),
}

impl Display for CalendarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTimezone(name) => write!(
                f,
                "unknown timezone `{name}`; expected `local`, `UTC` or an IANA name"
            ),
        }
    }
}

impl Error for CalendarError {}

/// Timezone in which calendar days are evaluated.
///
/// `Local` follows the host zone, matching a device-local habit tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceZone {
    #[default]
    Local,
    Utc,
    Named(Tz),
}

impl ReferenceZone {
    /// Calendar date that contains `instant_ms` in this zone.
    pub fn calendar_day(&self, instant_ms: i64) -> NaiveDate {
        match self {
            Self::Local => local_date(&Local, instant_ms),
            Self::Utc => local_date(&Utc, instant_ms),
            Self::Named(tz) => local_date(tz, instant_ms),
        }
    }

    /// First instant (epoch ms) of `date` in this zone.
    pub fn start_of_date(&self, date: NaiveDate) -> i64 {
        match self {
            Self::Local => first_instant_of(&Local, date),
            Self::Utc => first_instant_of(&Utc, date),
            Self::Named(tz) => first_instant_of(tz, date),
        }
    }

    pub fn start_of_day(&self, instant_ms: i64) -> i64 {
        self.start_of_date(self.calendar_day(instant_ms))
    }

    pub fn end_of_day(&self, instant_ms: i64) -> i64 {
        self.start_of_day(instant_ms) + END_OF_DAY_OFFSET_MS
    }

    /// Inclusive `[start_of_day, end_of_day]` window around `instant_ms`.
    pub fn day_window(&self, instant_ms: i64) -> InstantRange {
        let start_ms = self.start_of_day(instant_ms);
        InstantRange {
            start_ms,
            end_ms: start_ms + END_OF_DAY_OFFSET_MS,
        }
    }

    pub fn weekday(&self, instant_ms: i64) -> Weekday {
        self.calendar_day(instant_ms).weekday()
    }
}

impl Display for ReferenceZone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Utc => f.write_str("UTC"),
            Self::Named(tz) => f.write_str(tz.name()),
        }
    }
}

impl FromStr for ReferenceZone {
    type Err = CalendarError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        if trimmed.eq_ignore_ascii_case("utc") {
            return Ok(Self::Utc);
        }
        trimmed
            .parse::<Tz>()
            .map(Self::Named)
            .map_err(|_| CalendarError::UnknownTimezone(trimmed.to_string()))
    }
}

/// Inclusive instant range in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstantRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl InstantRange {
    pub fn contains(&self, instant_ms: i64) -> bool {
        self.start_ms <= instant_ms && instant_ms <= self.end_ms
    }
}

/// Start of the calendar day containing `instant_ms`, evaluated in `zone`.
pub fn start_of_day(instant_ms: i64, zone: &ReferenceZone) -> i64 {
    zone.start_of_day(instant_ms)
}

/// Last millisecond of the day window containing `instant_ms`.
pub fn end_of_day(instant_ms: i64, zone: &ReferenceZone) -> i64 {
    zone.end_of_day(instant_ms)
}

/// Current wall-clock instant in epoch milliseconds.
///
/// Only binaries read the clock; core computations take `now` as input.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// English weekday name used in statistics output.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn local_date<Z: TimeZone>(zone: &Z, instant_ms: i64) -> NaiveDate {
    DateTime::from_timestamp_millis(instant_ms)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .with_timezone(zone)
        .date_naive()
}

fn first_instant_of<Z: TimeZone>(zone: &Z, date: NaiveDate) -> i64 {
    let mut wall_clock = date.and_time(NaiveTime::MIN);
    // A DST gap may swallow local midnight; the day then begins at the first
    // wall-clock time that exists.
    for _ in 0..GAP_PROBE_MAX_STEPS {
        if let Some(instant) = zone.from_local_datetime(&wall_clock).earliest() {
            return instant.timestamp_millis();
        }
        wall_clock += TimeDelta::minutes(GAP_PROBE_STEP_MINUTES);
    }
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::{
        end_of_day, start_of_day, weekday_name, InstantRange, ReferenceZone, DAY_MS,
        END_OF_DAY_OFFSET_MS,
    };
    use chrono::{NaiveDate, TimeZone, Utc, Weekday};

    fn utc_ms(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .expect("valid utc datetime")
            .timestamp_millis()
    }

    #[test]
    fn start_of_day_in_utc_truncates_to_midnight() {
        let zone = ReferenceZone::Utc;
        let instant = utc_ms(2024, 3, 14, 17, 45);
        assert_eq!(start_of_day(instant, &zone), utc_ms(2024, 3, 14, 0, 0));
        assert_eq!(
            end_of_day(instant, &zone),
            utc_ms(2024, 3, 14, 0, 0) + END_OF_DAY_OFFSET_MS
        );
    }

    #[test]
    fn start_of_day_is_idempotent() {
        let zone: ReferenceZone = "America/New_York".parse().expect("known zone");
        for instant in [
            utc_ms(2024, 3, 10, 4, 59),
            utc_ms(2024, 3, 10, 12, 0),
            utc_ms(2024, 11, 3, 5, 30),
            utc_ms(2024, 7, 1, 3, 59),
        ] {
            let once = zone.start_of_day(instant);
            assert_eq!(zone.start_of_day(once), once);
        }
    }

    #[test]
    fn start_of_day_is_monotonic_across_dst_switch() {
        let zone: ReferenceZone = "Europe/Berlin".parse().expect("known zone");
        let mut previous = i64::MIN;
        let begin = utc_ms(2024, 3, 29, 0, 0);
        for step in 0..(5 * 24) {
            let instant = begin + step * 60 * 60 * 1000;
            let start = zone.start_of_day(instant);
            assert!(start <= instant);
            assert!(start >= previous);
            previous = start;
        }
    }

    #[test]
    fn local_zone_is_idempotent_and_monotonic() {
        let zone = ReferenceZone::Local;
        let mut previous = i64::MIN;
        let begin = utc_ms(2024, 3, 1, 0, 0);
        // Hourly steps over a year cover both DST switches of the host zone.
        for step in 0..(366 * 24) {
            let instant = begin + step * 60 * 60 * 1000;
            let start = start_of_day(instant, &zone);
            assert!(start <= instant);
            assert!(start >= previous);
            assert_eq!(start_of_day(start, &zone), start);
            assert_eq!(zone.calendar_day(start), zone.calendar_day(instant));
            assert_eq!(end_of_day(instant, &zone), start + END_OF_DAY_OFFSET_MS);
            previous = start;
        }
    }

    #[test]
    fn dst_day_keeps_calendar_identity() {
        let zone: ReferenceZone = "America/New_York".parse().expect("known zone");
        // 2024-03-10 is a 23h day in New York.
        let spring_forward = NaiveDate::from_ymd_opt(2024, 3, 10).expect("valid date");
        let next = NaiveDate::from_ymd_opt(2024, 3, 11).expect("valid date");
        let start = zone.start_of_date(spring_forward);
        let next_start = zone.start_of_date(next);
        assert_eq!(next_start - start, DAY_MS - 60 * 60 * 1000);
        assert_eq!(zone.calendar_day(next_start - 1), spring_forward);
        assert_eq!(zone.calendar_day(next_start), next);
    }

    #[test]
    fn midnight_gap_starts_day_at_first_valid_time() {
        // Santiago skipped 2022-09-11 00:00 -> 01:00.
        let zone: ReferenceZone = "America/Santiago".parse().expect("known zone");
        let date = NaiveDate::from_ymd_opt(2022, 9, 11).expect("valid date");
        let start = zone.start_of_date(date);
        assert_eq!(zone.calendar_day(start), date);
        assert_eq!(zone.calendar_day(start - 1), date.pred_opt().expect("pred"));
    }

    #[test]
    fn parses_local_utc_and_iana_names() {
        assert_eq!("local".parse::<ReferenceZone>(), Ok(ReferenceZone::Local));
        assert_eq!(" utc ".parse::<ReferenceZone>(), Ok(ReferenceZone::Utc));
        assert_eq!(
            "Asia/Tokyo".parse::<ReferenceZone>(),
            Ok(ReferenceZone::Named(chrono_tz::Asia::Tokyo))
        );
        assert!("Mars/Olympus".parse::<ReferenceZone>().is_err());
        assert_eq!(ReferenceZone::Named(chrono_tz::Asia::Tokyo).to_string(), "Asia/Tokyo");
    }

    #[test]
    fn named_zone_shifts_calendar_day() {
        let tokyo = ReferenceZone::Named(chrono_tz::Asia::Tokyo);
        // 20:00 UTC is already the next day in Tokyo (+09:00).
        let instant = utc_ms(2024, 5, 1, 20, 0);
        assert_eq!(
            tokyo.calendar_day(instant),
            NaiveDate::from_ymd_opt(2024, 5, 2).expect("valid date")
        );
        assert_eq!(tokyo.weekday(instant), Weekday::Thu);
        assert_eq!(weekday_name(tokyo.weekday(instant)), "Thursday");
    }

    #[test]
    fn day_window_is_inclusive() {
        let zone = ReferenceZone::Utc;
        let window = zone.day_window(utc_ms(2024, 1, 2, 8, 0));
        assert_eq!(
            window,
            InstantRange {
                start_ms: utc_ms(2024, 1, 2, 0, 0),
                end_ms: utc_ms(2024, 1, 3, 0, 0) - 1,
            }
        );
        assert!(window.contains(window.start_ms));
        assert!(window.contains(window.end_ms));
        assert!(!window.contains(window.end_ms + 1));
    }
}
