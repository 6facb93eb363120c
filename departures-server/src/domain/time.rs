//! Departure time handling.
//!
//! Upstream boards give departure times as bare "HH:MM" strings in local
//! time. This module turns those into timezone-aware instants relative to a
//! reference "now", resolving departures that fall after midnight.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, NaiveTime, TimeZone};

/// Error returned when a departure time cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A candidate more than this far behind the reference is taken to be
/// tomorrow's early-morning departure.
const ROLLOVER_THRESHOLD_HOURS: i64 = 12;

/// Parse a strict, zero-padded 24-hour "HH:MM" time of day.
///
/// # Examples
///
/// ```
/// use departures_server::domain::parse_hhmm;
///
/// assert!(parse_hhmm("00:00").is_ok());
/// assert!(parse_hhmm("23:59").is_ok());
///
/// assert!(parse_hhmm("9:30").is_err());
/// assert!(parse_hhmm("24:00").is_err());
/// assert!(parse_hhmm("12:00:00").is_err());
/// ```
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, TimeError> {
    // Must be exactly 5 characters: HH:MM
    if s.len() != 5 {
        return Err(TimeError::new("expected HH:MM format"));
    }

    let bytes = s.as_bytes();

    if bytes[2] != b':' {
        return Err(TimeError::new("expected colon at position 2"));
    }

    let hour =
        parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }

    let minute =
        parse_two_digits(&bytes[3..5]).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| TimeError::new("invalid time"))
}

/// Resolve a "HH:MM" departure time against a reference instant.
///
/// The wall-clock time is placed on the reference's calendar date, in the
/// reference's timezone. If that lands more than 12 hours before the
/// reference, the departure is moved 24 hours forward: "00:10" seen at
/// 23:50 is tomorrow's 00:10. A smaller gap is left alone, so a departure
/// that has already left today yields a negative lead time.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Timelike};
/// use chrono_tz::Europe::London;
/// use departures_server::domain::resolve_departure;
///
/// let now = London.with_ymd_and_hms(2023, 10, 27, 23, 50, 0).unwrap();
/// let dep = resolve_departure("00:10", &now).unwrap();
/// assert_eq!((dep - now).num_minutes(), 20);
///
/// let now = London.with_ymd_and_hms(2023, 10, 27, 11, 45, 0).unwrap();
/// let dep = resolve_departure("11:30", &now).unwrap();
/// assert_eq!((dep - now).num_minutes(), -15);
/// ```
pub fn resolve_departure<Tz: TimeZone>(
    time_str: &str,
    reference: &DateTime<Tz>,
) -> Result<DateTime<Tz>, TimeError> {
    let time = parse_hhmm(time_str)?;
    let naive = reference.date_naive().and_time(time);
    let candidate = localize(&reference.timezone(), naive)?;

    let behind = reference.clone().signed_duration_since(candidate.clone());
    if behind > Duration::hours(ROLLOVER_THRESHOLD_HOURS) {
        return candidate
            .checked_add_signed(Duration::hours(24))
            .ok_or_else(|| TimeError::new("date overflow"));
    }

    Ok(candidate)
}

/// Time from `now` until `departure`. Negative when the departure has gone.
pub fn lead_time<Tz: TimeZone>(departure: &DateTime<Tz>, now: &DateTime<Tz>) -> Duration {
    departure.clone().signed_duration_since(now.clone())
}

/// Attach a timezone to a local wall-clock time.
///
/// During the autumn change the repeated hour resolves to the later
/// (standard time) instant. A time inside the spring gap is read as if the
/// clocks had not yet gone forward, landing one hour later on the wall.
fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Result<DateTime<Tz>, TimeError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(_, later) => Ok(later),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .ok_or_else(|| TimeError::new("local time does not exist")),
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
