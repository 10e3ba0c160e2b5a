use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use chrono_tz::Tz;
use serde_json::Value;

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parses one raw timestamp value into local wall-clock time.
///
/// Strings are tried as EXIF (`2023:12:25 14:30:00`) first and ISO-8601 second.
/// Integers are Unix epoch seconds and are converted into `timezone`.
pub fn parse_timestamp(value: &Value, timezone: Tz) -> Option<NaiveDateTime> {
    match value {
        Value::String(text) => parse_text(text.trim()),
        Value::Number(number) => {
            let utc = DateTime::from_timestamp(number.as_i64()?, 0)?;
            Some(utc.with_timezone(&timezone).naive_local())
        }
        _ => None,
    }
}

fn parse_text(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    parse_exif(text).or_else(|| parse_iso(text))
}

/// Parses the colon-separated EXIF form. Year, month and day must be integers; hour,
/// minute and second default to zero when missing or unreadable.
///
/// Out-of-range time fields roll over into the following minutes, hours or days, so
/// `24:00:00` is midnight of the next day. Second `60` is read as a leap second.
pub fn parse_exif(text: &str) -> Option<NaiveDateTime> {
    let (date_part, time_part) = text.split_once(' ').unwrap_or((text, ""));

    let mut date_fields = date_part.split(':');
    let (Some(year), Some(month), Some(day), None) = (
        date_fields.next(),
        date_fields.next(),
        date_fields.next(),
        date_fields.next(),
    ) else {
        return None;
    };
    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)?;

    let mut time_fields = time_part.trim().split(':');
    let hour = time_component(time_fields.next());
    let minute = time_component(time_fields.next());
    let (second, nano) = seconds_component(time_fields.next());
    Some(combine(date, hour, minute, second, nano))
}

fn combine(date: NaiveDate, hour: u32, minute: u32, second: u32, nano: u32) -> NaiveDateTime {
    let exact = match second {
        60 => NaiveTime::from_hms_nano_opt(hour, minute, 59, 1_000_000_000 + nano),
        _ => NaiveTime::from_hms_nano_opt(hour, minute, second, nano),
    };
    if let Some(time) = exact {
        return date.and_time(time);
    }

    let midnight = date.and_time(NaiveTime::MIN);
    let offset = i64::from(hour) * 3600 + i64::from(minute) * 60 + i64::from(second);
    TimeDelta::try_seconds(offset)
        .map(|delta| delta + TimeDelta::nanoseconds(i64::from(nano)))
        .and_then(|delta| midnight.checked_add_signed(delta))
        .unwrap_or(midnight)
}

fn time_component(field: Option<&str>) -> u32 {
    field.and_then(|f| f.trim().parse().ok()).unwrap_or(0)
}

fn seconds_component(field: Option<&str>) -> (u32, u32) {
    let Some(field) = field else {
        return (0, 0);
    };
    let (whole, fraction) = field.trim().split_once('.').unwrap_or((field.trim(), ""));
    let seconds = whole.parse().unwrap_or(0);
    if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return (seconds, 0);
    }
    let digits: String = fraction.chars().chain(std::iter::repeat('0')).take(9).collect();
    (seconds, digits.parse().unwrap_or(0))
}

fn parse_iso(text: &str) -> Option<NaiveDateTime> {
    // Offset timestamps keep the wall time of their own offset.
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
        return Some(with_offset.naive_local());
    }
    if let Ok(with_offset) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(with_offset.naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}
