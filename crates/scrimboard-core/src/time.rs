//! Timestamp storage format and local-time input parsing.
//!
//! Everything is stored and compared in UTC. Local wall-clock input (slash
//! commands, the web form) is interpreted in the configured display timezone.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone,
    Utc, Weekday,
};
use chrono_tz::Tz;

use crate::error::{Result, ScrimError};

/// Format accepted by `/scrim_add` dates.
pub const SLASH_DATE_FORMAT: &str = "%d/%m/%Y";
/// Format accepted by `/scrim_add` times, e.g. `8:00PM`.
pub const SLASH_TIME_FORMAT: &str = "%I:%M%p";
/// Combined format shown and accepted by the edit modal.
pub const MODAL_DATETIME_FORMAT: &str = "%d/%m/%Y %I:%M%p";
/// Day label used as the availability key, e.g. `Monday 30/12/2025`.
pub const DAY_LABEL_FORMAT: &str = "%A %d/%m/%Y";

/// Canonical storage encoding: RFC 3339, whole seconds, `Z` suffix.
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 with any offset, and naive ISO-8601 which is taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ScrimError::UnknownTimezone(name.to_string()))
}

/// Convert a local wall-clock instant in `tz` to UTC.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant; times that
/// do not exist (DST spring-forward gap) are rejected.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> Result<DateTime<Utc>> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ScrimError::InvalidDateTime {
            input: naive.to_string(),
            expected: format!("a time that exists in {tz}"),
        })
}

/// Parse `/scrim_add` input: `23/12/2025` + `8:00PM`.
pub fn parse_slash_datetime(date: &str, time: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let d = NaiveDate::parse_from_str(date.trim(), SLASH_DATE_FORMAT).map_err(|_| {
        ScrimError::InvalidDateTime {
            input: date.to_string(),
            expected: "DD/MM/YYYY".into(),
        }
    })?;
    let t = NaiveTime::parse_from_str(&normalise_clock(time), SLASH_TIME_FORMAT).map_err(|_| {
        ScrimError::InvalidDateTime {
            input: time.to_string(),
            expected: "HH:MMAM/PM (e.g. 8:00PM)".into(),
        }
    })?;
    local_to_utc(d, t, tz)
}

/// Parse the edit modal's combined `DD/MM/YYYY HH:MMAM/PM` value.
pub fn parse_modal_datetime(value: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let value = value.trim();
    let (date, time) = value
        .split_once(char::is_whitespace)
        .ok_or_else(|| ScrimError::InvalidDateTime {
            input: value.to_string(),
            expected: "DD/MM/YYYY HH:MMAM/PM".into(),
        })?;
    parse_slash_datetime(date, time, tz)
}

/// Render a UTC instant the way the edit modal expects it back.
pub fn format_modal_datetime(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format(MODAL_DATETIME_FORMAT).to_string()
}

/// Parse web form input: `2025-12-23` + `20:00`.
pub fn parse_form_datetime(date: &str, time: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let d = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
        ScrimError::InvalidDateTime {
            input: date.to_string(),
            expected: "YYYY-MM-DD".into(),
        }
    })?;
    let t = NaiveTime::parse_from_str(time.trim(), "%H:%M").map_err(|_| {
        ScrimError::InvalidDateTime {
            input: time.to_string(),
            expected: "HH:MM".into(),
        }
    })?;
    local_to_utc(d, t, tz)
}

pub fn day_label(date: NaiveDate) -> String {
    date.format(DAY_LABEL_FORMAT).to_string()
}

/// Day label for `weekday` in the week containing `today`, shifted by
/// `week_offset` weeks. Weeks start on Monday.
pub fn week_day_label(today: NaiveDate, weekday: &str, week_offset: i64) -> Result<String> {
    let target: Weekday = weekday
        .trim()
        .parse()
        .map_err(|_| ScrimError::UnknownWeekday(weekday.to_string()))?;
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64)
        + Duration::weeks(week_offset);
    let day = monday + Duration::days(target.num_days_from_monday() as i64);
    Ok(day_label(day))
}

/// `8:00 pm` → `8:00PM`; chrono's `%p` wants the marker glued on.
fn normalise_clock(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn melbourne() -> Tz {
        parse_timezone("Australia/Melbourne").unwrap()
    }

    #[test]
    fn storage_format_roundtrips() {
        let dt = Utc.with_ymd_and_hms(2025, 12, 23, 9, 0, 0).unwrap();
        let s = format_timestamp(dt);
        assert_eq!(s, "2025-12-23T09:00:00Z");
        assert_eq!(parse_timestamp(&s), Some(dt));
    }

    #[test]
    fn parses_offset_and_naive_timestamps() {
        let expected = Utc.with_ymd_and_hms(2025, 12, 23, 9, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-12-23T09:00:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-12-23T20:00:00+11:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-12-23T09:00:00"), Some(expected));
        assert_eq!(parse_timestamp("next tuesday"), None);
    }

    #[test]
    fn slash_input_is_local_time() {
        // Melbourne is UTC+11 in December.
        let dt = parse_slash_datetime("23/12/2025", "8:00PM", melbourne()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 12, 23, 9, 0, 0).unwrap());
        let spaced = parse_slash_datetime("23/12/2025", "8:00 pm", melbourne()).unwrap();
        assert_eq!(spaced, dt);
    }

    #[test]
    fn slash_input_rejects_garbage() {
        let err = parse_slash_datetime("2025-12-23", "8:00PM", melbourne()).unwrap_err();
        assert_eq!(err.code(), "INVALID_DATETIME");
        assert!(parse_slash_datetime("23/12/2025", "20h", melbourne()).is_err());
    }

    #[test]
    fn modal_format_roundtrips() {
        let dt = Utc.with_ymd_and_hms(2025, 12, 23, 9, 0, 0).unwrap();
        let shown = format_modal_datetime(dt, melbourne());
        assert_eq!(shown, "23/12/2025 08:00PM");
        assert_eq!(parse_modal_datetime(&shown, melbourne()).unwrap(), dt);
    }

    #[test]
    fn form_input_is_local_time() {
        let dt = parse_form_datetime("2025-06-10", "19:30", melbourne()).unwrap();
        // UTC+10 in June.
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 6, 10, 9, 30, 0).unwrap());
    }

    #[test]
    fn week_day_label_uses_monday_start() {
        // Wednesday 31/12/2025.
        let today = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(
            week_day_label(today, "Monday", 0).unwrap(),
            "Monday 29/12/2025"
        );
        assert_eq!(
            week_day_label(today, "Sunday", 1).unwrap(),
            "Sunday 11/01/2026"
        );
        assert!(week_day_label(today, "Funday", 0).is_err());
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
