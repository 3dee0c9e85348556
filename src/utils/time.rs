use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, ParseResult, Utc};

/// Format used for every persisted timestamp, e.g. `2024-01-01_23:59:50`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// This is the standard way of converting a date to a day bucket key in tyme.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> ParseResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map(|v| v.and_utc())
}

/// Returns every calendar day after `start` up to and including `end`. Empty when `end` is not
/// after `start`.
pub fn days_after(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().skip(1).take_while(move |day| *day <= end)
}

/// Builds a phrase like "1 day, 2 hours and 3 seconds". Units equal to zero are left out.
pub fn elapsed_phrase(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let delta = (end - start).max(Duration::zero());

    let units = [
        (delta.num_days(), "day"),
        (delta.num_hours() % 24, "hour"),
        (delta.num_minutes() % 60, "minute"),
        (delta.num_seconds() % 60, "second"),
    ];

    let mut parts = units
        .into_iter()
        .filter(|(amount, _)| *amount > 0)
        .map(|(amount, unit)| {
            if amount == 1 {
                format!("{amount} {unit}")
            } else {
                format!("{amount} {unit}s")
            }
        })
        .collect::<Vec<_>>();

    match parts.len() {
        0 => "0 seconds".into(),
        1 => parts.remove(0),
        _ => {
            let last = parts.pop().unwrap_or_default();
            format!("{} and {last}", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::{date_to_record_name, days_after, elapsed_phrase, format_timestamp, parse_timestamp};

    #[test]
    fn test_timestamp_format() {
        let time = parse_timestamp("2024-01-01_23:59:50").unwrap();
        assert_eq!(format_timestamp(time), "2024-01-01_23:59:50");
        assert_eq!(date_to_record_name(time.date_naive()), "2024-01-01");
        assert!(parse_timestamp("2024-01-01 23:59:50").is_err());
    }

    #[test]
    fn test_days_after_crosses_month_boundary() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        let days = days_after(start, end)
            .map(date_to_record_name)
            .collect::<Vec<_>>();
        assert_eq!(days, vec!["2024-01-31", "2024-02-01", "2024-02-02"]);
    }

    #[test]
    fn test_days_after_same_day_is_empty() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap();
        assert_eq!(days_after(day, day).count(), 0);
    }

    #[test]
    fn test_elapsed_phrase() {
        let start = parse_timestamp("2024-01-01_10:00:00").unwrap();
        assert_eq!(elapsed_phrase(start, start), "0 seconds");
        assert_eq!(elapsed_phrase(start, start + Duration::seconds(1)), "1 second");
        assert_eq!(
            elapsed_phrase(start, start + Duration::hours(1) + Duration::seconds(3)),
            "1 hour and 3 seconds"
        );
        assert_eq!(
            elapsed_phrase(
                start,
                start + Duration::days(2) + Duration::hours(1) + Duration::minutes(5)
            ),
            "2 days, 1 hour and 5 minutes"
        );
    }
}
