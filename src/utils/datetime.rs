use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};

/// Storage format for every `created_at` column: naive UTC, second precision.
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn now_iso() -> String {
    to_iso(&Utc::now().naive_utc())
}

pub fn to_iso(dt: &NaiveDateTime) -> String {
    dt.format(ISO_FORMAT).to_string()
}

pub fn parse_iso(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, ISO_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

fn offset(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix())
}

/// Local calendar date for `now` at the given UTC offset.
pub fn local_date(now: DateTime<Utc>, offset_hours: i32) -> NaiveDate {
    now.with_timezone(&offset(offset_hours)).date_naive()
}

/// Start of the reporting window covering today and the `days_back` days before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateWindow {
    pub start_date: NaiveDate,
    pub today: NaiveDate,
    /// UTC instant of local midnight on `start_date`, in storage format.
    pub start_iso: String,
}

/// `None` when the window reaches past the representable calendar.
pub fn update_window(now: DateTime<Utc>, days_back: u32, offset_hours: i32) -> Option<UpdateWindow> {
    let today = local_date(now, offset_hours);
    let start_date = today.checked_sub_signed(Duration::days(i64::from(days_back)))?;
    let start_utc = start_date
        .and_hms_opt(0, 0, 0)?
        .checked_sub_signed(Duration::hours(i64::from(offset_hours)))?;
    Some(UpdateWindow {
        start_date,
        today,
        start_iso: to_iso(&start_utc),
    })
}

/// `YYYY-MM` of the local date.
pub fn current_month(now: DateTime<Utc>, offset_hours: i32) -> String {
    local_date(now, offset_hours).format("%Y-%m").to_string()
}

/// UTC bounds `[start, end)` of a local calendar month given as `YYYY-MM`.
pub fn month_window(month: &str, offset_hours: i32) -> Option<(String, String)> {
    let (year, mon) = month.split_once('-')?;
    if year.len() != 4 || mon.len() != 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let mon: u32 = mon.parse().ok()?;
    let first = NaiveDate::from_ymd_opt(year, mon, 1)?;
    let next = if mon == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, mon + 1, 1)?
    };
    let shift = Duration::hours(i64::from(offset_hours));
    let start = first.and_hms_opt(0, 0, 0)? - shift;
    let end = next.and_hms_opt(0, 0, 0)? - shift;
    Some((to_iso(&start), to_iso(&end)))
}

/// Converts a stored UTC timestamp to local time.
pub fn to_local(stored: &NaiveDateTime, offset_hours: i32) -> NaiveDateTime {
    *stored + Duration::hours(i64::from(offset_hours))
}

pub fn format_local(stored: &NaiveDateTime, offset_hours: i32) -> String {
    to_local(stored, offset_hours)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Whole local calendar days between a stored timestamp and `now`.
pub fn days_ago(stored: &NaiveDateTime, now: DateTime<Utc>, offset_hours: i32) -> i64 {
    let then = to_local(stored, offset_hours).date();
    (local_date(now, offset_hours) - then).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::<Utc>::from_naive_utc_and_offset(parse_iso(s).unwrap_or_default(), Utc)
    }

    #[test]
    fn test_iso_roundtrip() {
        let parsed = parse_iso("2024-03-05T10:11:12").unwrap();
        assert_eq!(to_iso(&parsed), "2024-03-05T10:11:12");
    }

    #[test]
    fn test_local_date_crosses_midnight() {
        // 18:00 UTC is already the next day at UTC+7
        let now = at("2024-03-05T18:00:00");
        assert_eq!(local_date(now, 7).to_string(), "2024-03-06");
        assert_eq!(local_date(now, 0).to_string(), "2024-03-05");
    }

    #[test]
    fn test_update_window_today() {
        let now = at("2024-03-05T18:00:00");
        let window = update_window(now, 0, 7).unwrap();
        assert_eq!(window.today.to_string(), "2024-03-06");
        assert_eq!(window.start_date, window.today);
        assert_eq!(window.start_iso, "2024-03-05T17:00:00");
    }

    #[test]
    fn test_update_window_days_back() {
        let now = at("2024-03-05T01:00:00");
        let window = update_window(now, 2, 7).unwrap();
        assert_eq!(window.start_date.to_string(), "2024-03-03");
        assert_eq!(window.start_iso, "2024-03-02T17:00:00");
    }

    #[test]
    fn test_update_window_out_of_range() {
        let now = at("2024-03-05T01:00:00");
        assert!(update_window(now, u32::MAX, 7).is_none());
    }

    #[test]
    fn test_month_window() {
        let (start, end) = month_window("2024-12", 7).unwrap();
        assert_eq!(start, "2024-11-30T17:00:00");
        assert_eq!(end, "2024-12-31T17:00:00");
        assert!(month_window("2024-13", 7).is_none());
        assert!(month_window("24-01", 7).is_none());
    }

    #[test]
    fn test_days_ago() {
        let stored = parse_iso("2024-03-01T20:00:00").unwrap(); // 03:00 on the 2nd locally
        let now = at("2024-03-05T01:00:00");
        assert_eq!(days_ago(&stored, now, 7), 3);
    }
}
