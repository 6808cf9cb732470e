//! 时间处理模块
//!
//! 后端时间戳为 ISO-8601 字符串，可能带偏移也可能不带；
//! 不带偏移的一律按 UTC 解释。日期筛选与"今日"统计都使用 UTC 日历日期。

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// 解析后端时间戳，无法解析时返回 `None`
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// 时间戳对应的 UTC 日历日期
pub fn calendar_date(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|dt| dt.date_naive())
}

/// 解析 `<input type="date">` 的取值；空串视为未设置
pub fn parse_date_input(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[inline]
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// 列表中的日期展示，如 `Jan 5, 2024`；缺失或无法解析时为 `-`
pub fn display_date(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn display_time(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// 日期 + 时间，如 `Jan 5, 2024 14:03`
pub fn display_datetime(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.format("%b %-d, %Y %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// CSV 中的时间列；无法解析时原样输出
pub fn csv_timestamp(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => parse_timestamp(raw)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| raw.to_string()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naive_timestamps_are_utc() {
        let with_offset = parse_timestamp("2024-03-10T23:30:00+00:00").unwrap();
        let naive = parse_timestamp("2024-03-10T23:30:00.123456").unwrap();
        assert_eq!(with_offset.date_naive(), naive.date_naive());
        assert_eq!(
            calendar_date("2024-03-10T23:30:00"),
            NaiveDate::from_ymd_opt(2024, 3, 10)
        );
    }

    #[test]
    fn offsets_shift_the_calendar_date() {
        // 01:30 at +02:00 is still the previous day in UTC
        assert_eq!(
            calendar_date("2024-03-11T01:30:00+02:00"),
            NaiveDate::from_ymd_opt(2024, 3, 10)
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_date_input("  "), None);
        assert_eq!(parse_date_input("2024-13-01"), None);
    }

    #[test]
    fn display_helpers() {
        assert_eq!(display_date(Some("2024-01-05T08:00:00")), "Jan 5, 2024");
        assert_eq!(display_date(None), "-");
        assert_eq!(display_time(Some("2024-01-05T08:07:00Z")), "08:07");
        assert_eq!(csv_timestamp(Some("2024-01-05T08:07:09")), "2024-01-05 08:07:09");
        assert_eq!(csv_timestamp(Some("n/a")), "n/a");
        assert_eq!(csv_timestamp(None), "");
    }
}
