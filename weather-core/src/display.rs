//! Display helpers for normalized forecasts (zh-CN).

use chrono::{DateTime, Datelike, FixedOffset, Weekday};

const DIRECTIONS: [&str; 16] = [
    "北", "东北偏北", "东北", "东北偏东", "东", "东南偏东", "东南", "东南偏南",
    "南", "西南偏南", "西南", "西南偏西", "西", "西北偏西", "西北", "西北偏北",
];

/// 16-point compass label for a wind direction in degrees.
pub fn wind_direction_label(degrees: f64) -> &'static str {
    let sector = (degrees / 22.5).round() as i64;
    DIRECTIONS[sector.rem_euclid(16) as usize]
}

/// Formats a duration in minutes, e.g. `2小时15分钟`.
pub fn format_duration(minutes: f64) -> String {
    let total = minutes.round().max(0.0) as u64;
    let (hours, mins) = (total / 60, total % 60);
    match (hours, mins) {
        (0, m) => format!("{m}分钟"),
        (h, 0) => format!("{h}小时"),
        (h, m) => format!("{h}小时{m}分钟"),
    }
}

/// Label for a daily row: the first `past_days` rows are history, so
/// `past_days - 1` is yesterday and `past_days` is today.
pub fn day_label(index: usize, past_days: u32) -> Option<&'static str> {
    let today = past_days as usize;
    if index == today {
        Some("今天")
    } else if today > 0 && index == today - 1 {
        Some("昨天")
    } else {
        None
    }
}

fn weekday_short(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "周一",
        Weekday::Tue => "周二",
        Weekday::Wed => "周三",
        Weekday::Thu => "周四",
        Weekday::Fri => "周五",
        Weekday::Sat => "周六",
        Weekday::Sun => "周日",
    }
}

/// `10月17日周六`
pub fn format_date(date: DateTime<FixedOffset>) -> String {
    format!(
        "{}月{}日{}",
        date.month(),
        date.day(),
        weekday_short(date.weekday())
    )
}

/// `08:30`
pub fn format_time(time: DateTime<FixedOffset>) -> String {
    time.format("%H:%M").to_string()
}

pub fn format_one_decimal(value: f64) -> String {
    format!("{value:.1}")
}
