//! Plain-text rendering of a normalized forecast.

use std::fmt::{self, Write};

use weather_core::display::{
    day_label, format_date, format_duration, format_one_decimal, format_time, wind_direction_label,
};
use weather_core::weather_code::{describe, icon};
use weather_core::{ResolvedLocation, WeatherSeries};

pub fn forecast(
    location: &ResolvedLocation,
    series: &WeatherSeries,
    past_days: u32,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    current(&mut out, location, series)?;
    out.push('\n');
    daily(&mut out, series, past_days)?;
    Ok(out)
}

fn current(out: &mut impl Write, location: &ResolvedLocation, series: &WeatherSeries) -> fmt::Result {
    let now = &series.current;
    writeln!(
        out,
        "{}  ({}, {})",
        location.name, series.location.timezone, series.location.timezone_abbreviation
    )?;
    writeln!(
        out,
        "{} {}  {}°C  体感 {}°C",
        icon(now.weather_code, now.is_day).glyph(),
        describe(now.weather_code),
        format_one_decimal(now.temperature_2m),
        format_one_decimal(now.apparent_temperature),
    )?;
    writeln!(
        out,
        "湿度 {}%  {}风 {} km/h  阵风 {} km/h",
        format_one_decimal(now.relative_humidity_2m),
        wind_direction_label(now.wind_direction_10m),
        format_one_decimal(now.wind_speed_10m),
        format_one_decimal(now.wind_gusts_10m),
    )?;
    writeln!(
        out,
        "降水 {} mm  云量 {}%  气压 {} hPa",
        format_one_decimal(now.precipitation),
        format_one_decimal(now.cloud_cover),
        format_one_decimal(now.pressure_msl),
    )?;
    writeln!(out, "更新于 {}", format_time(series.local(now.time)))
}

fn daily(out: &mut impl Write, series: &WeatherSeries, past_days: u32) -> fmt::Result {
    let days = &series.daily;
    for i in 0..days.len() {
        let date = format_date(series.local(days.time[i]));
        let label = day_label(i, past_days).unwrap_or("");
        let code = days.weather_code[i];
        writeln!(
            out,
            "{label:<2} {date}  {} {}  {}° / {}°  降水 {} mm  日照 {}  日出 {} 日落 {}",
            icon(code, true).glyph(),
            describe(code),
            format_one_decimal(days.temperature_2m_min[i] as f64),
            format_one_decimal(days.temperature_2m_max[i] as f64),
            format_one_decimal(days.precipitation_sum[i] as f64),
            format_duration(days.sunshine_duration[i] as f64 / 60.0),
            format_time(series.local(days.sunrise[i])),
            format_time(series.local(days.sunset[i])),
        )?;
    }
    Ok(())
}
