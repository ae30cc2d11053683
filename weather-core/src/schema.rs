//! Ordered variable schema shared by the request builder and the decoder.
//!
//! Each horizon lists its variables in wire order. The default request asks
//! for exactly these lists, and the decoder finds a variable's slot by its
//! position in the list that was actually requested, so the two can never
//! drift apart.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named time-resolution bucket of the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    Current,
    Minutely15,
    Hourly,
    Daily,
}

impl Horizon {
    pub const ALL: [Horizon; 4] = [
        Horizon::Current,
        Horizon::Minutely15,
        Horizon::Hourly,
        Horizon::Daily,
    ];

    /// Query parameter and response key used by the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Horizon::Current => "current",
            Horizon::Minutely15 => "minutely_15",
            Horizon::Hourly => "hourly",
            Horizon::Daily => "daily",
        }
    }

    /// Nominal step in seconds. `None` for the single-instant current block.
    pub fn nominal_interval(&self) -> Option<i64> {
        match self {
            Horizon::Current => None,
            Horizon::Minutely15 => Some(15 * 60),
            Horizon::Hourly => Some(60 * 60),
            Horizon::Daily => Some(24 * 60 * 60),
        }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Horizon::Current => CURRENT,
            Horizon::Minutely15 => MINUTELY_15,
            Horizon::Hourly => HOURLY,
            Horizon::Daily => DAILY,
        }
    }

    /// Wire names in default request order.
    pub fn default_variables(&self) -> Vec<String> {
        self.fields().iter().map(|f| f.name.to_string()).collect()
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a variable is encoded on the wire and normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Continuous measurement, rounded to one decimal.
    Measurement,
    /// Categorical weather code, rounded to an integer.
    Code,
    /// `1` for day, anything else for night.
    Flag,
    /// Epoch seconds delivered as an int64 column.
    Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub horizon: Horizon,
    pub kind: FieldKind,
}

const fn measure(horizon: Horizon, name: &'static str) -> FieldSpec {
    FieldSpec { name, horizon, kind: FieldKind::Measurement }
}

const fn field(horizon: Horizon, name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, horizon, kind }
}

use FieldKind::{Code, Flag, Instant};
use Horizon::{Current as C, Daily as D, Hourly as H, Minutely15 as M};

pub const CURRENT: &[FieldSpec] = &[
    measure(C, "temperature_2m"),
    measure(C, "relative_humidity_2m"),
    measure(C, "apparent_temperature"),
    field(C, "is_day", Flag),
    measure(C, "wind_speed_10m"),
    measure(C, "wind_direction_10m"),
    measure(C, "wind_gusts_10m"),
    measure(C, "rain"),
    measure(C, "precipitation"),
    measure(C, "showers"),
    measure(C, "snowfall"),
    measure(C, "cloud_cover"),
    measure(C, "pressure_msl"),
    measure(C, "surface_pressure"),
    field(C, "weather_code", Code),
];

pub const MINUTELY_15: &[FieldSpec] = &[
    measure(M, "precipitation"),
    measure(M, "rain"),
    measure(M, "snowfall"),
];

pub const HOURLY: &[FieldSpec] = &[
    measure(H, "temperature_2m"),
    measure(H, "relative_humidity_2m"),
    measure(H, "dew_point_2m"),
    measure(H, "apparent_temperature"),
    measure(H, "precipitation"),
    measure(H, "rain"),
    measure(H, "showers"),
    measure(H, "snowfall"),
    measure(H, "snow_depth"),
    measure(H, "pressure_msl"),
    measure(H, "surface_pressure"),
    measure(H, "cloud_cover"),
    measure(H, "cloud_cover_low"),
    measure(H, "cloud_cover_mid"),
    measure(H, "cloud_cover_high"),
    measure(H, "visibility"),
    measure(H, "wind_speed_10m"),
    measure(H, "wind_direction_10m"),
    measure(H, "wind_gusts_10m"),
    field(H, "is_day", Flag),
    measure(H, "lightning_potential"),
    measure(H, "sunshine_duration"),
    field(H, "weather_code", Code),
];

pub const DAILY: &[FieldSpec] = &[
    measure(D, "temperature_2m_max"),
    measure(D, "temperature_2m_min"),
    measure(D, "apparent_temperature_max"),
    measure(D, "apparent_temperature_min"),
    measure(D, "wind_speed_10m_max"),
    measure(D, "wind_gusts_10m_max"),
    measure(D, "wind_direction_10m_dominant"),
    field(D, "sunrise", Instant),
    field(D, "sunset", Instant),
    measure(D, "daylight_duration"),
    measure(D, "sunshine_duration"),
    measure(D, "rain_sum"),
    measure(D, "showers_sum"),
    measure(D, "snowfall_sum"),
    measure(D, "precipitation_sum"),
    measure(D, "precipitation_hours"),
    measure(D, "precipitation_probability_max"),
    field(D, "weather_code", Code),
];

/// Wire kind of `name` within `horizon`; unknown variables are measurements.
pub fn kind_of(horizon: Horizon, name: &str) -> FieldKind {
    horizon.field(name).map_or(FieldKind::Measurement, |f| f.kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_field_is_tagged_with_its_own_horizon() {
        for horizon in Horizon::ALL {
            for spec in horizon.fields() {
                assert_eq!(spec.horizon, horizon, "{} in {}", spec.name, horizon);
            }
        }
    }

    #[test]
    fn field_names_are_unique_per_horizon() {
        for horizon in Horizon::ALL {
            let names: HashSet<_> = horizon.fields().iter().map(|f| f.name).collect();
            assert_eq!(names.len(), horizon.fields().len());
        }
    }

    #[test]
    fn sunrise_and_sunset_are_int64_instants() {
        assert_eq!(kind_of(Horizon::Daily, "sunrise"), FieldKind::Instant);
        assert_eq!(kind_of(Horizon::Daily, "sunset"), FieldKind::Instant);
        assert_eq!(kind_of(Horizon::Daily, "rain_sum"), FieldKind::Measurement);
        assert_eq!(kind_of(Horizon::Hourly, "not_a_variable"), FieldKind::Measurement);
    }

    #[test]
    fn default_order_keeps_original_positions() {
        let daily = Horizon::Daily.default_variables();
        assert_eq!(daily[7], "sunrise");
        assert_eq!(daily[8], "sunset");
        let hourly = Horizon::Hourly.default_variables();
        assert_eq!(hourly[19], "is_day");
        assert_eq!(hourly.last().map(String::as_str), Some("weather_code"));
    }
}
