use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the static place dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub code: String,
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// A bare coordinate pair, as produced by device geolocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// The location the user is looking at: either a place picked from the
/// index or a synthetic entry built from coordinates (`code` is `None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub code: Option<String>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ResolvedLocation {
    /// Synthetic location named after its coordinates, e.g. `39.904°N, 116.407°E`.
    pub fn from_coordinates(coords: Coordinates) -> Self {
        Self {
            code: None,
            name: format!("{:.3}°N, {:.3}°E", coords.latitude, coords.longitude),
            latitude: coords.latitude,
            longitude: coords.longitude,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

impl From<PlaceRecord> for ResolvedLocation {
    fn from(place: PlaceRecord) -> Self {
        Self {
            code: Some(place.code),
            name: place.name,
            latitude: place.latitude,
            longitude: place.longitude,
        }
    }
}

/// Complete normalized output of one forecast fetch.
///
/// Created fresh per fetch and replaced wholesale by the next one. Within
/// each array horizon every vector has the length of that horizon's `time`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSeries {
    pub current: CurrentWeather,
    pub minutely_15: MinutelyForecast,
    pub hourly: HourlyForecast,
    pub daily: DailyForecast,
    pub location: LocationMeta,
}

impl WeatherSeries {
    /// Presents an instant in the provider's UTC offset for display.
    pub fn local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        let offset =
            FixedOffset::east_opt(self.location.utc_offset_seconds).unwrap_or_else(|| Utc.fix());
        instant.with_timezone(&offset)
    }
}

/// Location metadata as snapped by the provider to its own grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationMeta {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub timezone_abbreviation: String,
    pub utc_offset_seconds: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeather {
    pub time: DateTime<Utc>,
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub apparent_temperature: f64,
    pub is_day: bool,
    pub wind_speed_10m: f64,
    pub wind_direction_10m: f64,
    pub wind_gusts_10m: f64,
    pub rain: f64,
    pub precipitation: f64,
    pub showers: f64,
    pub snowfall: f64,
    pub cloud_cover: f64,
    pub pressure_msl: f64,
    pub surface_pressure: f64,
    pub weather_code: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MinutelyForecast {
    pub time: Vec<DateTime<Utc>>,
    pub precipitation: Vec<f32>,
    pub rain: Vec<f32>,
    pub snowfall: Vec<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HourlyForecast {
    pub time: Vec<DateTime<Utc>>,
    pub temperature_2m: Vec<f32>,
    pub relative_humidity_2m: Vec<f32>,
    pub dew_point_2m: Vec<f32>,
    pub apparent_temperature: Vec<f32>,
    pub precipitation: Vec<f32>,
    pub rain: Vec<f32>,
    pub showers: Vec<f32>,
    pub snowfall: Vec<f32>,
    pub snow_depth: Vec<f32>,
    pub pressure_msl: Vec<f32>,
    pub surface_pressure: Vec<f32>,
    pub cloud_cover: Vec<f32>,
    pub cloud_cover_low: Vec<f32>,
    pub cloud_cover_mid: Vec<f32>,
    pub cloud_cover_high: Vec<f32>,
    pub visibility: Vec<f32>,
    pub wind_speed_10m: Vec<f32>,
    pub wind_direction_10m: Vec<f32>,
    pub wind_gusts_10m: Vec<f32>,
    pub is_day: Vec<bool>,
    pub lightning_potential: Vec<f32>,
    pub sunshine_duration: Vec<f32>,
    pub weather_code: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyForecast {
    pub time: Vec<DateTime<Utc>>,
    pub temperature_2m_max: Vec<f32>,
    pub temperature_2m_min: Vec<f32>,
    pub apparent_temperature_max: Vec<f32>,
    pub apparent_temperature_min: Vec<f32>,
    pub wind_speed_10m_max: Vec<f32>,
    pub wind_gusts_10m_max: Vec<f32>,
    pub wind_direction_10m_dominant: Vec<f32>,
    pub sunrise: Vec<DateTime<Utc>>,
    pub sunset: Vec<DateTime<Utc>>,
    pub daylight_duration: Vec<f32>,
    pub sunshine_duration: Vec<f32>,
    pub rain_sum: Vec<f32>,
    pub showers_sum: Vec<f32>,
    pub snowfall_sum: Vec<f32>,
    pub precipitation_sum: Vec<f32>,
    pub precipitation_hours: Vec<f32>,
    pub precipitation_probability_max: Vec<f32>,
    pub weather_code: Vec<i32>,
}

impl DailyForecast {
    /// Index of today's row. The history window puts `past_days` rows first,
    /// so this is a fixed offset and never depends on the wall clock.
    pub fn today_index(past_days: u32) -> usize {
        past_days as usize
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}
