//! Reshapes a raw columnar forecast into a [`WeatherSeries`].
//!
//! Every measurement is rounded to one decimal, weather codes to integers.
//! A requested horizon whose block is missing fails the whole fetch, while a
//! missing variable inside a present block degrades to zeros.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::model::{
    CurrentWeather, DailyForecast, HourlyForecast, LocationMeta, MinutelyForecast, WeatherSeries,
};
use crate::provider::{Column, ForecastOverrides, ForecastProvider, ForecastRequest, RawBlock, RawForecast};
use crate::schema::{FieldKind, Horizon};

const FALLBACK_TIMEZONE: &str = "Asia/Shanghai";
const FALLBACK_TIMEZONE_ABBREVIATION: &str = "CST";

/// Rounds half up to one decimal place.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Rounds half up to the nearest integer. NaN becomes 0.
pub fn round_code(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Fetches forecasts through a provider and normalizes them.
#[derive(Debug, Clone)]
pub struct ForecastNormalizer<P> {
    provider: P,
    overrides: ForecastOverrides,
}

impl<P: ForecastProvider> ForecastNormalizer<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            overrides: ForecastOverrides::default(),
        }
    }

    /// Overrides applied to every request made by this normalizer.
    pub fn with_overrides(mut self, overrides: ForecastOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Builds the request these coordinates would be fetched with.
    pub fn request_for(
        &self,
        latitude: f64,
        longitude: f64,
        overrides: Option<&ForecastOverrides>,
    ) -> ForecastRequest {
        let request = ForecastRequest::new(latitude, longitude).with_overrides(&self.overrides);
        match overrides {
            Some(extra) => request.with_overrides(extra),
            None => request,
        }
    }

    pub async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        overrides: Option<&ForecastOverrides>,
    ) -> Result<WeatherSeries, FetchError> {
        let request = self.request_for(latitude, longitude, overrides);
        let raw = self.provider.fetch_raw(&request).await.inspect_err(|e| {
            warn!("Forecast fetch failed: {e}");
        })?;
        normalize(&raw, &request).inspect_err(|e| {
            warn!("Forecast response rejected: {e}");
        })
    }
}

/// Turns a raw response into a series, using `request` to locate each
/// variable's slot.
pub fn normalize(raw: &RawForecast, request: &ForecastRequest) -> Result<WeatherSeries, FetchError> {
    let current = normalize_current(&Reader::required(raw, request, Horizon::Current)?)?;

    let minutely = Reader::required(raw, request, Horizon::Minutely15)?;
    let minutely_15 = MinutelyForecast {
        time: minutely.times()?,
        precipitation: minutely.measurements("precipitation")?,
        rain: minutely.measurements("rain")?,
        snowfall: minutely.measurements("snowfall")?,
    };

    let hourly = normalize_hourly(&Reader::required(raw, request, Horizon::Hourly)?)?;
    let daily = normalize_daily(&Reader::required(raw, request, Horizon::Daily)?)?;

    debug!(
        hourly = hourly.time.len(),
        daily = daily.time.len(),
        "Normalized forecast"
    );

    Ok(WeatherSeries {
        current,
        minutely_15,
        hourly,
        daily,
        location: LocationMeta {
            latitude: raw.latitude,
            longitude: raw.longitude,
            timezone: raw
                .timezone
                .clone()
                .unwrap_or_else(|| FALLBACK_TIMEZONE.to_string()),
            timezone_abbreviation: raw
                .timezone_abbreviation
                .clone()
                .unwrap_or_else(|| FALLBACK_TIMEZONE_ABBREVIATION.to_string()),
            utc_offset_seconds: raw.utc_offset_seconds,
        },
    })
}

fn normalize_current(r: &Reader<'_>) -> Result<CurrentWeather, FetchError> {
    Ok(CurrentWeather {
        time: r.start()?,
        temperature_2m: r.scalar("temperature_2m")?,
        relative_humidity_2m: r.scalar("relative_humidity_2m")?,
        apparent_temperature: r.scalar("apparent_temperature")?,
        is_day: r.scalar_raw("is_day")?.is_some_and(|v| round_code(v) == 1),
        wind_speed_10m: r.scalar("wind_speed_10m")?,
        wind_direction_10m: r.scalar("wind_direction_10m")?,
        wind_gusts_10m: r.scalar("wind_gusts_10m")?,
        rain: r.scalar("rain")?,
        precipitation: r.scalar("precipitation")?,
        showers: r.scalar("showers")?,
        snowfall: r.scalar("snowfall")?,
        cloud_cover: r.scalar("cloud_cover")?,
        pressure_msl: r.scalar("pressure_msl")?,
        surface_pressure: r.scalar("surface_pressure")?,
        weather_code: r.scalar_raw("weather_code")?.map_or(0, round_code),
    })
}

fn normalize_hourly(r: &Reader<'_>) -> Result<HourlyForecast, FetchError> {
    Ok(HourlyForecast {
        time: r.times()?,
        temperature_2m: r.measurements("temperature_2m")?,
        relative_humidity_2m: r.measurements("relative_humidity_2m")?,
        dew_point_2m: r.measurements("dew_point_2m")?,
        apparent_temperature: r.measurements("apparent_temperature")?,
        precipitation: r.measurements("precipitation")?,
        rain: r.measurements("rain")?,
        showers: r.measurements("showers")?,
        snowfall: r.measurements("snowfall")?,
        snow_depth: r.measurements("snow_depth")?,
        pressure_msl: r.measurements("pressure_msl")?,
        surface_pressure: r.measurements("surface_pressure")?,
        cloud_cover: r.measurements("cloud_cover")?,
        cloud_cover_low: r.measurements("cloud_cover_low")?,
        cloud_cover_mid: r.measurements("cloud_cover_mid")?,
        cloud_cover_high: r.measurements("cloud_cover_high")?,
        visibility: r.measurements("visibility")?,
        wind_speed_10m: r.measurements("wind_speed_10m")?,
        wind_direction_10m: r.measurements("wind_direction_10m")?,
        wind_gusts_10m: r.measurements("wind_gusts_10m")?,
        is_day: r.flags("is_day")?,
        lightning_potential: r.measurements("lightning_potential")?,
        sunshine_duration: r.measurements("sunshine_duration")?,
        weather_code: r.codes("weather_code")?,
    })
}

fn normalize_daily(r: &Reader<'_>) -> Result<DailyForecast, FetchError> {
    Ok(DailyForecast {
        time: r.times()?,
        temperature_2m_max: r.measurements("temperature_2m_max")?,
        temperature_2m_min: r.measurements("temperature_2m_min")?,
        apparent_temperature_max: r.measurements("apparent_temperature_max")?,
        apparent_temperature_min: r.measurements("apparent_temperature_min")?,
        wind_speed_10m_max: r.measurements("wind_speed_10m_max")?,
        wind_gusts_10m_max: r.measurements("wind_gusts_10m_max")?,
        wind_direction_10m_dominant: r.measurements("wind_direction_10m_dominant")?,
        sunrise: r.instants("sunrise")?,
        sunset: r.instants("sunset")?,
        daylight_duration: r.measurements("daylight_duration")?,
        sunshine_duration: r.measurements("sunshine_duration")?,
        rain_sum: r.measurements("rain_sum")?,
        showers_sum: r.measurements("showers_sum")?,
        snowfall_sum: r.measurements("snowfall_sum")?,
        precipitation_sum: r.measurements("precipitation_sum")?,
        precipitation_hours: r.measurements("precipitation_hours")?,
        precipitation_probability_max: r.measurements("precipitation_probability_max")?,
        weather_code: r.codes("weather_code")?,
    })
}

/// Resolves named variables of one horizon to their wire slots.
///
/// `block` is `None` only for a horizon nobody asked for; such a horizon
/// reads as empty.
struct Reader<'a> {
    horizon: Horizon,
    block: Option<&'a RawBlock>,
    request: &'a ForecastRequest,
    len: usize,
}

impl<'a> Reader<'a> {
    fn required(
        raw: &'a RawForecast,
        request: &'a ForecastRequest,
        horizon: Horizon,
    ) -> Result<Self, FetchError> {
        let block = raw.block(horizon);
        if block.is_none() && !request.variables(horizon).is_empty() {
            return Err(FetchError::MissingBlock(horizon));
        }

        let len = match (block, horizon) {
            (_, Horizon::Current) | (None, _) => 0,
            (Some(b), _) => step_count(horizon, b)?,
        };

        Ok(Self { horizon, block, request, len })
    }

    fn column(&self, name: &str) -> Option<&'a Column> {
        debug_assert!(
            self.horizon.field(name).is_some(),
            "{name} is not part of the {} schema",
            self.horizon
        );
        let slot = self.request.slot_of(self.horizon, name)?;
        self.block?.variable(slot)
    }

    fn start(&self) -> Result<DateTime<Utc>, FetchError> {
        let time = self.block.map_or(0, |b| b.time);
        epoch(time)
    }

    fn times(&self) -> Result<Vec<DateTime<Utc>>, FetchError> {
        let Some(block) = self.block else {
            return Ok(Vec::new());
        };
        (0..self.len as i64)
            .map(|i| epoch(block.time + i * block.interval))
            .collect()
    }

    fn scalar_raw(&self, name: &str) -> Result<Option<f64>, FetchError> {
        match self.column(name) {
            None => Ok(None),
            Some(Column::Scalar(v)) => Ok(Some(*v)),
            Some(_) => Err(self.shape_error(name)),
        }
    }

    fn scalar(&self, name: &str) -> Result<f64, FetchError> {
        Ok(self.scalar_raw(name)?.map_or(0.0, round_tenth))
    }

    /// Raw float samples of `name`, zero-filled when the slot is absent.
    fn floats(&self, name: &str) -> Result<Vec<f64>, FetchError> {
        match self.column(name) {
            None => Ok(vec![0.0; self.len]),
            Some(Column::Floats(values)) if values.len() == self.len => {
                Ok(values.iter().map(|&v| f64::from(v)).collect())
            }
            Some(Column::Floats(values)) => Err(self.length_error(name, values.len())),
            Some(_) => Err(self.shape_error(name)),
        }
    }

    fn measurements(&self, name: &str) -> Result<Vec<f32>, FetchError> {
        self.expect_kind(name, FieldKind::Measurement);
        Ok(self
            .floats(name)?
            .into_iter()
            .map(|v| round_tenth(v) as f32)
            .collect())
    }

    fn codes(&self, name: &str) -> Result<Vec<i32>, FetchError> {
        self.expect_kind(name, FieldKind::Code);
        Ok(self.floats(name)?.into_iter().map(round_code).collect())
    }

    fn flags(&self, name: &str) -> Result<Vec<bool>, FetchError> {
        self.expect_kind(name, FieldKind::Flag);
        Ok(self
            .floats(name)?
            .into_iter()
            .map(|v| round_code(v) == 1)
            .collect())
    }

    /// Int64 epoch columns, read one entry per step.
    fn instants(&self, name: &str) -> Result<Vec<DateTime<Utc>>, FetchError> {
        self.expect_kind(name, FieldKind::Instant);
        match self.column(name) {
            None => (0..self.len).map(|_| epoch(0)).collect(),
            Some(Column::Int64(values)) if values.len() == self.len => {
                (0..self.len).map(|i| epoch(values[i])).collect()
            }
            Some(Column::Int64(values)) => Err(self.length_error(name, values.len())),
            Some(_) => Err(self.shape_error(name)),
        }
    }

    fn expect_kind(&self, name: &str, kind: FieldKind) {
        debug_assert_eq!(
            self.horizon.field(name).map(|f| f.kind),
            Some(kind),
            "{name} read with the wrong kind"
        );
    }

    fn shape_error(&self, name: &str) -> FetchError {
        FetchError::malformed(format!("{}.{name} has an unexpected column type", self.horizon))
    }

    fn length_error(&self, name: &str, got: usize) -> FetchError {
        FetchError::malformed(format!(
            "{}.{name} has {got} values but the horizon has {} steps",
            self.horizon, self.len
        ))
    }
}

/// Number of steps `(time_end - time) / interval` of an array block.
fn step_count(horizon: Horizon, block: &RawBlock) -> Result<usize, FetchError> {
    let span = block
        .time_end
        .checked_sub(block.time)
        .ok_or_else(|| FetchError::malformed(format!("{horizon} time range overflows")))?;
    if span == 0 {
        return Ok(0);
    }
    if block.interval <= 0 || span < 0 || span % block.interval != 0 {
        return Err(FetchError::malformed(format!(
            "{horizon} span {span}s is not a whole number of {}s steps",
            block.interval
        )));
    }
    usize::try_from(span / block.interval)
        .map_err(|_| FetchError::malformed(format!("{horizon} step count overflows")))
}

fn epoch(seconds: i64) -> Result<DateTime<Utc>, FetchError> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| FetchError::malformed(format!("timestamp {seconds} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::day_label;
    use crate::provider::DEFAULT_PAST_DAYS;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    const DAY: i64 = 86_400;
    const HOUR: i64 = 3_600;
    // 2024-03-01T00:00:00+08:00
    const START: i64 = 1_709_222_400;

    fn block(time: i64, steps: i64, interval: i64, variables: Vec<Option<Column>>) -> RawBlock {
        RawBlock {
            time,
            time_end: time + steps * interval,
            interval,
            variables,
        }
    }

    fn floats(values: &[f32]) -> Option<Column> {
        Some(Column::Floats(values.to_vec()))
    }

    fn current_block(request: &ForecastRequest) -> RawBlock {
        let variables = request
            .current
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value = match name.as_str() {
                    "temperature_2m" => 12.345,
                    "is_day" => 1.0,
                    "weather_code" => 2.6,
                    _ => i as f64 + 0.04,
                };
                Some(Column::Scalar(value))
            })
            .collect();
        RawBlock {
            time: START + 10 * HOUR,
            time_end: START + 10 * HOUR + 900,
            interval: 900,
            variables,
        }
    }

    fn full_raw(request: &ForecastRequest, days: i64) -> RawForecast {
        let hours = days * 24;
        let hourly_vars = request
            .hourly
            .iter()
            .map(|_| floats(&vec![1.26; hours as usize]))
            .collect();
        let daily_vars = request
            .daily
            .iter()
            .map(|name| match name.as_str() {
                "sunrise" => Some(Column::Int64(
                    (0..days).map(|d| START + (d - 1) * DAY + 6 * HOUR).collect(),
                )),
                "sunset" => Some(Column::Int64(
                    (0..days).map(|d| START + (d - 1) * DAY + 18 * HOUR).collect(),
                )),
                "weather_code" => floats(&vec![95.0; days as usize]),
                _ => floats(&vec![20.05; days as usize]),
            })
            .collect();

        RawForecast {
            latitude: 39.875,
            longitude: 116.375,
            timezone: Some("Asia/Shanghai".into()),
            timezone_abbreviation: Some("GMT+8".into()),
            utc_offset_seconds: 8 * 3600,
            current: Some(current_block(request)),
            minutely_15: Some(block(
                START,
                4,
                900,
                vec![floats(&[0.0, 0.14, 0.25, 1.0]), floats(&[0.0; 4]), floats(&[0.0; 4])],
            )),
            hourly: Some(block(START - DAY, hours, HOUR, hourly_vars)),
            daily: Some(block(START - DAY, days, DAY, daily_vars)),
        }
    }

    #[test]
    fn rounding_is_half_up_to_one_decimal() {
        assert_eq!(round_tenth(12.345), 12.3);
        assert_eq!(round_tenth(0.25), 0.3);
        assert_eq!(round_tenth(-2.25), -2.2);
        assert_eq!(round_tenth(-0.04), 0.0);
        assert_eq!(round_code(2.5), 3);
        assert_eq!(round_code(94.6), 95);
        assert_eq!(round_code(f64::NAN), 0);
    }

    #[test]
    fn normalizes_every_horizon() {
        let request = ForecastRequest::new(39.9042, 116.4074);
        let series = normalize(&full_raw(&request, 8), &request).unwrap();

        assert_eq!(series.current.temperature_2m, 12.3);
        assert!(series.current.is_day);
        assert_eq!(series.current.weather_code, 3);
        assert_eq!(series.current.time.timestamp(), START + 10 * HOUR);

        assert_eq!(series.minutely_15.time.len(), 4);
        assert_eq!(series.minutely_15.precipitation, [0.0, 0.1, 0.3, 1.0]);

        assert_eq!(series.hourly.time.len(), 8 * 24);
        assert!(series.hourly.temperature_2m.iter().all(|&v| v == 1.3));
        assert!(series.hourly.is_day.iter().all(|&d| d));

        assert_eq!(series.daily.len(), 8);
        assert_eq!(series.daily.weather_code, vec![95; 8]);
        assert_eq!(series.daily.temperature_2m_max[0], round_tenth(f64::from(20.05f32)) as f32);
        assert_eq!(series.daily.sunrise[1].timestamp(), START + 6 * HOUR);
        assert_eq!(series.daily.sunset[0].timestamp(), START - DAY + 18 * HOUR);

        assert_eq!(series.location.latitude, 39.875);
        assert_eq!(series.location.timezone_abbreviation, "GMT+8");
    }

    #[test]
    fn every_array_matches_its_time_axis() {
        let request = ForecastRequest::new(0.0, 0.0);
        let series = normalize(&full_raw(&request, 3), &request).unwrap();
        let h = &series.hourly;
        let n = h.time.len();
        for len in [
            h.temperature_2m.len(),
            h.visibility.len(),
            h.is_day.len(),
            h.weather_code.len(),
            h.sunshine_duration.len(),
        ] {
            assert_eq!(len, n);
        }
        let d = &series.daily;
        assert_eq!(d.sunrise.len(), d.time.len());
        assert_eq!(d.precipitation_probability_max.len(), d.time.len());
    }

    #[test]
    fn time_axis_starts_at_block_start_and_increases() {
        let request = ForecastRequest::new(0.0, 0.0);
        let series = normalize(&full_raw(&request, 2), &request).unwrap();
        let times = &series.hourly.time;
        assert_eq!(times[0].timestamp(), START - DAY);
        assert!(times.windows(2).all(|w| w[1] - w[0] == chrono::Duration::hours(1)));
    }

    #[test]
    fn missing_variable_slot_is_zero_filled() {
        let request = ForecastRequest::new(0.0, 0.0);
        let mut raw = full_raw(&request, 2);
        let slot = request.slot_of(Horizon::Hourly, "visibility").unwrap();
        raw.hourly.as_mut().unwrap().variables[slot] = None;
        let sunset = request.slot_of(Horizon::Daily, "sunset").unwrap();
        raw.daily.as_mut().unwrap().variables.truncate(sunset);

        let series = normalize(&raw, &request).unwrap();
        assert_eq!(series.hourly.visibility, vec![0.0; 48]);
        assert_eq!(series.daily.sunset.len(), 2);
        assert!(series.daily.sunset.iter().all(|t| t.timestamp() == 0));
        assert_eq!(series.daily.weather_code, vec![0, 0]);
    }

    #[test]
    fn missing_current_block_fails() {
        let request = ForecastRequest::new(0.0, 0.0);
        let mut raw = full_raw(&request, 1);
        raw.current = None;
        assert!(matches!(
            normalize(&raw, &request),
            Err(FetchError::MissingBlock(Horizon::Current))
        ));
    }

    #[test]
    fn missing_daily_block_fails() {
        let request = ForecastRequest::new(0.0, 0.0);
        let mut raw = full_raw(&request, 1);
        raw.daily = None;
        assert!(matches!(
            normalize(&raw, &request),
            Err(FetchError::MissingBlock(Horizon::Daily))
        ));
    }

    #[test]
    fn unrequested_horizon_is_empty_not_an_error() {
        let overrides = ForecastOverrides {
            minutely_15: Some(Vec::new()),
            ..Default::default()
        };
        let request = ForecastRequest::new(0.0, 0.0).with_overrides(&overrides);
        let mut raw = full_raw(&request, 1);
        raw.minutely_15 = None;

        let series = normalize(&raw, &request).unwrap();
        assert!(series.minutely_15.time.is_empty());
        assert!(series.minutely_15.rain.is_empty());
    }

    #[test]
    fn zero_length_horizon_gives_empty_arrays() {
        let request = ForecastRequest::new(0.0, 0.0);
        let mut raw = full_raw(&request, 1);
        raw.hourly = Some(block(START, 0, HOUR, Vec::new()));

        let series = normalize(&raw, &request).unwrap();
        assert!(series.hourly.time.is_empty());
        assert!(series.hourly.temperature_2m.is_empty());
        assert!(series.hourly.weather_code.is_empty());
    }

    #[test]
    fn ragged_column_is_malformed() {
        let request = ForecastRequest::new(0.0, 0.0);
        let mut raw = full_raw(&request, 2);
        raw.hourly.as_mut().unwrap().variables[0] = floats(&[1.0, 2.0]);
        assert!(matches!(normalize(&raw, &request), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn partial_step_span_is_malformed() {
        let request = ForecastRequest::new(0.0, 0.0);
        let mut raw = full_raw(&request, 1);
        raw.daily.as_mut().unwrap().time_end += 1;
        assert!(matches!(normalize(&raw, &request), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn overflowing_span_is_malformed() {
        let request = ForecastRequest::new(0.0, 0.0);
        let mut raw = full_raw(&request, 1);
        let hourly = raw.hourly.as_mut().unwrap();
        hourly.time = i64::MIN;
        hourly.time_end = i64::MAX;
        assert!(matches!(normalize(&raw, &request), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn overrides_reorder_slots_without_confusing_fields() {
        let overrides = ForecastOverrides {
            minutely_15: Some(vec!["snowfall".into(), "precipitation".into()]),
            ..Default::default()
        };
        let request = ForecastRequest::new(0.0, 0.0).with_overrides(&overrides);
        let mut raw = full_raw(&request, 1);
        raw.minutely_15 = Some(block(START, 2, 900, vec![floats(&[5.0, 6.0]), floats(&[0.1, 0.2])]));

        let series = normalize(&raw, &request).unwrap();
        assert_eq!(series.minutely_15.snowfall, [5.0, 6.0]);
        assert_eq!(series.minutely_15.precipitation, [0.1, 0.2]);
        assert_eq!(series.minutely_15.rain, [0.0, 0.0]);
    }

    #[derive(Debug)]
    struct CannedProvider {
        raw: RawForecast,
        seen: Mutex<Vec<ForecastRequest>>,
    }

    #[async_trait]
    impl ForecastProvider for CannedProvider {
        async fn fetch_raw(&self, request: &ForecastRequest) -> Result<RawForecast, FetchError> {
            self.seen.lock().push(request.clone());
            Ok(self.raw.clone())
        }
    }

    #[tokio::test]
    async fn fetch_uses_history_window_for_day_labels() {
        let request = ForecastRequest::new(39.9042, 116.4074);
        let provider = CannedProvider {
            raw: full_raw(&request, 8),
            seen: Mutex::new(Vec::new()),
        };
        let normalizer = ForecastNormalizer::new(provider);

        let series = normalizer.fetch(39.9042, 116.4074, None).await.unwrap();

        let today = DailyForecast::today_index(DEFAULT_PAST_DAYS);
        assert_eq!(today, 1);
        assert_eq!(day_label(0, DEFAULT_PAST_DAYS), Some("昨天"));
        assert_eq!(day_label(today, DEFAULT_PAST_DAYS), Some("今天"));
        assert_eq!(series.daily.len(), 8);
    }

    #[tokio::test]
    async fn fetch_applies_call_overrides_over_instance_overrides() {
        let request = ForecastRequest::new(0.0, 0.0);
        let provider = CannedProvider {
            raw: full_raw(&request, 1),
            seen: Mutex::new(Vec::new()),
        };
        let normalizer = ForecastNormalizer::new(provider).with_overrides(ForecastOverrides {
            timezone: Some("UTC".into()),
            models: Some("gfs_seamless".into()),
            ..Default::default()
        });
        let call = ForecastOverrides {
            timezone: Some("Asia/Tokyo".into()),
            ..Default::default()
        };

        normalizer.fetch(35.0, 139.0, Some(&call)).await.unwrap();

        let seen = normalizer.provider.seen.lock();
        assert_eq!(seen[0].timezone, "Asia/Tokyo");
        assert_eq!(seen[0].models, "gfs_seamless");
        assert_eq!(seen[0].latitude, 35.0);
    }

    #[tokio::test]
    async fn malformed_response_yields_no_series() {
        let request = ForecastRequest::new(0.0, 0.0);
        let mut raw = full_raw(&request, 1);
        raw.hourly = None;
        let normalizer = ForecastNormalizer::new(CannedProvider {
            raw,
            seen: Mutex::new(Vec::new()),
        });

        let result = normalizer.fetch(0.0, 0.0, None).await;
        assert!(matches!(result, Err(FetchError::MissingBlock(Horizon::Hourly))));
    }
}
