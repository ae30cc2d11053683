use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::error::FetchError;
use crate::schema::Horizon;

pub mod open_meteo;

pub use open_meteo::OpenMeteoProvider;

pub const DEFAULT_LATITUDE: f64 = 39.9042;
pub const DEFAULT_LONGITUDE: f64 = 116.4074;
pub const DEFAULT_MODEL: &str = "icon_global";
pub const DEFAULT_TIMEZONE: &str = "Asia/Shanghai";
pub const DEFAULT_PAST_DAYS: u32 = 1;
/// The only time encoding the decoder understands.
pub const TIMEFORMAT: &str = "unixtime";

/// Full parameter set of one forecast call.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub current: Vec<String>,
    pub minutely_15: Vec<String>,
    pub hourly: Vec<String>,
    pub daily: Vec<String>,
    pub models: String,
    pub timezone: String,
    pub past_days: u32,
    pub forecast_days: Option<u32>,
}

impl ForecastRequest {
    /// Default parameter set for the given coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            current: Horizon::Current.default_variables(),
            minutely_15: Horizon::Minutely15.default_variables(),
            hourly: Horizon::Hourly.default_variables(),
            daily: Horizon::Daily.default_variables(),
            models: DEFAULT_MODEL.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            past_days: DEFAULT_PAST_DAYS,
            forecast_days: None,
        }
    }

    /// Shallow merge: every key set in `overrides` replaces the default wholesale.
    pub fn with_overrides(mut self, overrides: &ForecastOverrides) -> Self {
        let o = overrides.clone();
        if let Some(v) = o.current {
            self.current = v;
        }
        if let Some(v) = o.minutely_15 {
            self.minutely_15 = v;
        }
        if let Some(v) = o.hourly {
            self.hourly = v;
        }
        if let Some(v) = o.daily {
            self.daily = v;
        }
        if let Some(v) = o.models {
            self.models = v;
        }
        if let Some(v) = o.timezone {
            self.timezone = v;
        }
        if let Some(v) = o.past_days {
            self.past_days = v;
        }
        if o.forecast_days.is_some() {
            self.forecast_days = o.forecast_days;
        }
        self
    }

    /// Requested variables of a horizon, in wire order.
    pub fn variables(&self, horizon: Horizon) -> &[String] {
        match horizon {
            Horizon::Current => &self.current,
            Horizon::Minutely15 => &self.minutely_15,
            Horizon::Hourly => &self.hourly,
            Horizon::Daily => &self.daily,
        }
    }

    /// Wire slot of `name` within `horizon`, if it was requested.
    pub fn slot_of(&self, horizon: Horizon, name: &str) -> Option<usize> {
        self.variables(horizon).iter().position(|v| v == name)
    }

    /// Query string pairs, in a fixed order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
        ];
        for horizon in [Horizon::Daily, Horizon::Hourly] {
            push_list(&mut pairs, horizon, self.variables(horizon));
        }
        pairs.push(("models", self.models.clone()));
        for horizon in [Horizon::Current, Horizon::Minutely15] {
            push_list(&mut pairs, horizon, self.variables(horizon));
        }
        pairs.push(("timezone", self.timezone.clone()));
        pairs.push(("past_days", self.past_days.to_string()));
        if let Some(days) = self.forecast_days {
            pairs.push(("forecast_days", days.to_string()));
        }
        pairs.push(("timeformat", TIMEFORMAT.to_string()));
        pairs
    }
}

fn push_list(pairs: &mut Vec<(&'static str, String)>, horizon: Horizon, vars: &[String]) {
    if !vars.is_empty() {
        pairs.push((horizon.as_str(), vars.join(",")));
    }
}

/// Caller-supplied replacements for request defaults. `None` keeps the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutely_15: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub past_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_days: Option<u32>,
}

/// One positional variable slot of a raw horizon block.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Scalar(f64),
    Floats(Vec<f32>),
    Int64(Vec<i64>),
}

/// Column-oriented horizon block: a start instant, an end instant, an
/// interval and one slot per requested variable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawBlock {
    pub time: i64,
    pub time_end: i64,
    pub interval: i64,
    pub variables: Vec<Option<Column>>,
}

impl RawBlock {
    pub fn variable(&self, slot: usize) -> Option<&Column> {
        self.variables.get(slot).and_then(Option::as_ref)
    }
}

/// Undecoded provider response for one location.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawForecast {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
    pub timezone_abbreviation: Option<String>,
    pub utc_offset_seconds: i32,
    pub current: Option<RawBlock>,
    pub minutely_15: Option<RawBlock>,
    pub hourly: Option<RawBlock>,
    pub daily: Option<RawBlock>,
}

impl RawForecast {
    pub fn block(&self, horizon: Horizon) -> Option<&RawBlock> {
        match horizon {
            Horizon::Current => self.current.as_ref(),
            Horizon::Minutely15 => self.minutely_15.as_ref(),
            Horizon::Hourly => self.hourly.as_ref(),
            Horizon::Daily => self.daily.as_ref(),
        }
    }
}

/// Source of raw forecast data. One call per request, no retries.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch_raw(&self, request: &ForecastRequest) -> Result<RawForecast, FetchError>;
}
