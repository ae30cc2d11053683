use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::FetchError;
use crate::provider::{Column, ForecastProvider, ForecastRequest, RawBlock, RawForecast};
use crate::schema::{self, FieldKind, Horizon};

pub const DEFAULT_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";

/// Open-Meteo forecast endpoint, JSON encoding with unix timestamps.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    endpoint: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for OpenMeteoProvider {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    utc_offset_seconds: i32,
    timezone: Option<String>,
    timezone_abbreviation: Option<String>,
    current: Option<Map<String, Value>>,
    minutely_15: Option<Map<String, Value>>,
    hourly: Option<Map<String, Value>>,
    daily: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct OmError {
    reason: String,
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    async fn fetch_raw(&self, request: &ForecastRequest) -> Result<RawForecast, FetchError> {
        debug!(
            latitude = request.latitude,
            longitude = request.longitude,
            "Requesting Open-Meteo forecast"
        );

        let res = self
            .http
            .get(&self.endpoint)
            .query(&request.query_pairs())
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let reason = serde_json::from_str::<OmError>(&body)
                .map(|e| e.reason)
                .unwrap_or_else(|_| truncate_body(&body));
            return Err(FetchError::Status { status, reason });
        }

        let parsed: OmResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::malformed(format!("invalid forecast JSON: {e}")))?;

        decode(parsed, request)
    }
}

fn decode(parsed: OmResponse, request: &ForecastRequest) -> Result<RawForecast, FetchError> {
    let current = parsed
        .current
        .map(|map| decode_current(&map, request.variables(Horizon::Current)))
        .transpose()?;
    let minutely_15 = parsed
        .minutely_15
        .map(|map| decode_series(Horizon::Minutely15, &map, request))
        .transpose()?;
    let hourly = parsed
        .hourly
        .map(|map| decode_series(Horizon::Hourly, &map, request))
        .transpose()?;
    let daily = parsed
        .daily
        .map(|map| decode_series(Horizon::Daily, &map, request))
        .transpose()?;

    Ok(RawForecast {
        latitude: parsed.latitude,
        longitude: parsed.longitude,
        timezone: parsed.timezone,
        timezone_abbreviation: parsed.timezone_abbreviation,
        utc_offset_seconds: parsed.utc_offset_seconds,
        current,
        minutely_15,
        hourly,
        daily,
    })
}

fn decode_current(map: &Map<String, Value>, variables: &[String]) -> Result<RawBlock, FetchError> {
    let time = map
        .get("time")
        .and_then(Value::as_i64)
        .ok_or_else(|| FetchError::malformed("current block has no unix time"))?;
    let interval = map.get("interval").and_then(Value::as_i64).unwrap_or(0);
    let time_end = time
        .checked_add(interval)
        .ok_or_else(|| FetchError::malformed("current interval overflows"))?;

    // A null scalar means the model has no value, same as an absent key.
    let variables = variables
        .iter()
        .map(|name| match map.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_f64()
                .map(|v| Some(Column::Scalar(v)))
                .ok_or_else(|| FetchError::malformed(format!("current.{name} is not a number"))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawBlock {
        time,
        time_end,
        interval,
        variables,
    })
}

fn decode_series(
    horizon: Horizon,
    map: &Map<String, Value>,
    request: &ForecastRequest,
) -> Result<RawBlock, FetchError> {
    let times = map
        .get("time")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::malformed(format!("{horizon} block has no time array")))?
        .iter()
        .map(|v| {
            v.as_i64()
                .ok_or_else(|| FetchError::malformed(format!("{horizon} time is not unix seconds")))
        })
        .collect::<Result<Vec<i64>, _>>()?;

    let nominal = horizon.nominal_interval().unwrap_or(0);
    let overflow = || FetchError::malformed(format!("{horizon} time range overflows"));
    let interval = match times.as_slice() {
        [first, second, ..] => second.checked_sub(*first).ok_or_else(overflow)?,
        _ => nominal,
    };
    let time = times.first().copied().unwrap_or(0);
    let time_end = i64::try_from(times.len())
        .ok()
        .and_then(|count| interval.checked_mul(count))
        .and_then(|span| time.checked_add(span))
        .ok_or_else(overflow)?;

    let variables = request
        .variables(horizon)
        .iter()
        .map(|name| match map.get(name) {
            None => Ok(None),
            Some(Value::Array(values)) => {
                decode_column(schema::kind_of(horizon, name), values).map(Some)
            }
            Some(_) => Err(FetchError::malformed(format!(
                "{horizon}.{name} is not an array"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawBlock {
        time,
        time_end,
        interval,
        variables,
    })
}

fn decode_column(kind: FieldKind, values: &[Value]) -> Result<Column, FetchError> {
    match kind {
        FieldKind::Instant => values
            .iter()
            .map(|v| {
                v.as_i64()
                    .ok_or_else(|| FetchError::malformed("instant column holds a non-integer"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Column::Int64),
        _ => Ok(Column::Floats(
            values
                .iter()
                .map(|v| v.as_f64().map_or(f32::NAN, |f| f as f32))
                .collect(),
        )),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
