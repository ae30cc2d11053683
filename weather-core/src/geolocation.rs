//! One-shot device geolocation with error classification and fallback to
//! the last persisted auto-detected coordinates.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::PositionError;
use crate::model::Coordinates;
use crate::storage::LocationStore;

/// Options passed to the position capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Maximum age of a cached position that may be reused. Zero disables reuse.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Platform capability answering a single coordinate query.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, PositionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationErrorKind {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Other,
    Unsupported,
}

impl GeolocationErrorKind {
    pub fn classify(error: &PositionError) -> Self {
        match error {
            PositionError::PermissionDenied => Self::PermissionDenied,
            PositionError::PositionUnavailable(_) => Self::PositionUnavailable,
            PositionError::Timeout => Self::Timeout,
            PositionError::Other(_) => Self::Other,
            PositionError::Unsupported => Self::Unsupported,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "位置权限被拒绝",
            Self::PositionUnavailable => "位置信息不可用",
            Self::Timeout => "获取位置超时",
            Self::Other => "获取位置时发生错误",
            Self::Unsupported => "您的设备不支持获取地理位置",
        }
    }
}

const FALLBACK_NOTE: &str = "，使用上次已知位置";

/// Outcome of a location request as shown to the user.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeolocationState {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub error: Option<String>,
    pub error_kind: Option<GeolocationErrorKind>,
}

impl GeolocationState {
    fn located(coords: Coordinates) -> Self {
        Self {
            latitude: Some(coords.latitude),
            longitude: Some(coords.longitude),
            ..Self::default()
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }

    /// True when coordinates are present but came from the fallback.
    pub fn is_fallback(&self) -> bool {
        self.error.is_some() && self.coordinates().is_some()
    }
}

pub struct GeolocationSession<P> {
    provider: P,
    store: LocationStore,
    options: PositionOptions,
}

impl<P: PositionProvider> GeolocationSession<P> {
    pub fn new(provider: P, store: LocationStore) -> Self {
        Self {
            provider,
            store,
            options: PositionOptions::default(),
        }
    }

    pub fn options(&self) -> &PositionOptions {
        &self.options
    }

    /// Start-up state: the last auto-detected coordinates, if any.
    pub fn restore(&self) -> GeolocationState {
        self.store
            .last_auto_location()
            .map(GeolocationState::located)
            .unwrap_or_default()
    }

    /// Queries the position once. Successful coordinates are persisted; on
    /// failure the last persisted coordinates are used when available.
    /// Without a capability at all there is no fallback: the start-up state
    /// is kept and only the error is reported.
    pub async fn request_location(&self) -> GeolocationState {
        let outcome = tokio::time::timeout(
            self.options.timeout,
            self.provider.current_position(&self.options),
        )
        .await
        .unwrap_or(Err(PositionError::Timeout));

        match outcome {
            Ok(coords) => {
                info!(
                    latitude = coords.latitude,
                    longitude = coords.longitude,
                    "Got device position"
                );
                self.store.save_auto_location(coords);
                GeolocationState::located(coords)
            }
            Err(PositionError::Unsupported) => {
                let kind = GeolocationErrorKind::Unsupported;
                warn!("No position capability");
                GeolocationState {
                    error: Some(kind.message().to_string()),
                    error_kind: Some(kind),
                    ..self.restore()
                }
            }
            Err(e) => {
                let kind = GeolocationErrorKind::classify(&e);
                warn!("Position request failed: {e}");
                match self.store.last_auto_location() {
                    Some(last) => {
                        debug!("Falling back to last known position");
                        GeolocationState {
                            error: Some(format!("{}{FALLBACK_NOTE}", kind.message())),
                            error_kind: Some(kind),
                            ..GeolocationState::located(last)
                        }
                    }
                    None => GeolocationState {
                        latitude: None,
                        longitude: None,
                        error: Some(kind.message().to_string()),
                        error_kind: Some(kind),
                    },
                }
            }
        }
    }
}

pub const DEFAULT_IP_LOOKUP_URL: &str = "https://ipapi.co/json/";
const USER_AGENT: &str = concat!("weather-cli/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct IpLookup {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Approximate position from an IP geolocation service, for machines
/// without a positioning device. Accuracy options are ignored.
#[derive(Debug, Clone)]
pub struct IpPositionProvider {
    url: String,
    http: Client,
}

impl IpPositionProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
        }
    }
}

impl Default for IpPositionProvider {
    fn default() -> Self {
        Self::new(DEFAULT_IP_LOOKUP_URL)
    }
}

#[async_trait]
impl PositionProvider for IpPositionProvider {
    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, PositionError> {
        let res = self
            .http
            .get(&self.url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PositionError::Timeout
                } else {
                    PositionError::PositionUnavailable(e.to_string())
                }
            })?;

        match res.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(PositionError::PermissionDenied);
            }
            status if !status.is_success() => {
                return Err(PositionError::Other(format!("lookup returned status {status}")));
            }
            _ => {}
        }

        let body: IpLookup = res
            .json()
            .await
            .map_err(|e| PositionError::PositionUnavailable(e.to_string()))?;

        match (body.latitude, body.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Ok(Coordinates::new(lat, lon))
            }
            _ => Err(PositionError::PositionUnavailable(
                "lookup response has no coordinates".to_string(),
            )),
        }
    }
}
