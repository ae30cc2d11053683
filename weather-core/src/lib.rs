//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - The place-name index and the remembered-location store
//! - The forecast pipeline: request schema, provider transport, normalization
//! - The weather-code catalog and display helpers
//! - One-shot geolocation with fallback
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod display;
pub mod error;
pub mod generation;
pub mod geolocation;
pub mod model;
pub mod normalize;
pub mod place_index;
pub mod provider;
pub mod schema;
pub mod storage;
pub mod weather_code;

pub use config::{Config, ForecastConfig};
pub use error::{DatasetLoadError, FetchError, PositionError, StorageError};
pub use generation::{LatestOnly, Ticket};
pub use geolocation::{GeolocationSession, GeolocationState, IpPositionProvider, PositionProvider};
pub use model::{Coordinates, PlaceRecord, ResolvedLocation, WeatherSeries};
pub use normalize::ForecastNormalizer;
pub use place_index::{DEFAULT_SEARCH_LIMIT, PlaceIndex, PlaceSource};
pub use provider::{ForecastOverrides, ForecastProvider, ForecastRequest, OpenMeteoProvider};
pub use schema::Horizon;
pub use storage::{FileStore, KeyValueStore, LocationStore, MemoryStore};
pub use weather_code::WeatherIcon;
