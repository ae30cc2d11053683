//! Error taxonomy.
//!
//! Only [`FetchError`] ever reaches callers of the forecast pipeline. The
//! other errors are absorbed where they happen: the place index degrades to
//! empty, storage failures become cache misses, and geolocation failures are
//! classified and turned into a fallback state.

use reqwest::StatusCode;
use thiserror::Error;

use crate::schema::Horizon;

/// Failure to produce a weather series. No partial series is ever returned.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("forecast request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("forecast provider returned status {status}: {reason}")]
    Status { status: StatusCode, reason: String },

    #[error("forecast response has no {0} block")]
    MissingBlock(Horizon),

    #[error("malformed forecast response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

/// Failure to load the place dataset. Logged by the index, never raised.
#[derive(Debug, Error)]
pub enum DatasetLoadError {
    #[error("failed to read place dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to download place dataset: {0}")]
    Http(#[from] reqwest::Error),

    #[error("place dataset download returned status {0}")]
    Status(StatusCode),

    #[error("failed to parse place dataset: {0}")]
    Csv(#[from] csv::Error),
}

/// Failure of the local key-value store. Treated as a miss or a no-op.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is not valid JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage is unavailable")]
    Unavailable,
}

/// Failure classes reported by a device position capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("permission to read the position was denied")]
    PermissionDenied,

    #[error("position is unavailable: {0}")]
    PositionUnavailable(String),

    #[error("position request timed out")]
    Timeout,

    #[error("position request failed: {0}")]
    Other(String),

    #[error("no position capability is available")]
    Unsupported,
}
