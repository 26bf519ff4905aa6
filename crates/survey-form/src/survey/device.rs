//! Device capabilities the form depends on but does not own: the one-shot
//! geolocation fix and the camera/gallery picker.

use async_trait::async_trait;

use super::domain::Coordinates;
use super::photos::Photo;

/// Hints passed along with a position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("geolocation is not supported on this device")]
    Unsupported,
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable: {0}")]
    Unavailable(String),
    #[error("timed out waiting for a position")]
    Timeout,
}

impl LocationError {
    /// Maps the error codes browsers report for `getCurrentPosition`.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "unsupported" => Self::Unsupported,
            "permission_denied" | "denied" | "1" => Self::PermissionDenied,
            "timeout" | "3" => Self::Timeout,
            other => Self::Unavailable(other.to_string()),
        }
    }
}

/// One-shot "get current position" call. Not a continuous watch.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Whether the device exposes geolocation at all. When this is `false` no
    /// request is made.
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self, options: PositionOptions)
        -> Result<Coordinates, LocationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhotoSourceError {
    #[error("photo picker unavailable: {0}")]
    Unavailable(String),
    #[error("photo could not be read: {0}")]
    Unreadable(String),
}

/// Camera or gallery picker yielding zero or more images per invocation.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    async fn pick(&self) -> Result<Vec<Photo>, PhotoSourceError>;
}
