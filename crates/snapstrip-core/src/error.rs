/// Core error types for snapstrip.
use std::path::PathBuf;

/// A specialized Result type for snapstrip operations.
pub type SnapResult<T> = Result<T, SnapError>;

/// Top-level error type encompassing all snapstrip subsystems.
///
/// Every variant is terminal for the single operation that raised it; none of
/// them invalidates the capture session as a whole.
#[derive(Debug, thiserror::Error)]
pub enum SnapError {
    /// Permission denied, no device, or the stream never became playable.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    /// Rasterizing video-to-surface or layout-to-image failed.
    #[error("capture render failure: {0}")]
    CaptureRenderFailure(String),

    /// An operation was invoked in a state that does not accept it.
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("filter syntax error: {message} at column {column}")]
    FilterSyntax { message: String, column: usize },

    #[error("encode error: {0}")]
    Encode(String),

    #[error("asset error: {message} ({path:?})")]
    Asset { message: String, path: PathBuf },

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SnapError {
    /// Create a filter syntax error at a 1-based column.
    pub fn filter_syntax(message: impl Into<String>, column: usize) -> Self {
        SnapError::FilterSyntax {
            message: message.into(),
            column,
        }
    }

    /// Create an asset error.
    pub fn asset(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        SnapError::Asset {
            message: message.into(),
            path: path.into(),
        }
    }

    pub fn camera(message: impl Into<String>) -> Self {
        SnapError::CameraUnavailable(message.into())
    }

    pub fn render(message: impl Into<String>) -> Self {
        SnapError::CaptureRenderFailure(message.into())
    }
}
