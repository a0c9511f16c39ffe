use thiserror::Error;

use crate::config::OptionKey;

/// Errors surfaced by the video-capture use case
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("precondition violated: {0}")]
    Precondition(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("option {0} is derived by the use case and may not be set directly")]
    UnsupportedOption(OptionKey),

    #[error("already attached to camera {0}")]
    AlreadyAttached(String),

    #[error("use case is not attached to a camera")]
    NotAttached,

    #[error("pipeline coordinator unavailable: {0}")]
    Coordinator(String),
}

/// Result type alias for use-case operations
pub type Result<T> = std::result::Result<T, CaptureError>;
