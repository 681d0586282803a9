//! Application error type.

use hand_tracker::TrackerError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("camera: {0}")]
    Camera(String),

    #[error("window: {0}")]
    Window(String),

    #[error("config: {0}")]
    Config(String),

    #[error("{stage} setup failed: {reason}")]
    Setup { stage: &'static str, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
