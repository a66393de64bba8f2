// One error type for the whole app.
// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String),

    #[error("Window update error: {0}")]
    WindowUpdate(String),

    #[error("Camera init error: {0}")]
    CameraInit(String),

    #[error("Camera frame error: {0}")]
    CameraFrame(String),

    #[error("Fallback image error: {0}")]
    FallbackImage(String),

    #[error("Keypoint file error: {0}")]
    Keypoints(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serial error: {0}")]
    Serial(String),

    #[error("Tracing init error: {0}")]
    Tracing(String),
}

pub type Result<T> = std::result::Result<T, Error>;
