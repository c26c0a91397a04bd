//! Error types shared by both GreenLens services.

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling a prediction request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Audio decoding failure (unsupported format, corrupt data).
    #[error("audio decode error: {0}")]
    AudioDecode(String),

    /// Resampling failure.
    #[error("resample error: {0}")]
    Resample(String),

    /// Image decoding failure.
    #[error("image decode error: {0}")]
    ImageDecode(String),

    /// Model files not found or class map inconsistent with the model.
    #[error("model not available: {0}")]
    ModelNotAvailable(String),

    /// ONNX Runtime session creation or inference failure.
    #[error("inference error: {0}")]
    Inference(String),

    /// Chart rendering failure.
    #[error("chart error: {0}")]
    Chart(String),

    /// I/O error (file read/write).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
