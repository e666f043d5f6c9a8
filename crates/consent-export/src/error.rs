use consent_document::DocumentError;
use std::time::Duration;
use thiserror::Error;

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug, Error)]
pub enum ExportError {
    /// Another export is in flight on this pipeline.
    #[error("an export is already in progress")]
    Busy,

    #[error(transparent)]
    Render(#[from] DocumentError),

    #[error("rasterization failed: {0}")]
    Raster(String),

    #[error("rasterization timed out after {0:?}")]
    Timeout(Duration),

    #[error("image encoding failed: {0}")]
    Encode(String),

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("print failed: {0}")]
    Print(String),
}

impl From<png::EncodingError> for ExportError {
    fn from(err: png::EncodingError) -> Self {
        ExportError::Encode(err.to_string())
    }
}
