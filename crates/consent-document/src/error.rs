use thiserror::Error;

pub type DocumentResult<T> = Result<T, DocumentError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// The tree violates the structural contract renderers rely on.
    #[error("render failure: {0}")]
    RenderFailure(String),
}
