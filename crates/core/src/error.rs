#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("identifier error: {0}")]
    Uuid(#[from] rxnorm_uuid::UuidError),
    #[error("OWL error: {0}")]
    Owl(#[from] owl::OwlError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Failure reported by an [`crate::EntityLoader`].
///
/// Loaders live outside the core, so the failure is carried as text.
#[derive(Debug, thiserror::Error)]
#[error("loader failed: {0}")]
pub struct LoaderError(pub String);

impl LoaderError {
    pub fn new(message: impl std::fmt::Display) -> Self {
        Self(message.to_string())
    }
}
