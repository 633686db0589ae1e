use thiserror::Error;

/// Result type for delta extraction
pub type Result<T> = std::result::Result<T, DeltaError>;

/// Errors that can occur while computing a change batch
#[derive(Error, Debug)]
pub enum DeltaError {
    /// The revision provider could not list changes or resolve a revision
    #[error("Revision provider error: {0}")]
    ProviderError(String),

    /// The extractor could not be constructed
    #[error(transparent)]
    ExtractError(#[from] archmap_extractor::ExtractError),
}

impl DeltaError {
    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::ProviderError(msg.into())
    }
}
