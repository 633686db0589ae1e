use thiserror::Error;

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur while classifying and extracting source files
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Failed to parse the source text
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Tree-sitter grammar could not be loaded
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    /// IO error occurred while scanning a repository
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A path could not be related to the repository root
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl ExtractError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }

    /// Create an invalid path error
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }
}
