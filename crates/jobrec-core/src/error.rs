//! Error types for JobRec

/// Result type alias using JobRec's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for JobRec operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Model loading, tokenization or inference errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// The model's output width disagrees with the category list
    #[error("label mismatch: expected {expected} categories, model declares {actual}")]
    LabelMismatch { expected: usize, actual: usize },

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Short machine-readable kind, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Classifier(_) => "classifier",
            Self::Config(_) => "config",
            Self::LabelMismatch { .. } => "label_mismatch",
            Self::Internal(_) => "internal",
        }
    }
}
