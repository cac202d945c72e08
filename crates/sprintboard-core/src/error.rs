use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint in the store rejected the write.
    #[error("Unique constraint violated on {field}: {message}")]
    UniqueViolation { field: String, message: String },

    /// A reference points at a row that does not exist.
    #[error("Invalid reference on {field}: {message}")]
    InvalidReference { field: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BoardError {
    pub fn not_found(kind: &str, key: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} {}", kind, key))
    }

    /// Name of the offending field for errors a client can correct.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UniqueViolation { field, .. }
            | Self::InvalidReference { field, .. } => Some(field),
            _ => None,
        }
    }
}
