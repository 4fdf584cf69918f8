//! Error types for mogo operations.

use thiserror::Error;

/// Result type for mogo operations.
pub type MogoResult<T> = Result<T, MogoError>;

/// Errors that can occur while mapping, querying or connecting.
#[derive(Error, Debug)]
pub enum MogoError {
    /// MongoDB driver error.
    #[error("mongodb error: {0}")]
    Driver(#[from] mongodb::error::Error),

    /// BSON serialization error.
    #[error("bson error: {0}")]
    Bson(#[from] bson::ser::Error),

    /// BSON deserialization error.
    #[error("bson deserialization error: {0}")]
    BsonDe(#[from] bson::de::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection URI could not be parsed.
    #[error("could not parse URI: {0}")]
    InvalidUri(String),

    /// The model carries no usable `_id`.
    #[error("model id missing: {0}")]
    MissingId(String),

    /// Document not found.
    #[error("document not found: {0}")]
    NotFound(String),

    /// Invalid ObjectId.
    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    /// Document serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid index declaration.
    #[error("index error: {0}")]
    Index(String),
}

impl MogoError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid URI error.
    pub fn invalid_uri(message: impl Into<String>) -> Self {
        Self::InvalidUri(message.into())
    }

    /// Create a missing id error.
    pub fn missing_id(message: impl Into<String>) -> Self {
        Self::MissingId(message.into())
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create an invalid object id error.
    pub fn invalid_object_id(message: impl Into<String>) -> Self {
        Self::InvalidObjectId(message.into())
    }

    /// Create an index error.
    pub fn index(message: impl Into<String>) -> Self {
        Self::Index(message.into())
    }

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a missing id error.
    pub fn is_missing_id(&self) -> bool {
        matches!(self, Self::MissingId(_))
    }

    /// Check if the server rejected a write because of a unique index.
    pub fn is_duplicate_key(&self) -> bool {
        match self {
            Self::Driver(e) => {
                let msg = e.to_string();
                msg.contains("E11000") || msg.contains("duplicate key")
            }
            _ => false,
        }
    }
}

impl From<bson::oid::Error> for MogoError {
    fn from(err: bson::oid::Error) -> Self {
        MogoError::InvalidObjectId(err.to_string())
    }
}
