//! Model <-> BSON document conversion and identifier handling.

use bson::{Document, oid::ObjectId};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{MogoError, MogoResult};

/// Convert a model to a BSON document.
pub fn to_document<T: Serialize>(value: &T) -> MogoResult<Document> {
    bson::to_document(value).map_err(|e| MogoError::serialization(e.to_string()))
}

/// Convert a BSON document to a model.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> MogoResult<T> {
    bson::from_document(doc).map_err(|e| MogoError::serialization(e.to_string()))
}

/// Parse an ObjectId from its hex form.
pub fn parse_object_id(s: &str) -> MogoResult<ObjectId> {
    ObjectId::parse_str(s).map_err(MogoError::from)
}

/// Create a new ObjectId.
pub fn new_object_id() -> ObjectId {
    ObjectId::new()
}

/// Anything that can identify a document: an [`ObjectId`] or its hex form.
pub trait IntoObjectId {
    /// Resolve to an ObjectId.
    fn into_object_id(self) -> MogoResult<ObjectId>;
}

impl IntoObjectId for ObjectId {
    fn into_object_id(self) -> MogoResult<ObjectId> {
        Ok(self)
    }
}

impl IntoObjectId for &ObjectId {
    fn into_object_id(self) -> MogoResult<ObjectId> {
        Ok(*self)
    }
}

impl IntoObjectId for &str {
    fn into_object_id(self) -> MogoResult<ObjectId> {
        parse_object_id(self)
    }
}

impl IntoObjectId for String {
    fn into_object_id(self) -> MogoResult<ObjectId> {
        parse_object_id(&self)
    }
}

impl IntoObjectId for &String {
    fn into_object_id(self) -> MogoResult<ObjectId> {
        parse_object_id(self)
    }
}
