//! The contract every persisted type fulfils.

use bson::oid::ObjectId;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::index::Index;
use crate::naming::collection_name_of;

/// A type stored as documents in its own collection.
///
/// Usually derived with `#[derive(mogo::Model)]`, but a manual impl only
/// needs the id accessors:
///
/// ```rust
/// use mogo_core::{Model, ObjectId};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct AuditEntry {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     id: Option<ObjectId>,
///     action: String,
/// }
///
/// impl Model for AuditEntry {
///     fn id(&self) -> Option<ObjectId> {
///         self.id
///     }
///
///     fn set_id(&mut self, id: ObjectId) {
///         self.id = Some(id);
///     }
/// }
///
/// assert_eq!(AuditEntry::collection_name(), "audit_entry");
/// ```
pub trait Model: Serialize + DeserializeOwned + Unpin + Send + Sync + Sized {
    /// The collection this type lives in.
    ///
    /// Defaults to the snake_case type name.
    fn collection_name() -> String {
        collection_name_of::<Self>()
    }

    /// Indexes ensured the first time the collection is used.
    fn indexes() -> Vec<Index> {
        Vec::new()
    }

    /// The document `_id`, if one is set.
    fn id(&self) -> Option<ObjectId>;

    /// Store a document `_id`.
    fn set_id(&mut self, id: ObjectId);
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_explicit_collection_name() {
        assert_eq!(TestCollection::collection_name(), "test");
        assert!(TestCollection::indexes().is_empty());
    }

    #[test]
    fn test_derived_collection_name() {
        assert_eq!(UserAccount::collection_name(), "user_account");
        assert_eq!(UserAccount::indexes().len(), 2);
    }

    #[test]
    fn test_id_accessors() {
        let mut record = TestCollection::default();
        assert_eq!(record.id(), None);

        let oid = ObjectId::new();
        record.set_id(oid);
        assert_eq!(record.id(), Some(oid));

        let mut account = UserAccount {
            id: ObjectId::new(),
            email: "a@example.com".to_string(),
        };
        account.set_id(oid);
        assert_eq!(account.id(), Some(oid));
    }
}
