//! Declarative index metadata attached to models.

use std::time::Duration;

use bson::Document;
use mongodb::IndexModel;
use mongodb::options::IndexOptions;

use crate::error::{MogoError, MogoResult};

/// An index a model wants on its collection.
///
/// Keys use the `-field` convention for descending order:
///
/// ```rust
/// use mogo_core::Index;
///
/// let index = Index::new(["email", "-created_at"]).unique();
/// assert_eq!(index.keys_document().get_i32("created_at").unwrap(), -1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Index {
    /// Field names in declaration order.
    pub keys: Vec<String>,
    /// Reject duplicate values.
    pub unique: bool,
    /// Skip documents missing the indexed fields.
    pub sparse: bool,
    /// Build in the background (ignored by servers since 4.2).
    pub background: bool,
    /// Explicit index name.
    pub name: Option<String>,
    /// TTL for documents in the collection.
    pub expire_after: Option<Duration>,
}

impl Index {
    /// Create an index over the given keys.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Mark the index unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark the index sparse.
    pub fn sparse(mut self) -> Self {
        self.sparse = true;
        self
    }

    /// Request a background build.
    pub fn background(mut self) -> Self {
        self.background = true;
        self
    }

    /// Set the index name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Expire documents after the given duration.
    pub fn expire_after(mut self, ttl: Duration) -> Self {
        self.expire_after = Some(ttl);
        self
    }

    /// Render the key specification, `{field: 1 | -1}`.
    pub fn keys_document(&self) -> Document {
        let mut keys = Document::new();
        for key in &self.keys {
            let (field, direction) = parse_key(key);
            if !field.is_empty() {
                keys.insert(field, direction);
            }
        }
        keys
    }

    /// Convert into a driver index model.
    pub fn to_index_model(&self) -> MogoResult<IndexModel> {
        let keys = self.keys_document();
        if keys.is_empty() {
            return Err(MogoError::index("index declares no keys"));
        }

        let mut options = IndexOptions::default();
        if self.unique {
            options.unique = Some(true);
        }
        if self.sparse {
            options.sparse = Some(true);
        }
        if self.background {
            options.background = Some(true);
        }
        options.name = self.name.clone();
        options.expire_after = self.expire_after;

        Ok(IndexModel::builder().keys(keys).options(options).build())
    }
}

/// Split `-field` / `+field` / `field` into the name and a sort direction.
pub(crate) fn parse_key(key: &str) -> (&str, i32) {
    let key = key.trim();
    if let Some(field) = key.strip_prefix('-') {
        (field.trim(), -1)
    } else if let Some(field) = key.strip_prefix('+') {
        (field.trim(), 1)
    } else {
        (key, 1)
    }
}
