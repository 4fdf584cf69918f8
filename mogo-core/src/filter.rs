//! Filter document helpers for `where_` / `or` clauses.

use bson::{Bson, Document, doc, oid::ObjectId};

/// Fluent builder for filter documents.
///
/// Operator conditions on the same field are merged:
///
/// ```rust
/// use mogo_core::FilterBuilder;
/// use bson::doc;
///
/// let filter = FilterBuilder::new()
///     .eq("status", "active")
///     .gte("age", 18)
///     .lt("age", 65)
///     .build();
///
/// assert_eq!(filter, doc! { "status": "active", "age": { "$gte": 18, "$lt": 65 } });
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterBuilder {
    doc: Document,
}

impl FilterBuilder {
    /// Create a new empty filter builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filter builder from an existing document.
    pub fn from_doc(doc: Document) -> Self {
        Self { doc }
    }

    /// Add an equality condition, replacing anything set for the field.
    pub fn eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.doc.insert(field, value.into());
        self
    }

    /// Add a not-equal condition.
    pub fn ne(self, field: &str, value: impl Into<Bson>) -> Self {
        self.op(field, "$ne", value.into())
    }

    /// Add a greater-than condition.
    pub fn gt(self, field: &str, value: impl Into<Bson>) -> Self {
        self.op(field, "$gt", value.into())
    }

    /// Add a greater-than-or-equal condition.
    pub fn gte(self, field: &str, value: impl Into<Bson>) -> Self {
        self.op(field, "$gte", value.into())
    }

    /// Add a less-than condition.
    pub fn lt(self, field: &str, value: impl Into<Bson>) -> Self {
        self.op(field, "$lt", value.into())
    }

    /// Add a less-than-or-equal condition.
    pub fn lte(self, field: &str, value: impl Into<Bson>) -> Self {
        self.op(field, "$lte", value.into())
    }

    /// Add an "in" condition (value in array).
    pub fn in_array(self, field: &str, values: Vec<impl Into<Bson>>) -> Self {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.op(field, "$in", Bson::Array(values))
    }

    /// Add a "not in" condition.
    pub fn not_in(self, field: &str, values: Vec<impl Into<Bson>>) -> Self {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.op(field, "$nin", Bson::Array(values))
    }

    /// Add a regex condition.
    pub fn regex(self, field: &str, pattern: &str) -> Self {
        self.op(field, "$regex", Bson::String(pattern.to_string()))
    }

    /// Add an exists condition.
    pub fn exists(self, field: &str, exists: bool) -> Self {
        self.op(field, "$exists", Bson::Boolean(exists))
    }

    /// Match on `_id`.
    pub fn by_id(self, id: ObjectId) -> Self {
        self.eq("_id", id)
    }

    /// Build the filter document.
    pub fn build(self) -> Document {
        self.doc
    }

    /// Check if the filter is empty.
    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }

    fn op(mut self, field: &str, op: &str, value: Bson) -> Self {
        let merge = matches!(self.doc.get(field), Some(Bson::Document(ops)) if is_operator_doc(ops));
        if merge {
            if let Ok(ops) = self.doc.get_document_mut(field) {
                ops.insert(op, value);
            }
        } else {
            let mut ops = Document::new();
            ops.insert(op, value);
            self.doc.insert(field, ops);
        }
        self
    }
}

fn is_operator_doc(doc: &Document) -> bool {
    doc.keys().next().is_some_and(|k| k.starts_with('$'))
}

impl From<FilterBuilder> for Document {
    fn from(builder: FilterBuilder) -> Self {
        builder.build()
    }
}

/// Create an empty filter (matches all documents).
pub fn all() -> Document {
    doc! {}
}

/// Create an _id filter.
pub fn by_id(id: ObjectId) -> Document {
    doc! { "_id": id }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_eq_conditions() {
        let filter = FilterBuilder::new()
            .eq("name", "Alice")
            .eq("age", 30)
            .build();

        assert_eq!(filter, doc! { "name": "Alice", "age": 30 });
    }

    #[test]
    fn test_range_on_one_field_merges() {
        let filter = FilterBuilder::new().gte("age", 18).lt("age", 65).build();
        assert_eq!(filter, doc! { "age": { "$gte": 18, "$lt": 65 } });
    }

    #[test]
    fn test_eq_replaces_operators() {
        let filter = FilterBuilder::new().gt("age", 1).eq("age", 5).build();
        assert_eq!(filter, doc! { "age": 5 });
    }

    #[test]
    fn test_operator_after_embedded_eq_replaces() {
        let filter = FilterBuilder::new()
            .eq("address", doc! { "city": "Oslo" })
            .exists("address", true)
            .build();
        assert_eq!(filter, doc! { "address": { "$exists": true } });
    }

    #[test]
    fn test_in_array_and_not_in() {
        let filter = FilterBuilder::new()
            .in_array("status", vec!["active", "pending"])
            .not_in("role", vec!["guest"])
            .build();

        assert_eq!(
            filter,
            doc! {
                "status": { "$in": ["active", "pending"] },
                "role": { "$nin": ["guest"] },
            }
        );
    }

    #[test]
    fn test_regex_and_ne() {
        let filter = FilterBuilder::new()
            .regex("email", r"@example\.com$")
            .ne("email", "root@example.com")
            .build();

        let email = filter.get_document("email").unwrap();
        assert_eq!(email.get_str("$regex").unwrap(), r"@example\.com$");
        assert_eq!(email.get_str("$ne").unwrap(), "root@example.com");
    }

    #[test]
    fn test_by_id_and_into_document() {
        let oid = ObjectId::new();
        let filter: Document = FilterBuilder::new().by_id(oid).into();
        assert_eq!(filter, by_id(oid));
        assert!(FilterBuilder::from_doc(all()).is_empty());
    }
}
