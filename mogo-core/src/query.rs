//! Fluent query building.
//!
//! A query collects filter clauses, a projection, sort keys and pagination,
//! and only picks its model type at the terminal call:
//!
//! ```rust,ignore
//! use mogo::prelude::*;
//!
//! let page: Vec<User> = db
//!     .where_(doc! { "status": "active" })
//!     .or(doc! { "role": "admin" })
//!     .select(doc! { "name": 1, "email": 1 })
//!     .sort("-created_at,name")
//!     .paginate(20, 3)
//!     .all()
//!     .await?;
//! ```

use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::Cursor;
use mongodb::options::{CountOptions, FindOneOptions, FindOptions};
use tracing::debug;

use crate::client::Db;
use crate::error::{MogoError, MogoResult};
use crate::index::parse_key;
use crate::model::Model;

/// Everything a query has accumulated, independent of any connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindSpec {
    /// Filter clauses; more than one are OR-ed together.
    pub clauses: Vec<Document>,
    /// Field projection.
    pub projection: Option<Document>,
    /// Sort keys with direction (1 or -1), in order.
    pub sort: Vec<(String, i32)>,
    /// Documents to skip.
    pub skip: Option<u64>,
    /// Maximum documents to return.
    pub limit: Option<u64>,
}

impl FindSpec {
    /// Create an empty spec, matching every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// The filter document: `{}` with no clauses, the clause itself with
    /// one, `{"$or": [...]}` otherwise.
    pub fn filter(&self) -> Document {
        match self.clauses.as_slice() {
            [] => Document::new(),
            [only] => only.clone(),
            clauses => {
                let clauses: Vec<Bson> = clauses.iter().cloned().map(Bson::Document).collect();
                doc! { "$or": clauses }
            }
        }
    }

    /// The sort document, if any keys were given.
    pub fn sort_document(&self) -> Option<Document> {
        if self.sort.is_empty() {
            return None;
        }
        let mut sort = Document::new();
        for (field, direction) in &self.sort {
            sort.insert(field.clone(), *direction);
        }
        Some(sort)
    }

    /// Options for a multi-document find.
    pub fn find_options(&self) -> FindOptions {
        let mut options = FindOptions::default();
        options.projection = self.projection.clone();
        options.sort = self.sort_document();
        options.skip = self.skip;
        options.limit = self.limit.map(|n| i64::try_from(n).unwrap_or(i64::MAX));
        options
    }

    /// Options for a single-document find.
    pub fn find_one_options(&self) -> FindOneOptions {
        let mut options = FindOneOptions::default();
        options.projection = self.projection.clone();
        options.sort = self.sort_document();
        options.skip = self.skip;
        options
    }

    /// Options for counting; skip and limit apply to the count.
    pub fn count_options(&self) -> CountOptions {
        let mut options = CountOptions::default();
        options.skip = self.skip;
        options.limit = self.limit;
        options
    }

    fn push_sort(&mut self, spec: &str) {
        for key in spec.split(',') {
            let (field, direction) = parse_key(key);
            if !field.is_empty() {
                self.sort.push((field.to_string(), direction));
            }
        }
    }
}

/// A query bound to a database handle.
#[derive(Clone)]
pub struct Query<'a> {
    db: &'a Db,
    spec: FindSpec,
}

impl<'a> Query<'a> {
    pub(crate) fn new(db: &'a Db) -> Self {
        Self {
            db,
            spec: FindSpec::new(),
        }
    }

    /// Add an alternative filter clause (`$or`).
    pub fn or(mut self, filter: impl Into<Document>) -> Self {
        self.spec.clauses.push(filter.into());
        self
    }

    /// Restrict the returned fields. Replaces an earlier projection.
    pub fn select(mut self, projection: Document) -> Self {
        self.spec.projection = Some(projection);
        self
    }

    /// Append sort keys: comma-separated field names, `-field` for
    /// descending.
    pub fn sort(mut self, spec: &str) -> Self {
        self.spec.push_sort(spec);
        self
    }

    /// Return page `page` (1-based) of `limit` documents. Page 0 is treated
    /// as page 1.
    pub fn paginate(mut self, limit: u64, page: u64) -> Self {
        let page = page.max(1);
        self.spec.limit = Some(limit);
        self.spec.skip = Some((page - 1).saturating_mul(limit));
        self
    }

    /// Return at most `limit` documents from the start.
    pub fn limit(mut self, limit: u64) -> Self {
        self.spec.limit = Some(limit);
        self.spec.skip = Some(0);
        self
    }

    /// The accumulated query parts.
    pub fn spec(&self) -> &FindSpec {
        &self.spec
    }

    /// The filter document this query sends.
    pub fn filter(&self) -> Document {
        self.spec.filter()
    }

    /// The find options this query sends.
    pub fn find_options(&self) -> FindOptions {
        self.spec.find_options()
    }

    /// The options `one` and `optional` send.
    pub fn find_one_options(&self) -> FindOneOptions {
        self.spec.find_one_options()
    }

    /// The options `count` sends.
    pub fn count_options(&self) -> CountOptions {
        self.spec.count_options()
    }

    /// The first matching model, or [`MogoError::NotFound`].
    pub async fn one<T: Model>(&self) -> MogoResult<T> {
        self.optional::<T>().await?.ok_or_else(|| {
            MogoError::not_found(format!("{} matching {}", T::collection_name(), self.filter()))
        })
    }

    /// The first matching model, if any.
    pub async fn optional<T: Model>(&self) -> MogoResult<Option<T>> {
        let collection = self.db.collection::<T>().await?;
        let filter = self.filter();
        debug!(collection = %T::collection_name(), filter = %filter, "Executing find_one");

        let found = collection
            .find_one(filter, self.find_one_options())
            .await?;
        Ok(found)
    }

    /// Every matching model.
    pub async fn all<T: Model>(&self) -> MogoResult<Vec<T>> {
        let cursor = self.cursor::<T>().await?;
        let models: Vec<T> = cursor.try_collect().await?;
        Ok(models)
    }

    /// Count matching documents, honouring skip and limit.
    pub async fn count<T: Model>(&self) -> MogoResult<u64> {
        let collection = self.db.collection::<T>().await?;
        let filter = self.filter();
        debug!(collection = %T::collection_name(), filter = %filter, "Executing count");

        let count = collection
            .count_documents(filter, self.count_options())
            .await?;
        Ok(count)
    }

    /// The driver cursor for this query, for streaming or anything the
    /// builder does not cover.
    pub async fn cursor<T: Model>(&self) -> MogoResult<Cursor<T>> {
        let collection = self.db.collection::<T>().await?;
        let filter = self.filter();
        debug!(collection = %T::collection_name(), filter = %filter, "Executing find");

        let cursor = collection.find(filter, self.find_options()).await?;
        Ok(cursor)
    }
}
