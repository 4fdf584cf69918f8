//! # mogo-core
//!
//! Document mapping over the official MongoDB driver.
//!
//! This crate provides:
//! - A [`Db`] handle built from a short `host:port/db` URI or a full config
//! - The [`Model`] trait: collection naming, declared indexes and id access
//! - Automatic `_id` assignment on create, replace-and-reload on update
//! - A fluent [`Query`] builder with OR clauses, projection, sorting and
//!   pagination
//! - BSON conversion helpers and a [`FilterBuilder`]
//!
//! Connection pooling, the wire protocol, BSON encoding and cursors all
//! belong to the `mongodb` and `bson` crates.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mogo_core::{Db, doc};
//!
//! let db = Db::connect("127.0.0.1:27017/shop").await?;
//!
//! let mut order = Order { id: None, sku: "A-1".into(), qty: 2 };
//! db.create(&mut order).await?;
//!
//! order.qty = 3;
//! db.update(&mut order).await?;
//!
//! let big: Vec<Order> = db
//!     .where_(doc! { "qty": { "$gte": 3 } })
//!     .sort("-qty")
//!     .limit(10)
//!     .all()
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod filter;
pub mod index;
pub mod logging;
pub mod model;
pub mod naming;
pub mod query;

#[doc(hidden)]
pub use serde;

pub use bson::oid::ObjectId;
pub use bson::{Bson, Document, doc};
pub use client::Db;
pub use config::{MogoConfig, MogoConfigBuilder, ReadPreference, WriteConcern, parse_uri};
pub use document::{IntoObjectId, from_document, to_document};
pub use error::{MogoError, MogoResult};
pub use filter::FilterBuilder;
pub use index::Index;
pub use model::Model;
pub use query::{FindSpec, Query};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::Db;
    pub use crate::config::{MogoConfig, MogoConfigBuilder};
    pub use crate::error::{MogoError, MogoResult};
    pub use crate::filter::FilterBuilder;
    pub use crate::index::Index;
    pub use crate::model::Model;
    pub use crate::query::Query;
    pub use bson::oid::ObjectId;
    pub use bson::{Bson, Document, doc};
}
