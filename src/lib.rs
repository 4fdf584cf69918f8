//! # mogo
//!
//! A thin, typed object-document mapper over the official MongoDB driver.
//!
//! mogo provides:
//! - Collection names derived from your type names (`OrderItem` becomes
//!   `order_item`), or set explicitly
//! - Indexes declared on the model and ensured on first use
//! - `create` / `get` / `update` / `delete` with automatic `_id` handling
//! - A fluent query builder with OR clauses, projection, sorting and
//!   pagination
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mogo::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize, Model)]
//! #[mogo(index(keys = "email", unique))]
//! pub struct UserAccount {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<ObjectId>,
//!     pub email: String,
//!     pub age: i32,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mogo::MogoError> {
//!     let db = Db::connect("127.0.0.1:27017/app").await?;
//!
//!     let mut user = UserAccount { id: None, email: "a@example.com".into(), age: 30 };
//!     db.create(&mut user).await?;
//!
//!     let adults: Vec<UserAccount> = db
//!         .where_(doc! { "age": { "$gte": 18 } })
//!         .sort("-age")
//!         .paginate(20, 1)
//!         .all()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use mogo_core::*;

// The trait and its derive share a name in different namespaces.
pub use mogo_codegen::Model;
pub use mogo_core::Model;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use mogo_codegen::Model;
    pub use mogo_core::model::Model;
    pub use mogo_core::prelude::*;
}
