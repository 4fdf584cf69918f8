//! Procedural macros for mogo.
//!
//! This crate provides `#[derive(Model)]`, which implements `mogo::Model`
//! for a struct: its collection name, declared indexes and `_id` access.
//!
//! # Example
//!
//! ```rust,ignore
//! use mogo::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize, Model)]
//! #[mogo(collection = "users")]
//! #[mogo(index(keys = "email", unique))]
//! struct User {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     id: Option<ObjectId>,
//!     email: String,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod derive;

/// Derive macro implementing `mogo::Model`.
///
/// # Attributes
///
/// ## Struct-level
/// - `#[mogo(collection = "name")]` - Use a fixed collection name instead of
///   the snake_cased type name
/// - `#[mogo(index(keys = "a,-b", unique, sparse, background, name = "n",
///   expire_after_secs = 60))]` - Declare an index; repeatable
///
/// ## Field-level
/// - `#[mogo(id)]` - Mark the field holding `_id`
///
/// Without `#[mogo(id)]`, a field named `id` or `_id` is used. The id field
/// must be `ObjectId` or `Option<ObjectId>` and, unless it is literally
/// named `_id`, carry `#[serde(rename = "_id")]`. A struct without an id
/// field never gets one assigned.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize, mogo::Model)]
/// #[mogo(index(keys = "-created_at"))]
/// #[mogo(index(keys = "session", expire_after_secs = 3600))]
/// struct LoginEvent {
///     #[mogo(id)]
///     #[serde(rename = "_id")]
///     key: ObjectId,
///     session: String,
///     created_at: bson::DateTime,
/// }
/// ```
#[proc_macro_derive(Model, attributes(mogo))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive::derive_model_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
