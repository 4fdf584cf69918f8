//! Collection names derived from Rust type names.
//!
//! A model that does not pin its collection name is stored under the
//! snake_case form of its type name, without the module path:
//!
//! ```rust
//! use mogo_core::naming::{camel_to_snake, type_collection_name};
//!
//! assert_eq!(camel_to_snake("TestCollection"), "test_collection");
//! assert_eq!(type_collection_name("app::models::UserProfile"), "user_profile");
//! ```

use convert_case::{Case, Casing};

/// Convert a CamelCase identifier to snake_case.
pub fn camel_to_snake(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    s.to_case(Case::Snake)
}

/// Derive a collection name from a type path as printed by
/// [`std::any::type_name`].
///
/// Reference, pointer, slice and tuple markers are stripped, generic
/// arguments are dropped and only the last path segment is kept. A tuple is
/// named after its first element.
pub fn type_collection_name(type_name: &str) -> String {
    let base = type_name.split('<').next().unwrap_or(type_name);
    let base = base
        .replace("&mut ", "")
        .replace("*const ", "")
        .replace("*mut ", "");
    let cleaned: String = base
        .chars()
        .filter(|c| !matches!(c, '&' | '*' | '[' | ']' | '(' | ')'))
        .collect();
    // `[T; N]` leaves "T; N" behind, `(A, B)` leaves "A, B"
    let cleaned = cleaned.split([';', ',']).next().unwrap_or_default();
    let segment = cleaned.rsplit("::").next().unwrap_or_default().trim();

    camel_to_snake(segment)
}

/// The collection name for `T` based on its type name.
pub fn collection_name_of<T: ?Sized>() -> String {
    type_collection_name(std::any::type_name::<T>())
}
