//! # Core
//!
//! Serde helper types shared across the status list data model. These wrap
//! fields that JSON serializations allow to be either a string or an object
//! (`Kind`), or either a single object or a set (`Quota`).

use serde::{Deserialize, Serialize};

/// `Kind` allows serde to serialize/deserialize a string or an object. For
/// example, a credential `issuer` may be a URI or an object with an `id`
/// property, and a status list credential may be a compact JWT string or a
/// credential object carrying an embedded proof.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Kind<T> {
    /// Simple string value
    String(String),

    /// Complex object value
    Object(T),
}

impl<T: Default> Default for Kind<T> {
    fn default() -> Self {
        Self::String(String::new())
    }
}

/// `Quota` allows serde to serialize/deserialize a single object or a set of
/// objects.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Quota<T> {
    /// Single object
    One(T),

    /// Set of objects
    Many(Vec<T>),
}

impl<T: Default> Default for Quota<T> {
    fn default() -> Self {
        Self::One(T::default())
    }
}
