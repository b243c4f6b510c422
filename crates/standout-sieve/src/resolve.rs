//! Field resolution for the different item shapes.
//!
//! The evaluator never inspects items itself. It asks a [`FieldResolver`] for
//! the value of a field, and the resolver decides how: attribute-style access
//! on structs ([`AttributeAccess`]), key lookup on mappings
//! ([`MappingAccess`]), or mapping-first with attribute fallback
//! ([`MixedAccess`]). Plain accessor functions work as resolvers too.
//!
//! # Example
//!
//! ```
//! use standout_sieve::{Attributes, FieldResolver, AttributeAccess, Value};
//!
//! struct Task {
//!     name: String,
//! }
//!
//! impl Attributes for Task {
//!     fn attribute(&self, name: &str) -> Option<Value<'_>> {
//!         match name {
//!             "name" => Some(Value::from(self.name.as_str())),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let task = Task { name: "Write docs".into() };
//! assert_eq!(AttributeAccess.resolve(&task, "name"), Value::from("Write docs"));
//! assert_eq!(AttributeAccess.resolve(&task, "missing"), Value::Null);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::value::{AsValue, Value};

/// Maps `(item, field name)` to the field's value.
///
/// Absent fields resolve to [`Value::Null`]. Implementations must be
/// deterministic and free of side effects.
pub trait FieldResolver<T: ?Sized> {
    /// Returns the value of `field` on `item`.
    fn resolve<'a>(&self, item: &'a T, field: &str) -> Value<'a>;

    /// Name of the collection kind using this resolver, shown by `Debug`.
    fn collection_name(&self) -> &'static str {
        "QueryableList"
    }
}

impl<T: ?Sized, F> FieldResolver<T> for F
where
    F: for<'a> Fn(&'a T, &str) -> Value<'a>,
{
    fn resolve<'a>(&self, item: &'a T, field: &str) -> Value<'a> {
        self(item, field)
    }
}

/// Attribute-style field access, usually derived with
/// `#[derive(Attributes)]`.
pub trait Attributes {
    /// Returns the named attribute, or `None` if the item has no such
    /// attribute.
    fn attribute(&self, name: &str) -> Option<Value<'_>>;
}

/// Key lookup on mapping-like items.
pub trait Mapping {
    /// Returns the value stored under `key`, or `None` if the key is absent.
    fn get_key(&self, key: &str) -> Option<Value<'_>>;
}

/// An item that may be a mapping, may have attributes, or both.
///
/// [`MixedAccess`] prefers the mapping view and falls back to attributes.
pub trait MixedRecord {
    /// Mapping view of this item, if it is a mapping.
    fn as_mapping(&self) -> Option<&dyn Mapping> {
        None
    }

    /// Attribute view of this item, if it has attributes.
    fn as_attributes(&self) -> Option<&dyn Attributes> {
        None
    }
}

/// Resolver for items implementing [`Attributes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeAccess;

/// Resolver for items implementing [`Mapping`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingAccess;

/// Resolver for items implementing [`MixedRecord`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MixedAccess;

impl<T: Attributes + ?Sized> FieldResolver<T> for AttributeAccess {
    fn resolve<'a>(&self, item: &'a T, field: &str) -> Value<'a> {
        item.attribute(field).unwrap_or_default()
    }

    fn collection_name(&self) -> &'static str {
        "QueryableListObjs"
    }
}

impl<T: Mapping + ?Sized> FieldResolver<T> for MappingAccess {
    fn resolve<'a>(&self, item: &'a T, field: &str) -> Value<'a> {
        item.get_key(field).unwrap_or_default()
    }

    fn collection_name(&self) -> &'static str {
        "QueryableListDicts"
    }
}

impl<T: MixedRecord + ?Sized> FieldResolver<T> for MixedAccess {
    fn resolve<'a>(&self, item: &'a T, field: &str) -> Value<'a> {
        if let Some(mapping) = item.as_mapping() {
            return mapping.get_key(field).unwrap_or_default();
        }
        item.as_attributes()
            .and_then(|attrs| attrs.attribute(field))
            .unwrap_or_default()
    }

    fn collection_name(&self) -> &'static str {
        "QueryableListMixed"
    }
}

impl<T: Attributes + ?Sized> Attributes for &T {
    fn attribute(&self, name: &str) -> Option<Value<'_>> {
        (**self).attribute(name)
    }
}

impl<T: Attributes + ?Sized> Attributes for Box<T> {
    fn attribute(&self, name: &str) -> Option<Value<'_>> {
        (**self).attribute(name)
    }
}

impl<T: Mapping + ?Sized> Mapping for &T {
    fn get_key(&self, key: &str) -> Option<Value<'_>> {
        (**self).get_key(key)
    }
}

impl<T: Mapping + ?Sized> Mapping for Box<T> {
    fn get_key(&self, key: &str) -> Option<Value<'_>> {
        (**self).get_key(key)
    }
}

impl<T: MixedRecord + ?Sized> MixedRecord for &T {
    fn as_mapping(&self) -> Option<&dyn Mapping> {
        (**self).as_mapping()
    }

    fn as_attributes(&self) -> Option<&dyn Attributes> {
        (**self).as_attributes()
    }
}

impl<V: AsValue, S: BuildHasher> Mapping for HashMap<String, V, S> {
    fn get_key(&self, key: &str) -> Option<Value<'_>> {
        self.get(key).map(AsValue::as_value)
    }
}

impl<V: AsValue> Mapping for BTreeMap<String, V> {
    fn get_key(&self, key: &str) -> Option<Value<'_>> {
        self.get(key).map(AsValue::as_value)
    }
}

impl Mapping for serde_json::Map<String, serde_json::Value> {
    fn get_key(&self, key: &str) -> Option<Value<'_>> {
        self.get(key).map(Value::from)
    }
}

/// Only JSON objects have keys; every other JSON value resolves to null.
impl Mapping for serde_json::Value {
    fn get_key(&self, key: &str) -> Option<Value<'_>> {
        self.as_object().and_then(|map| map.get_key(key))
    }
}

impl<V: AsValue, S: BuildHasher> MixedRecord for HashMap<String, V, S> {
    fn as_mapping(&self) -> Option<&dyn Mapping> {
        Some(self)
    }
}

impl<V: AsValue> MixedRecord for BTreeMap<String, V> {
    fn as_mapping(&self) -> Option<&dyn Mapping> {
        Some(self)
    }
}

impl MixedRecord for serde_json::Map<String, serde_json::Value> {
    fn as_mapping(&self) -> Option<&dyn Mapping> {
        Some(self)
    }
}

impl MixedRecord for serde_json::Value {
    fn as_mapping(&self) -> Option<&dyn Mapping> {
        self.as_object().map(|map| map as &dyn Mapping)
    }
}

/// Either an attribute-style object or a mapping, for heterogeneous
/// collections.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use standout_sieve::{Attributes, Mixed, MixedAccess, FieldResolver, Value};
///
/// struct Point { x: i64 }
///
/// impl Attributes for Point {
///     fn attribute(&self, name: &str) -> Option<Value<'_>> {
///         (name == "x").then(|| Value::from(self.x))
///     }
/// }
///
/// let mut map = HashMap::new();
/// map.insert("x".to_string(), 3i64);
///
/// let items: Vec<Mixed<Point, HashMap<String, i64>>> =
///     vec![Mixed::Object(Point { x: 1 }), Mixed::Mapping(map)];
///
/// assert_eq!(MixedAccess.resolve(&items[0], "x"), Value::from(1));
/// assert_eq!(MixedAccess.resolve(&items[1], "x"), Value::from(3));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Mixed<O, M> {
    /// Item resolved through [`Attributes`].
    Object(O),
    /// Item resolved through [`Mapping`].
    Mapping(M),
}

impl<O: Attributes, M: Mapping> MixedRecord for Mixed<O, M> {
    fn as_mapping(&self) -> Option<&dyn Mapping> {
        match self {
            Mixed::Mapping(m) => Some(m),
            Mixed::Object(_) => None,
        }
    }

    fn as_attributes(&self) -> Option<&dyn Attributes> {
        match self {
            Mixed::Object(o) => Some(o),
            Mixed::Mapping(_) => None,
        }
    }
}
