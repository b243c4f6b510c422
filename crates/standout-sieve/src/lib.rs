//! Sieve - ORM-style declarative filtering for in-memory collections.
//!
//! Sieve filters ordered collections of heterogeneous items with keyword-style
//! criteria such as `name__icontains` or `priority__gte`, without a database
//! or schema. It supports:
//!
//! - Equality, ordering, identity and membership operators
//! - Case-insensitive and split-based containment
//! - Custom predicates
//! - AND / OR combination of criteria
//! - Set algebra and stable sorting on the filtered collections
//! - Reusable, replayable queries
//!
//! # Quick Start
//!
//! ```rust
//! use standout_sieve::{Attributes, FilterArg, QueryableListObjs, Value, AsValue};
//!
//! struct Task {
//!     name: String,
//!     priority: i32,
//!     tags: Vec<String>,
//! }
//!
//! impl Attributes for Task {
//!     fn attribute(&self, name: &str) -> Option<Value<'_>> {
//!         match name {
//!             "name" => Some(self.name.as_value()),
//!             "priority" => Some(self.priority.as_value()),
//!             "tags" => Some(self.tags.as_value()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let tasks = vec![
//!     Task { name: "Write docs".into(), priority: 3, tags: vec!["docs".into()] },
//!     Task { name: "Fix bug".into(), priority: 5, tags: vec!["code".into(), "urgent".into()] },
//!     Task { name: "Old task".into(), priority: 1, tags: vec![] },
//! ];
//!
//! let list = QueryableListObjs::new(&tasks);
//!
//! let important = list.filter([("priority__gte", 3)]).unwrap();
//! assert_eq!(important.len(), 2);
//!
//! let urgent = list.filter([("tags__contains", "urgent")]).unwrap();
//! assert_eq!(urgent[0].name, "Fix bug");
//!
//! let either = list
//!     .filter_or([
//!         ("name__icontains", FilterArg::from("DOCS")),
//!         ("priority__lt", FilterArg::from(2)),
//!     ])
//!     .unwrap()
//!     .sort_by("priority", true)
//!     .unwrap();
//! assert_eq!(either[0].name, "Write docs");
//! assert_eq!(either[1].name, "Old task");
//! ```
//!
//! # Filter Keys
//!
//! A key is either a bare field name (equality) or `field__operator`. The key
//! is split at its last `__`. Unknown operators are rejected before any item
//! is looked at.
//!
//! | Operator | Matches when the field value... |
//! |----------|---------------------------------|
//! | `eq`, `ne` | equals / does not equal the value |
//! | `ieq`, `ine` | lower-cased, equals / does not equal the value |
//! | `lt`, `lte`, `gt`, `gte` | orders before / after the value |
//! | `is`, `isnot` | is / is not identical to the value |
//! | `isnull` | is null (`true`) or is not null (`false`) |
//! | `in`, `notin` | is / is not a member of the value |
//! | `contains`, `notcontains` | contains / does not contain the value |
//! | `icontains`, `noticontains` | lower-cased, contains / does not contain the value |
//! | `containsAny`, `notcontainsAny` | contains any / none of the values |
//! | `splitcontains`, `splitnotcontains` | split by a delimiter, contains / lacks the target |
//! | `splitcontainsAny`, `splitnotcontainsAny` | split by a delimiter, contains any / none of the targets |
//! | `customMatch` | satisfies a predicate |
//!
//! Values that cannot be tested by an operator (a number under `icontains`,
//! null under `splitcontains`) never raise an error: each operator resolves
//! them to a fixed outcome, documented on [`clause`](crate::Clause). Ordering
//! operators are the exception and report [`SieveError::Incomparable`].
//!
//! # Item Shapes
//!
//! | Collection | Resolver | Items |
//! |------------|----------|-------|
//! | [`QueryableListObjs`] | [`AttributeAccess`] | structs implementing [`Attributes`] |
//! | [`QueryableListDicts`] | [`MappingAccess`] | `serde_json::Value`, `HashMap<String, _>`, ... |
//! | [`QueryableListMixed`] | [`MixedAccess`] | either, mapping view preferred |
//! | [`QueryableList`] | any accessor function | anything |

mod clause;
mod criteria;
mod error;
mod eval;
mod list;
mod op;
mod ordering;
mod query;
mod resolve;
mod value;

// Re-export public API
pub use clause::{Clause, Matcher, Members, Predicate, Split};
pub use criteria::{split_key, Criteria, FilterArg, FilterArgs};
pub use error::{Result, SieveError};
pub use eval::{evaluate, evaluate_with, item_matches, EvalOptions};
pub use list::{QueryableList, QueryableListDicts, QueryableListMixed, QueryableListObjs};
pub use op::{Mode, Op};
pub use ordering::{compare_values, sort_by_field};
pub use query::{QueryBuilder, Step};
pub use resolve::{
    AttributeAccess, Attributes, FieldResolver, MappingAccess, Mixed, MixedAccess, MixedRecord,
    Mapping,
};
pub use value::{AsValue, HashKey, Number, Value};

#[cfg(feature = "derive")]
pub use standout_sieve_macros::Attributes;
