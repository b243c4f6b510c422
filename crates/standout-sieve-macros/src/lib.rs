//! Derive macros for standout-sieve.
//!
//! - [`Attributes`] - attribute-style field access for plain structs, so they
//!   can be filtered in a `QueryableListObjs`.

mod attrs;
mod derive;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `standout_sieve::Attributes` for a struct with named fields.
///
/// Every named field is exposed under its own name unless marked otherwise.
/// Field types must implement `standout_sieve::AsValue` (strings, numbers,
/// bools, options, vectors, string-keyed maps, `serde_json::Value`).
/// On generic structs, every exposed field whose type uses a type parameter
/// gets a `FieldType: AsValue` bound on the generated impl.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `skip` | Leave the field out; it resolves as absent |
/// | `rename = "..."` | Use a custom name in filter keys |
///
/// # Generated Code
///
/// 1. Field name constants (e.g., `Task::NAME`, `Task::PRIORITY`)
/// 2. Implementation of `Attributes::attribute()`
///
/// # Example
///
/// ```ignore
/// use standout_sieve::{Attributes, QueryableListObjs};
///
/// #[derive(Attributes)]
/// struct Task {
///     name: String,
///     priority: u8,
///     #[sieve(rename = "isDone")]
///     done: bool,
///     #[sieve(skip)]
///     internal_id: u64,
/// }
///
/// let tasks = vec![
///     Task { name: "Write docs".into(), priority: 3, done: false, internal_id: 1 },
///     Task { name: "Fix bug".into(), priority: 5, done: true, internal_id: 2 },
/// ];
///
/// let list = QueryableListObjs::new(&tasks);
/// let open = list
///     .filter([(format!("{}__gte", Task::PRIORITY), 3)])
///     .unwrap()
///     .filter([(Task::IS_DONE, false)])
///     .unwrap();
/// assert_eq!(open.len(), 1);
/// assert_eq!(open[0].name, "Write docs");
/// ```
#[proc_macro_derive(Attributes, attributes(sieve))]
pub fn attributes_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::attributes_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
