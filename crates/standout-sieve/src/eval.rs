//! Predicate evaluation.
//!
//! An item is kept under [`Mode::And`] when every clause matches, and under
//! [`Mode::Or`] when at least one does. Clauses are visited group by group in
//! operator order (see [`Op`](crate::Op)), and evaluation of an item stops at
//! the first clause that decides it. Items keep their input order.
//!
//! With no clauses at all, AND keeps every item and OR keeps none.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::criteria::Criteria;
use crate::error::Result;
use crate::op::Mode;
use crate::resolve::FieldResolver;
use crate::value::Value;

/// Options for a single evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalOptions {
    /// Memoize resolved field values per item, so a field referenced by
    /// several clauses is resolved once. Results are the same either way.
    pub cache_fields: bool,
}

impl EvalOptions {
    /// Options with field caching enabled.
    pub fn cached() -> Self {
        EvalOptions { cache_fields: true }
    }
}

/// Filters `items`, returning the ones that satisfy `criteria` under `mode`.
///
/// # Example
///
/// ```
/// use standout_sieve::{evaluate, Criteria, FilterArgs, Mode, Value};
///
/// fn accessor<'a>(n: &'a i64, _field: &str) -> Value<'a> {
///     Value::from(*n)
/// }
///
/// let numbers = [1i64, 5, 10];
/// let criteria = Criteria::parse(&FilterArgs::new().arg("n__gte", 5)).unwrap();
/// let kept = evaluate(&numbers, &criteria, Mode::And, &accessor).unwrap();
/// assert_eq!(kept, vec![&5, &10]);
/// ```
pub fn evaluate<'a, T, R>(
    items: impl IntoIterator<Item = &'a T>,
    criteria: &Criteria,
    mode: Mode,
    resolver: &R,
) -> Result<Vec<&'a T>>
where
    T: ?Sized + 'a,
    R: FieldResolver<T> + ?Sized,
{
    evaluate_with(items, criteria, mode, resolver, EvalOptions::default())
}

/// Like [`evaluate`], with explicit [`EvalOptions`].
pub fn evaluate_with<'a, T, R>(
    items: impl IntoIterator<Item = &'a T>,
    criteria: &Criteria,
    mode: Mode,
    resolver: &R,
    options: EvalOptions,
) -> Result<Vec<&'a T>>
where
    T: ?Sized + 'a,
    R: FieldResolver<T> + ?Sized,
{
    let mut kept = Vec::new();
    let mut total = 0usize;
    for item in items {
        total += 1;
        if item_matches(item, criteria, mode, resolver, options)? {
            kept.push(item);
        }
    }
    trace!(mode = %mode, kept = kept.len(), total, criteria = criteria.len(), "evaluated filter");
    Ok(kept)
}

/// Decides a single item.
pub fn item_matches<T, R>(
    item: &T,
    criteria: &Criteria,
    mode: Mode,
    resolver: &R,
    options: EvalOptions,
) -> Result<bool>
where
    T: ?Sized,
    R: FieldResolver<T> + ?Sized,
{
    let mut cache = FieldCache::new(options.cache_fields);
    for clause in criteria.clauses() {
        let value = cache.resolve(item, &clause.field, resolver);
        let matched = clause.matches(&value, mode)?;
        match mode {
            Mode::And if !matched => return Ok(false),
            Mode::Or if matched => return Ok(true),
            _ => {}
        }
    }
    Ok(mode == Mode::And)
}

/// Per-item memo of resolved fields.
struct FieldCache<'a> {
    enabled: bool,
    entries: Vec<(String, Value<'a>)>,
}

impl<'a> FieldCache<'a> {
    fn new(enabled: bool) -> Self {
        FieldCache {
            enabled,
            entries: Vec::new(),
        }
    }

    fn resolve<T, R>(&mut self, item: &'a T, field: &str, resolver: &R) -> Value<'a>
    where
        T: ?Sized,
        R: FieldResolver<T> + ?Sized,
    {
        if !self.enabled {
            return resolver.resolve(item, field);
        }
        if let Some((_, value)) = self.entries.iter().find(|(name, _)| name == field) {
            return value.clone();
        }
        let value = resolver.resolve(item, field);
        self.entries.push((field.to_string(), value.clone()));
        value
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::criteria::FilterArgs;
    use crate::error::SieveError;
    use serde_json::json;

    fn dict<'a>(item: &'a serde_json::Value, field: &str) -> Value<'a> {
        item.get(field).map(Value::from).unwrap_or_default()
    }

    fn fixture() -> Vec<serde_json::Value> {
        vec![
            json!({"a": "one", "b": "two"}),
            json!({"a": "one", "b": "five"}),
            json!({"a": "six", "c": "eleven"}),
        ]
    }

    fn run(items: &[serde_json::Value], args: FilterArgs, mode: Mode) -> Vec<usize> {
        let criteria = Criteria::parse(&args).unwrap();
        let kept = evaluate(items, &criteria, mode, &dict).unwrap();
        kept.into_iter()
            .map(|k| items.iter().position(|i| std::ptr::eq(i, k)).unwrap())
            .collect()
    }

    #[test]
    fn equality_keeps_order() {
        let items = fixture();
        assert_eq!(run(&items, FilterArgs::new().arg("a", "one"), Mode::And), vec![0, 1]);
        assert_eq!(run(&items, FilterArgs::new().arg("a__ne", "one"), Mode::And), vec![2]);
    }

    #[test]
    fn and_requires_all() {
        let items = fixture();
        let args = FilterArgs::new().arg("a", "one").arg("b", "two");
        assert_eq!(run(&items, args, Mode::And), vec![0]);
    }

    #[test]
    fn or_requires_any() {
        let items = fixture();
        let args = FilterArgs::new().arg("b", "five").arg("c", "eleven");
        assert_eq!(run(&items, args, Mode::Or), vec![1, 2]);
    }

    #[test]
    fn empty_criteria() {
        let items = fixture();
        assert_eq!(run(&items, FilterArgs::new(), Mode::And), vec![0, 1, 2]);
        assert!(run(&items, FilterArgs::new(), Mode::Or).is_empty());
    }

    #[test]
    fn absent_field_is_null() {
        let items = fixture();
        assert_eq!(run(&items, FilterArgs::new().arg("c__isnull", true), Mode::And), vec![0, 1]);
        assert_eq!(run(&items, FilterArgs::new().arg("c__isnull", false), Mode::And), vec![2]);
    }

    #[test]
    fn contains_on_null_excludes() {
        let items = fixture();
        assert_eq!(run(&items, FilterArgs::new().arg("c__contains", "lev"), Mode::And), vec![2]);
        assert_eq!(run(&items, FilterArgs::new().arg("c__notcontainsAny", vec!["lev"]), Mode::And), vec![0, 1]);
    }

    #[test]
    fn ine_policy_differs_by_mode() {
        let items = fixture();
        let args = || FilterArgs::new().arg("c__ine", "ELEVEN");
        assert_eq!(run(&items, args(), Mode::And), vec![0, 1]);
        assert!(run(&items, args(), Mode::Or).is_empty());
    }

    #[test]
    fn and_short_circuits_before_erroring_clause() {
        let items = vec![json!({"a": "x", "n": null})];
        // `is` is evaluated before `gt`, so the failing identity check decides first
        let args = FilterArgs::new().arg("n__gt", 1).arg("a__is", "y");
        assert!(run(&items, args, Mode::And).is_empty());
    }

    #[test]
    fn ordering_on_null_errors() {
        let items = vec![json!({"n": null})];
        let criteria = Criteria::parse(&FilterArgs::new().arg("n__gt", 1)).unwrap();
        let err = evaluate(&items, &criteria, Mode::And, &dict).unwrap_err();
        assert!(matches!(err, SieveError::Incomparable { .. }));
        assert!(!err.is_configuration());
    }

    struct Counting {
        calls: Cell<usize>,
    }

    impl FieldResolver<serde_json::Value> for Counting {
        fn resolve<'a>(&self, item: &'a serde_json::Value, field: &str) -> Value<'a> {
            self.calls.set(self.calls.get() + 1);
            dict(item, field)
        }
    }

    #[test]
    fn cache_resolves_each_field_once() {
        let counting = Counting { calls: Cell::new(0) };
        let items = vec![json!({"a": "one"})];
        let args = FilterArgs::new()
            .arg("a__ne", "two")
            .arg("a__contains", "o")
            .arg("a__icontains", "N");
        let criteria = Criteria::parse(&args).unwrap();

        let cached = evaluate_with(&items, &criteria, Mode::And, &counting, EvalOptions::cached()).unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(counting.calls.get(), 1);

        counting.calls.set(0);
        let uncached = evaluate(&items, &criteria, Mode::And, &counting).unwrap();
        assert_eq!(uncached, cached);
        assert_eq!(counting.calls.get(), 3);
    }

    #[test]
    fn options_serde() {
        let opts: EvalOptions = serde_json::from_str(r#"{"cache_fields": true}"#).unwrap();
        assert_eq!(opts, EvalOptions::cached());
        let defaults: EvalOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, EvalOptions::default());
    }
}
