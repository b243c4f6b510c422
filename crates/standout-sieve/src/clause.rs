//! Normalized filter criteria and their per-operator match rules.
//!
//! A [`Clause`] is one `(field, operator, value)` criterion after
//! normalization. The operator and its preprocessed value live together in
//! [`Matcher`], one variant per operator, so evaluation is a single exhaustive
//! match and each arm carries that operator's failure policy.
//!
//! Failure policies, for values that lack the capability an operator needs:
//!
//! | Operator | Missing capability resolves to |
//! |----------|--------------------------------|
//! | `ieq` | no match |
//! | `ine` | match under AND, no match under OR |
//! | `contains`, `icontains`, `containsAny` | no match |
//! | `notcontains`, `noticontains`, `notcontainsAny` | match |
//! | `splitcontains`, `splitcontainsAny` | no match |
//! | `splitnotcontains`, `splitnotcontainsAny` | match |
//! | `lt`, `lte`, `gt`, `gte` | [`SieveError::Incomparable`] |

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SieveError};
use crate::op::{Mode, Op};
use crate::value::{HashKey, Value};

/// A single normalized criterion.
///
/// # Example
///
/// ```
/// use standout_sieve::{Clause, Matcher, Mode, Value};
///
/// let clause = Clause::new("name", Matcher::Eq(Value::from("tim")));
/// assert!(clause.matches(&Value::from("tim"), Mode::And).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Clause {
    /// The field name to resolve on each item.
    pub field: String,
    /// The operator together with its normalized value.
    pub matcher: Matcher,
}

impl Clause {
    /// Creates a new clause.
    pub fn new(field: impl Into<String>, matcher: Matcher) -> Self {
        Clause {
            field: field.into(),
            matcher,
        }
    }

    /// The operator group this clause belongs to.
    pub fn op(&self) -> Op {
        self.matcher.op()
    }

    /// Evaluates this clause against a resolved field value.
    ///
    /// `mode` only matters for operators whose failure policy differs between
    /// AND and OR evaluation.
    pub fn matches(&self, value: &Value<'_>, mode: Mode) -> Result<bool> {
        let matched = match &self.matcher {
            Matcher::Is(target) => value.is_identical(target),
            Matcher::IsNot(target) => !value.is_identical(target),
            Matcher::CustomMatch(predicate) => predicate.call(value),
            Matcher::In(members) => members.contains(value),
            Matcher::NotIn(members) => !members.contains(value),
            Matcher::Eq(target) => value == target,
            Matcher::IEq(target) => match value.to_lowercase() {
                Some(lower) => lower == *target,
                None => false,
            },
            Matcher::Ne(target) => value != target,
            Matcher::INe(target) => match value.to_lowercase() {
                Some(lower) => lower != *target,
                // No lower-case form: never excludes under AND, never includes under OR
                None => mode == Mode::And,
            },
            Matcher::Lt(target) => self.ordered(value, target, |o| o == Ordering::Less)?,
            Matcher::Lte(target) => self.ordered(value, target, |o| o != Ordering::Greater)?,
            Matcher::Gt(target) => self.ordered(value, target, |o| o == Ordering::Greater)?,
            Matcher::Gte(target) => self.ordered(value, target, |o| o != Ordering::Less)?,
            Matcher::Contains(target) => value.contains(target).unwrap_or(false),
            Matcher::IContains(target) => match value.to_lowercase() {
                Some(lower) => lower.contains(target.as_str()),
                None => false,
            },
            // Containment that cannot be tested counts as "does not contain"
            Matcher::NotContains(target) => match value.contains(target) {
                Some(found) => !found,
                None => true,
            },
            Matcher::NotIContains(target) => match value.to_lowercase() {
                Some(lower) => !lower.contains(target.as_str()),
                None => true,
            },
            Matcher::ContainsAny(targets) => {
                !value.is_null() && targets.iter().any(|t| value.contains(t) == Some(true))
            }
            Matcher::NotContainsAny(targets) => {
                value.is_null() || !targets.iter().any(|t| value.contains(t) == Some(true))
            }
            Matcher::SplitContains(split) => match value.split_by(&split.delimiter) {
                Some(parts) => part_matches(&parts, &split.target),
                None => false,
            },
            Matcher::SplitNotContains(split) => match value.split_by(&split.delimiter) {
                Some(parts) => !part_matches(&parts, &split.target),
                None => true,
            },
            Matcher::SplitContainsAny(split) => match value.split_by(&split.delimiter) {
                Some(parts) => split.target.iter().any(|t| part_matches(&parts, t)),
                None => false,
            },
            Matcher::SplitNotContainsAny(split) => match value.split_by(&split.delimiter) {
                Some(parts) => !split.target.iter().any(|t| part_matches(&parts, t)),
                None => true,
            },
        };
        Ok(matched)
    }

    fn ordered(
        &self,
        value: &Value<'_>,
        target: &Value<'_>,
        accept: impl Fn(Ordering) -> bool,
    ) -> Result<bool> {
        if !value.is_comparable_with(target) {
            return Err(SieveError::Incomparable {
                field: self.field.clone(),
                op: self.op().as_str(),
                left: value.type_name(),
                right: target.type_name(),
            });
        }
        // NaN compares false under every ordering operator
        Ok(value.compare(target).is_some_and(accept))
    }
}

fn part_matches(parts: &[&str], target: &Value<'_>) -> bool {
    target.as_str().is_some_and(|t| parts.contains(&t))
}

/// An operator with its normalized comparison value.
///
/// Case-insensitive variants hold their value already lower-cased.
#[derive(Debug, Clone)]
pub enum Matcher {
    Is(Value<'static>),
    IsNot(Value<'static>),
    CustomMatch(Predicate),
    In(Members),
    NotIn(Members),
    Eq(Value<'static>),
    IEq(String),
    Ne(Value<'static>),
    INe(String),
    Lt(Value<'static>),
    Lte(Value<'static>),
    Gt(Value<'static>),
    Gte(Value<'static>),
    Contains(Value<'static>),
    IContains(String),
    NotContains(Value<'static>),
    NotIContains(String),
    ContainsAny(Vec<Value<'static>>),
    NotContainsAny(Vec<Value<'static>>),
    SplitContains(Split<Value<'static>>),
    SplitNotContains(Split<Value<'static>>),
    SplitContainsAny(Split<Vec<Value<'static>>>),
    SplitNotContainsAny(Split<Vec<Value<'static>>>),
}

impl Matcher {
    /// The operator this matcher implements.
    pub fn op(&self) -> Op {
        match self {
            Matcher::Is(_) => Op::Is,
            Matcher::IsNot(_) => Op::IsNot,
            Matcher::CustomMatch(_) => Op::CustomMatch,
            Matcher::In(_) => Op::In,
            Matcher::NotIn(_) => Op::NotIn,
            Matcher::Eq(_) => Op::Eq,
            Matcher::IEq(_) => Op::IEq,
            Matcher::Ne(_) => Op::Ne,
            Matcher::INe(_) => Op::INe,
            Matcher::Lt(_) => Op::Lt,
            Matcher::Lte(_) => Op::Lte,
            Matcher::Gt(_) => Op::Gt,
            Matcher::Gte(_) => Op::Gte,
            Matcher::Contains(_) => Op::Contains,
            Matcher::IContains(_) => Op::IContains,
            Matcher::NotContains(_) => Op::NotContains,
            Matcher::NotIContains(_) => Op::NotIContains,
            Matcher::ContainsAny(_) => Op::ContainsAny,
            Matcher::NotContainsAny(_) => Op::NotContainsAny,
            Matcher::SplitContains(_) => Op::SplitContains,
            Matcher::SplitNotContains(_) => Op::SplitNotContains,
            Matcher::SplitContainsAny(_) => Op::SplitContainsAny,
            Matcher::SplitNotContainsAny(_) => Op::SplitNotContainsAny,
        }
    }
}

/// Argument of the `split*` operators: the delimiter and what to look for
/// among the split parts.
#[derive(Debug, Clone, PartialEq)]
pub struct Split<T> {
    /// String delimiter, or `Null` to split on whitespace.
    pub delimiter: Value<'static>,
    /// A single target, or a list of targets for the `*Any` variants.
    pub target: T,
}

/// Container used by `in` / `notin`.
///
/// Lists whose elements are all hashable become a hashed set, and a string
/// becomes the set of its characters. Other lists and maps keep their
/// original value and answer membership the way the value itself does
/// (linear scan for lists, keys for maps).
#[derive(Debug, Clone)]
pub enum Members {
    /// Hashed set of member keys.
    Set(HashSet<HashKey>),
    /// The original container value.
    Value(Value<'static>),
}

impl Members {
    /// Builds the member container for a normalized `in` / `notin` value.
    ///
    /// Returns `None` if the value is not a container.
    pub fn from_value(value: Value<'static>) -> Option<Self> {
        match value {
            Value::List(items) => match items.iter().map(Value::hash_key).collect() {
                Some(set) => Some(Members::Set(set)),
                None => Some(Members::Value(Value::List(items))),
            },
            Value::String(text) => Some(Members::Set(
                text.chars().map(|c| HashKey::String(c.to_string())).collect(),
            )),
            value @ Value::Map(_) => Some(Members::Value(value)),
            _ => None,
        }
    }

    /// Returns `true` if `value` is a member.
    ///
    /// Values the container cannot test (an unhashable value against a set, a
    /// number against a map's keys) are not members.
    pub fn contains(&self, value: &Value<'_>) -> bool {
        match self {
            Members::Set(set) => value.hash_key().is_some_and(|key| set.contains(&key)),
            Members::Value(container) => container.contains(value).unwrap_or(false),
        }
    }

    /// Returns `true` if this container was converted to a hashed set.
    pub fn is_set(&self) -> bool {
        matches!(self, Members::Set(_))
    }
}

/// Caller-supplied predicate for `customMatch`.
///
/// The predicate receives the resolved field value. It runs uncaught: a
/// panic inside it propagates to the caller.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Value<'_>) -> bool + Send + Sync>);

impl Predicate {
    /// Wraps a closure as a predicate.
    pub fn new(f: impl Fn(&Value<'_>) -> bool + Send + Sync + 'static) -> Self {
        Predicate(Arc::new(f))
    }

    /// Invokes the predicate.
    pub fn call(&self, value: &Value<'_>) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}
