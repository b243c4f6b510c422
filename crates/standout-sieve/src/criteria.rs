//! Filter arguments and their normalization into grouped criteria.
//!
//! Filters are written as keyword-style pairs: `field` or `field__operator`
//! mapped to a value. [`Criteria::parse`] splits every key, validates the
//! value's shape for its operator and preprocesses it once (lower-casing,
//! member sets, split pairs) so the evaluator never repeats that work per item.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::clause::{Clause, Matcher, Members, Predicate, Split};
use crate::error::{Result, SieveError};
use crate::op::Op;
use crate::value::Value;

/// Splits a filter key on its last `__` separator.
static FILTER_PARAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<field>.+)__(?P<op>.+)$").expect("filter key pattern is valid")
});

/// Splits a filter key into field name and operator.
///
/// The split happens at the last `__`, so `a__b__eq` is field `a__b` with
/// operator `eq`. Keys without a separator default to `eq`.
///
/// ```
/// use standout_sieve::{split_key, Op};
///
/// assert_eq!(split_key("name").unwrap(), ("name".to_string(), Op::Eq));
/// assert_eq!(split_key("name__icontains").unwrap(), ("name".to_string(), Op::IContains));
/// assert_eq!(split_key("a__b__gt").unwrap(), ("a__b".to_string(), Op::Gt));
/// assert!(split_key("name__startswith").is_err());
/// ```
pub fn split_key(key: &str) -> Result<(String, Op)> {
    match FILTER_PARAM_RE.captures(key) {
        Some(caps) => {
            let op = caps["op"].parse::<Op>()?;
            Ok((caps["field"].to_string(), op))
        }
        None => Ok((key.to_string(), Op::Eq)),
    }
}

/// Value side of a filter argument.
#[derive(Debug, Clone)]
pub enum FilterArg {
    /// A plain value.
    Value(Value<'static>),
    /// A predicate, only valid for `customMatch`.
    Predicate(Predicate),
}

impl FilterArg {
    /// Wraps a closure as a `customMatch` argument.
    pub fn predicate(f: impl Fn(&Value<'_>) -> bool + Send + Sync + 'static) -> Self {
        FilterArg::Predicate(Predicate::new(f))
    }
}

impl From<Value<'static>> for FilterArg {
    fn from(value: Value<'static>) -> Self {
        FilterArg::Value(value)
    }
}

impl From<Predicate> for FilterArg {
    fn from(predicate: Predicate) -> Self {
        FilterArg::Predicate(predicate)
    }
}

impl From<&str> for FilterArg {
    fn from(s: &str) -> Self {
        FilterArg::Value(Value::from(s.to_string()))
    }
}

impl From<serde_json::Value> for FilterArg {
    fn from(json: serde_json::Value) -> Self {
        FilterArg::Value(Value::from(json))
    }
}

impl<T: Into<Value<'static>>> From<Option<T>> for FilterArg {
    fn from(value: Option<T>) -> Self {
        FilterArg::Value(value.into())
    }
}

impl<T: Into<Value<'static>>> From<Vec<T>> for FilterArg {
    fn from(items: Vec<T>) -> Self {
        FilterArg::Value(items.into())
    }
}

impl<T: Into<Value<'static>>, const N: usize> From<[T; N]> for FilterArg {
    fn from(items: [T; N]) -> Self {
        FilterArg::Value(items.into())
    }
}

impl<A: Into<Value<'static>>, B: Into<Value<'static>>> From<(A, B)> for FilterArg {
    fn from(pair: (A, B)) -> Self {
        FilterArg::Value(pair.into())
    }
}

macro_rules! filter_arg_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FilterArg {
                fn from(value: $t) -> Self {
                    FilterArg::Value(Value::from(value))
                }
            }
        )*
    };
}

filter_arg_from!(
    String, bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64
);

/// Ordered `key -> value` filter arguments.
///
/// # Example
///
/// ```
/// use standout_sieve::{FilterArgs, FilterArg};
///
/// let args = FilterArgs::new()
///     .arg("name__icontains", "DOC")
///     .arg("priority__gte", 3)
///     .arg("title__customMatch", FilterArg::predicate(|v| v.as_str().is_some()));
/// assert_eq!(args.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterArgs {
    entries: Vec<(String, FilterArg)>,
}

impl FilterArgs {
    /// Creates empty arguments.
    pub fn new() -> Self {
        FilterArgs::default()
    }

    /// Adds an argument, builder style.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<FilterArg>) -> Self {
        self.push(key, value);
        self
    }

    /// Adds an argument.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<FilterArg>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Iterates over the arguments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterArg)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<FilterArg>> FromIterator<(K, V)> for FilterArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FilterArgs {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<FilterArg>, const N: usize> From<[(K, V); N]> for FilterArgs {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<&FilterArgs> for FilterArgs {
    fn from(args: &FilterArgs) -> Self {
        args.clone()
    }
}

/// Builds [`FilterArgs`] from `key => value` pairs.
///
/// ```
/// use standout_sieve::filter_args;
///
/// let args = filter_args! { "a" => "one", "n__gt" => 3 };
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! filter_args {
    () => { $crate::FilterArgs::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::FilterArgs::new()$(.arg($key, $value))+
    };
}

/// Normalized criteria grouped by operator.
///
/// Every operator that owns a group is present, possibly empty. Within a
/// group, clauses keep the order they were given in.
#[derive(Debug, Clone)]
pub struct Criteria {
    groups: BTreeMap<Op, Vec<Clause>>,
}

impl Default for Criteria {
    fn default() -> Self {
        Criteria {
            groups: Op::ALL
                .into_iter()
                .filter(|op| op.has_group())
                .map(|op| (op, Vec::new()))
                .collect(),
        }
    }
}

impl Criteria {
    /// Creates empty criteria.
    pub fn new() -> Self {
        Criteria::default()
    }

    /// Normalizes filter arguments.
    ///
    /// Fails on the first unknown operator or malformed value; nothing is
    /// partially applied.
    pub fn parse(args: &FilterArgs) -> Result<Criteria> {
        let mut criteria = Criteria::new();
        for (key, arg) in args.iter() {
            let (field, op) = split_key(key)?;
            let matcher = normalize(key, op, arg)?;
            trace!(key, field = %field, op = %matcher.op(), "normalized criterion");
            criteria.push(Clause::new(field, matcher));
        }
        debug!(criteria = criteria.len(), "normalized filter arguments");
        Ok(criteria)
    }

    /// Adds a clause to its operator group.
    pub fn push(&mut self, clause: Clause) {
        self.groups.entry(clause.op()).or_default().push(clause);
    }

    /// Clauses of one operator group.
    pub fn group(&self, op: Op) -> &[Clause] {
        self.groups.get(&op).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All clauses in evaluation order: group by group, then insertion order.
    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.groups.values().flatten()
    }

    /// Total number of clauses.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Returns `true` if there are no clauses.
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }
}

impl TryFrom<&FilterArgs> for Criteria {
    type Error = SieveError;

    fn try_from(args: &FilterArgs) -> Result<Self> {
        Criteria::parse(args)
    }
}

impl TryFrom<FilterArgs> for Criteria {
    type Error = SieveError;

    fn try_from(args: FilterArgs) -> Result<Self> {
        Criteria::parse(&args)
    }
}

fn normalize(key: &str, op: Op, arg: &FilterArg) -> Result<Matcher> {
    let value = match arg {
        FilterArg::Value(value) => value.clone(),
        FilterArg::Predicate(p) if op == Op::CustomMatch => return Ok(Matcher::CustomMatch(p.clone())),
        FilterArg::Predicate(_) => {
            return Err(SieveError::invalid(
                key,
                format!("a predicate is only valid for customMatch, not {op}"),
            ));
        }
    };

    let matcher = match op {
        Op::IsNull => match value.as_bool() {
            Some(true) => Matcher::Is(Value::Null),
            Some(false) => Matcher::IsNot(Value::Null),
            None => {
                return Err(SieveError::invalid(
                    key,
                    format!("isnull requires a boolean, got {}", value.type_name()),
                ));
            }
        },
        Op::Is => Matcher::Is(value),
        Op::IsNot => Matcher::IsNot(value),
        Op::In | Op::NotIn => {
            let type_name = value.type_name();
            let members = Members::from_value(value).ok_or_else(|| {
                SieveError::invalid(key, format!("{op} requires a list, string or map, got {type_name}"))
            })?;
            if op == Op::In {
                Matcher::In(members)
            } else {
                Matcher::NotIn(members)
            }
        }
        Op::Eq => Matcher::Eq(value),
        Op::Ne => Matcher::Ne(value),
        Op::Lt => Matcher::Lt(value),
        Op::Lte => Matcher::Lte(value),
        Op::Gt => Matcher::Gt(value),
        Op::Gte => Matcher::Gte(value),
        Op::Contains => Matcher::Contains(value),
        Op::NotContains => Matcher::NotContains(value),
        Op::IEq => Matcher::IEq(lowered(key, op, &value)?),
        Op::INe => Matcher::INe(lowered(key, op, &value)?),
        Op::IContains => Matcher::IContains(lowered(key, op, &value)?),
        Op::NotIContains => Matcher::NotIContains(lowered(key, op, &value)?),
        Op::ContainsAny => Matcher::ContainsAny(list(key, op, value)?),
        Op::NotContainsAny => Matcher::NotContainsAny(list(key, op, value)?),
        Op::SplitContains => Matcher::SplitContains(split_pair(key, op, value)?),
        Op::SplitNotContains => Matcher::SplitNotContains(split_pair(key, op, value)?),
        Op::SplitContainsAny => Matcher::SplitContainsAny(split_any(key, op, value)?),
        Op::SplitNotContainsAny => Matcher::SplitNotContainsAny(split_any(key, op, value)?),
        Op::CustomMatch => {
            return Err(SieveError::invalid(key, "customMatch requires a predicate"));
        }
    };
    Ok(matcher)
}

fn lowered(key: &str, op: Op, value: &Value<'_>) -> Result<String> {
    value.to_lowercase().ok_or_else(|| {
        SieveError::invalid(key, format!("{op} requires a string, got {}", value.type_name()))
    })
}

fn list(key: &str, op: Op, value: Value<'static>) -> Result<Vec<Value<'static>>> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(SieveError::invalid(
            key,
            format!("{op} requires a list, got {}", other.type_name()),
        )),
    }
}

fn split_pair(key: &str, op: Op, value: Value<'static>) -> Result<Split<Value<'static>>> {
    match value {
        Value::List(items) if items.len() == 2 => {
            let mut items = items.into_iter();
            let delimiter = items.next().unwrap_or_default();
            let target = items.next().unwrap_or_default();
            Ok(Split { delimiter, target })
        }
        other => Err(SieveError::invalid(
            key,
            format!(
                "{op} requires a (delimiter, target) pair, got {}",
                describe_shape(&other)
            ),
        )),
    }
}

fn split_any(key: &str, op: Op, value: Value<'static>) -> Result<Split<Vec<Value<'static>>>> {
    let Split { delimiter, target } = split_pair(key, op, value)?;
    let target = list(key, op, target)?;
    Ok(Split { delimiter, target })
}

fn describe_shape(value: &Value<'_>) -> String {
    match value {
        Value::List(items) => format!("a list of {} elements", items.len()),
        other => other.type_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: FilterArgs) -> Result<Criteria> {
        Criteria::parse(&args)
    }

    #[test]
    fn split_key_defaults_to_eq() {
        assert_eq!(split_key("name").unwrap(), ("name".into(), Op::Eq));
        assert_eq!(split_key("__eq").unwrap(), ("__eq".into(), Op::Eq));
        assert_eq!(split_key("snake_case").unwrap(), ("snake_case".into(), Op::Eq));
    }

    #[test]
    fn split_key_uses_last_separator() {
        assert_eq!(split_key("a__b__ne").unwrap(), ("a__b".into(), Op::Ne));
        assert_eq!(split_key("a___eq").unwrap(), ("a_".into(), Op::Eq));
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let err = split_key("a__b").unwrap_err();
        assert!(matches!(err, SieveError::UnknownOperator { ref op, .. } if op == "b"));
        assert!(err.is_configuration());
    }

    #[test]
    fn every_group_is_present() {
        let criteria = Criteria::new();
        assert!(criteria.is_empty());
        for op in Op::ALL.into_iter().filter(|op| op.has_group()) {
            assert!(criteria.group(op).is_empty());
        }
        assert_eq!(criteria.groups.len(), Op::ALL.len() - 1);
    }

    #[test]
    fn bare_key_is_equality() {
        let criteria = parse(FilterArgs::new().arg("a", "one")).unwrap();
        assert_eq!(criteria.len(), 1);
        let clause = &criteria.group(Op::Eq)[0];
        assert_eq!(clause.field, "a");
        assert!(matches!(&clause.matcher, Matcher::Eq(v) if *v == Value::from("one")));
    }

    #[test]
    fn isnull_rewrites_to_identity() {
        let criteria = parse(
            FilterArgs::new()
                .arg("a__isnull", true)
                .arg("b__isnull", false),
        )
        .unwrap();
        assert!(matches!(&criteria.group(Op::Is)[0].matcher, Matcher::Is(Value::Null)));
        assert!(matches!(&criteria.group(Op::IsNot)[0].matcher, Matcher::IsNot(Value::Null)));
        assert_eq!(criteria.group(Op::Is)[0].field, "a");
    }

    #[test]
    fn isnull_requires_bool() {
        let err = parse(FilterArgs::new().arg("a__isnull", 1)).unwrap_err();
        assert!(matches!(err, SieveError::InvalidArgument { ref key, .. } if key == "a__isnull"));
    }

    #[test]
    fn case_insensitive_values_are_lowered() {
        let criteria = parse(
            FilterArgs::new()
                .arg("a__ieq", "HeLLo")
                .arg("a__noticontains", "WORLD"),
        )
        .unwrap();
        assert!(matches!(&criteria.group(Op::IEq)[0].matcher, Matcher::IEq(s) if s == "hello"));
        assert!(matches!(&criteria.group(Op::NotIContains)[0].matcher, Matcher::NotIContains(s) if s == "world"));
        assert!(parse(FilterArgs::new().arg("a__ine", 3)).is_err());
    }

    #[test]
    fn in_converts_to_set_when_possible() {
        let criteria = parse(
            FilterArgs::new()
                .arg("a__in", vec![1, 2, 3])
                .arg("b__notin", Value::from(vec![Value::from(vec![1]), Value::from(2)]))
                .arg("c__in", "abcdef")
                .arg("d__in", serde_json::json!({"k": 1})),
        )
        .unwrap();
        assert!(matches!(&criteria.group(Op::In)[0].matcher, Matcher::In(m) if m.is_set()));
        assert!(matches!(&criteria.group(Op::NotIn)[0].matcher, Matcher::NotIn(m) if !m.is_set()));
        assert!(matches!(&criteria.group(Op::In)[1].matcher, Matcher::In(m) if m.is_set()));
        assert!(matches!(&criteria.group(Op::In)[2].matcher, Matcher::In(m) if !m.is_set()));
    }

    #[test]
    fn in_requires_a_container() {
        assert!(parse(FilterArgs::new().arg("a__in", 5)).is_err());
        assert!(parse(FilterArgs::new().arg("a__notin", Value::Null)).is_err());
    }

    #[test]
    fn split_requires_a_pair() {
        assert!(parse(FilterArgs::new().arg("a__splitcontains", (" ", "x"))).is_ok());
        assert!(parse(FilterArgs::new().arg("a__splitcontains", "x")).is_err());
        assert!(parse(FilterArgs::new().arg("a__splitcontains", vec!["a", "b", "c"])).is_err());
        assert!(parse(FilterArgs::new().arg("a__splitnotcontains", vec![" "])).is_err());
    }

    #[test]
    fn split_any_requires_a_target_list() {
        let ok = FilterArgs::new().arg("a__splitcontainsAny", (",", vec!["x", "y"]));
        let criteria = parse(ok).unwrap();
        assert!(matches!(
            &criteria.group(Op::SplitContainsAny)[0].matcher,
            Matcher::SplitContainsAny(split) if split.target.len() == 2
        ));
        assert!(parse(FilterArgs::new().arg("a__splitnotcontainsAny", (",", "x"))).is_err());
    }

    #[test]
    fn contains_any_requires_a_list() {
        assert!(parse(FilterArgs::new().arg("a__containsAny", ["x", "y"])).is_ok());
        assert!(parse(FilterArgs::new().arg("a__notcontainsAny", "x")).is_err());
    }

    #[test]
    fn predicates_only_for_custom_match() {
        let pred = FilterArg::predicate(|_| true);
        assert!(parse(FilterArgs::new().arg("a__customMatch", pred.clone())).is_ok());
        assert!(parse(FilterArgs::new().arg("a__eq", pred)).is_err());
        assert!(parse(FilterArgs::new().arg("a__customMatch", 1)).is_err());
    }

    #[test]
    fn failure_applies_nothing() {
        let args = FilterArgs::new().arg("a", 1).arg("b__bogus", 2);
        assert!(parse(args).is_err());
    }

    #[test]
    fn clauses_follow_group_order_then_insertion() {
        let criteria = parse(filter_args! {
            "z__gt" => 1,
            "y" => 2,
            "x__isnull" => true,
            "w" => 3,
        })
        .unwrap();
        let fields: Vec<&str> = criteria.clauses().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["x", "y", "w", "z"]);
    }

    #[test]
    fn filter_args_from_pairs() {
        let args: FilterArgs = [("a", 1), ("b__gt", 2)].into();
        assert_eq!(args.len(), 2);
        let keys: Vec<&str> = args.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b__gt"]);
    }
}
