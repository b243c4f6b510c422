//! Runtime value types for field comparison.
//!
//! The [`Value`] enum represents the runtime value of a field extracted from an
//! item. Filter operators are defined in terms of a handful of capabilities a
//! value may or may not have: a lower-case form, a membership test, a split,
//! an ordering. Each capability returns `Option` so operators can apply their
//! own failure policy when the capability is missing.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Runtime value for comparison, usually borrowed from the source item.
///
/// Absent fields are represented as [`Value::Null`]; every operator treats an
/// absent field exactly like a field holding null.
///
/// # Example
///
/// ```
/// use standout_sieve::{Number, Value};
///
/// struct Task {
///     name: String,
///     priority: u8,
/// }
///
/// fn accessor<'a>(task: &'a Task, field: &str) -> Value<'a> {
///     match field {
///         "name" => Value::from(task.name.as_str()),
///         "priority" => Value::Number(Number::from(task.priority)),
///         _ => Value::Null,
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value<'a> {
    /// Null, or a field that is not present.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// String value (borrowed when possible).
    String(Cow<'a, str>),
    /// Ordered list of values.
    List(Vec<Value<'a>>),
    /// String-keyed mapping. Membership tests look at the keys.
    Map(BTreeMap<Cow<'a, str>, Value<'a>>),
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `Null` value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the name of this value's kind, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Detaches this value from the item it was borrowed from.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Null => Value::Null,
            Value::Bool(b) => Value::Bool(b),
            Value::Number(n) => Value::Number(n),
            Value::String(s) => Value::String(Cow::Owned(s.into_owned())),
            Value::List(items) => Value::List(items.into_iter().map(Value::into_owned).collect()),
            Value::Map(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (Cow::Owned(k.into_owned()), v.into_owned()))
                    .collect(),
            ),
        }
    }

    /// Lower-case form of this value. Only strings have one.
    pub fn to_lowercase(&self) -> Option<String> {
        self.as_str().map(str::to_lowercase)
    }

    /// Tests whether `needle` is a member of this value.
    ///
    /// - strings test for a substring (the needle must be a string)
    /// - lists test element equality
    /// - maps test the keys (the needle must be a string)
    ///
    /// Returns `None` when this value does not support a membership test
    /// against `needle`.
    pub fn contains(&self, needle: &Value<'_>) -> Option<bool> {
        match self {
            Value::String(haystack) => needle.as_str().map(|n| haystack.contains(n)),
            Value::List(items) => Some(items.iter().any(|item| item == needle)),
            Value::Map(map) => needle.as_str().map(|key| map.contains_key(key)),
            _ => None,
        }
    }

    /// Splits a string value by `delimiter`.
    ///
    /// A `Null` delimiter splits on runs of whitespace. Returns `None` when
    /// this value is not a string, or the delimiter is empty or not a string.
    pub fn split_by(&self, delimiter: &Value<'_>) -> Option<Vec<&str>> {
        let s = self.as_str()?;
        match delimiter {
            Value::Null => Some(s.split_whitespace().collect()),
            Value::String(d) if !d.is_empty() => Some(s.split(&**d).collect()),
            _ => None,
        }
    }

    /// Identity comparison: same kind and same payload, no numeric coercion.
    ///
    /// `Null` is always identical to `Null`, which is what `isnull` relies on.
    pub fn is_identical(&self, other: &Value<'_>) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.is_identical(*b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_identical(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.is_identical(vb))
            }
            _ => false,
        }
    }

    /// Returns `true` if the ordering operators can compare these two values.
    ///
    /// Numbers compare with numbers, strings with strings, bools with bools
    /// and lists with lists. Everything else, null included, is incomparable.
    pub fn is_comparable_with(&self, other: &Value<'_>) -> bool {
        matches!(
            (self, other),
            (Value::Number(_), Value::Number(_))
                | (Value::String(_), Value::String(_))
                | (Value::Bool(_), Value::Bool(_))
                | (Value::List(_), Value::List(_))
        )
    }

    /// Compares two values of the same ordered kind.
    ///
    /// Returns `None` if the kinds differ or a NaN is involved.
    pub fn compare(&self, other: &Value<'_>) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.compare(*b),
            (Value::String(a), Value::String(b)) => Some((**a).cmp(&**b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        other => return Some(other),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            _ => None,
        }
    }

    /// Key used to store this value in a hashed member set.
    ///
    /// Lists, maps and NaN have no key.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Null => Some(HashKey::Null),
            Value::Bool(b) => Some(HashKey::Bool(*b)),
            Value::Number(n) => n.hash_key(),
            Value::String(s) => Some(HashKey::String(s.to_string())),
            Value::List(_) | Value::Map(_) => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Hashable projection of a [`Value`], used by `in` / `notin` member sets.
///
/// Numbers that hold an integral value share a key regardless of their
/// representation, so `1`, `1u64` and `1.0` are the same member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Null,
    Bool(bool),
    Int(i128),
    Float(u64),
    String(String),
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point
///
/// Equality and ordering compare by numeric value across variants, so
/// `Number::I64(1) == Number::F64(1.0)`.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::I64(a), Number::U64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            (Number::U64(a), Number::I64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Total order used for sorting; NaN sorts after every other number.
    pub fn total_cmp(self, other: Number) -> Ordering {
        match self.compare(other) {
            Some(ordering) => ordering,
            None => self.to_f64().total_cmp(&other.to_f64()),
        }
    }

    /// Same variant and same bits.
    pub fn is_identical(self, other: Number) -> bool {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => a == b,
            (Number::U64(a), Number::U64(b)) => a == b,
            (Number::F64(a), Number::F64(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }

    fn hash_key(self) -> Option<HashKey> {
        match self {
            Number::I64(n) => Some(HashKey::Int(i128::from(n))),
            Number::U64(n) => Some(HashKey::Int(i128::from(n))),
            Number::F64(f) if f.is_nan() => None,
            Number::F64(f) if f.fract() == 0.0 && f.abs() < 1e36 => Some(HashKey::Int(f as i128)),
            Number::F64(f) => Some(HashKey::Float(f.to_bits())),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.compare(*other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}

macro_rules! number_from {
    ($variant:ident, $target:ty, $($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(n: $t) -> Self {
                    Number::$variant(n as $target)
                }
            }

            impl<'a> From<$t> for Value<'a> {
                fn from(n: $t) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

number_from!(I64, i64, i8, i16, i32, i64, isize);
number_from!(U64, u64, u8, u16, u32, u64, usize);
number_from!(F64, f64, f32, f64);

impl<'a> From<Number> for Value<'a> {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl<'a> From<bool> for Value<'a> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::String(Cow::Borrowed(s))
    }
}

impl<'a> From<String> for Value<'a> {
    fn from(s: String) -> Self {
        Value::String(Cow::Owned(s))
    }
}

impl<'a> From<Cow<'a, str>> for Value<'a> {
    fn from(s: Cow<'a, str>) -> Self {
        Value::String(s)
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<'a, T: Into<Value<'a>>> From<Vec<T>> for Value<'a> {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<'a, T: Into<Value<'a>>, const N: usize> From<[T; N]> for Value<'a> {
    fn from(items: [T; N]) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Pairs become two-element lists, the shape the `split*` operators expect.
impl<'a, A: Into<Value<'a>>, B: Into<Value<'a>>> From<(A, B)> for Value<'a> {
    fn from((a, b): (A, B)) -> Self {
        Value::List(vec![a.into(), b.into()])
    }
}

impl<'a> From<&'a serde_json::Value> for Value<'a> {
    fn from(json: &'a serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(json_number(n)),
            serde_json::Value::String(s) => Value::String(Cow::Borrowed(s)),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (Cow::Borrowed(k.as_str()), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value<'static> {
    fn from(json: serde_json::Value) -> Self {
        Value::from(&json).into_owned()
    }
}

fn json_number(n: &serde_json::Number) -> Number {
    if let Some(i) = n.as_i64() {
        Number::I64(i)
    } else if let Some(u) = n.as_u64() {
        Number::U64(u)
    } else {
        Number::F64(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Conversion of a Rust field into a [`Value`] that borrows from it.
///
/// Implemented for strings, numbers, booleans, options, sequences, string-keyed
/// maps and `serde_json::Value`. The `#[derive(Attributes)]` macro requires
/// every exposed field to implement this trait.
pub trait AsValue {
    /// Returns this field as a borrowed value.
    fn as_value(&self) -> Value<'_>;
}

impl AsValue for str {
    fn as_value(&self) -> Value<'_> {
        Value::String(Cow::Borrowed(self))
    }
}

impl AsValue for String {
    fn as_value(&self) -> Value<'_> {
        Value::String(Cow::Borrowed(self))
    }
}

impl AsValue for Cow<'_, str> {
    fn as_value(&self) -> Value<'_> {
        Value::String(Cow::Borrowed(self))
    }
}

impl AsValue for bool {
    fn as_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

macro_rules! number_as_value {
    ($($t:ty),*) => {
        $(
            impl AsValue for $t {
                fn as_value(&self) -> Value<'_> {
                    Value::Number(Number::from(*self))
                }
            }
        )*
    };
}

number_as_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: AsValue> AsValue for Option<T> {
    fn as_value(&self) -> Value<'_> {
        self.as_ref().map_or(Value::Null, AsValue::as_value)
    }
}

impl<T: AsValue> AsValue for [T] {
    fn as_value(&self) -> Value<'_> {
        Value::List(self.iter().map(AsValue::as_value).collect())
    }
}

impl<T: AsValue> AsValue for Vec<T> {
    fn as_value(&self) -> Value<'_> {
        self.as_slice().as_value()
    }
}

impl<T: AsValue, S> AsValue for HashMap<String, T, S> {
    fn as_value(&self) -> Value<'_> {
        Value::Map(
            self.iter()
                .map(|(k, v)| (Cow::Borrowed(k.as_str()), v.as_value()))
                .collect(),
        )
    }
}

impl<T: AsValue> AsValue for BTreeMap<String, T> {
    fn as_value(&self) -> Value<'_> {
        Value::Map(
            self.iter()
                .map(|(k, v)| (Cow::Borrowed(k.as_str()), v.as_value()))
                .collect(),
        )
    }
}

impl AsValue for serde_json::Value {
    fn as_value(&self) -> Value<'_> {
        Value::from(self)
    }
}

impl AsValue for Value<'_> {
    fn as_value(&self) -> Value<'_> {
        self.clone()
    }
}

impl<T: AsValue + ?Sized> AsValue for &T {
    fn as_value(&self) -> Value<'_> {
        (**self).as_value()
    }
}

impl<T: AsValue + ?Sized> AsValue for Box<T> {
    fn as_value(&self) -> Value<'_> {
        (**self).as_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from(true).type_name(), "bool");
        assert_eq!(Value::from(1).type_name(), "number");
        assert_eq!(Value::from("x").type_name(), "string");
        assert_eq!(Value::from(vec![1, 2]).type_name(), "list");
        assert_eq!(Value::Map(BTreeMap::new()).type_name(), "map");
    }

    #[test]
    fn lowercase_only_for_strings() {
        assert_eq!(Value::from("HeLLo").to_lowercase(), Some("hello".to_string()));
        assert_eq!(Value::from(5).to_lowercase(), None);
        assert_eq!(Value::Null.to_lowercase(), None);
        assert_eq!(Value::from(vec!["A"]).to_lowercase(), None);
    }

    #[test]
    fn contains_string_is_substring() {
        let hay = Value::from("cheese burger");
        assert_eq!(hay.contains(&Value::from("se bu")), Some(true));
        assert_eq!(hay.contains(&Value::from("bacon")), Some(false));
        // Non-string needle cannot be tested against a string
        assert_eq!(hay.contains(&Value::from(1)), None);
    }

    #[test]
    fn contains_list_uses_equality() {
        let hay = Value::from(vec![1, 2, 3]);
        assert_eq!(hay.contains(&Value::from(2)), Some(true));
        assert_eq!(hay.contains(&Value::from(2.0)), Some(true));
        assert_eq!(hay.contains(&Value::from(7)), Some(false));
        assert_eq!(hay.contains(&Value::from("2")), Some(false));
    }

    #[test]
    fn contains_map_checks_keys() {
        let json = serde_json::json!({"a": 1, "b": null});
        let hay = Value::from(&json);
        assert_eq!(hay.contains(&Value::from("b")), Some(true));
        assert_eq!(hay.contains(&Value::from("z")), Some(false));
        assert_eq!(hay.contains(&Value::from(1)), None);
    }

    #[test]
    fn contains_unsupported_kinds() {
        assert_eq!(Value::Null.contains(&Value::from("x")), None);
        assert_eq!(Value::from(5).contains(&Value::from(5)), None);
        assert_eq!(Value::from(true).contains(&Value::from(true)), None);
    }

    #[test]
    fn split_by_delimiter() {
        let v = Value::from("puppies rainbows  kittens");
        assert_eq!(
            v.split_by(&Value::from(" ")),
            Some(vec!["puppies", "rainbows", "", "kittens"])
        );
        assert_eq!(
            v.split_by(&Value::Null),
            Some(vec!["puppies", "rainbows", "kittens"])
        );
    }

    #[test]
    fn split_failures() {
        assert_eq!(Value::Null.split_by(&Value::from(" ")), None);
        assert_eq!(Value::from(12).split_by(&Value::from(" ")), None);
        assert_eq!(Value::from("a b").split_by(&Value::from("")), None);
        assert_eq!(Value::from("a b").split_by(&Value::from(3)), None);
    }

    #[test]
    fn identity_has_no_coercion() {
        assert!(Value::Null.is_identical(&Value::Null));
        assert!(Value::from(1).is_identical(&Value::from(1i64)));
        assert!(!Value::from(1).is_identical(&Value::from(1.0)));
        assert!(!Value::from(1).is_identical(&Value::from(1u32)));
        assert!(!Value::from("").is_identical(&Value::Null));
        // Equality does coerce
        assert_eq!(Value::from(1), Value::from(1.0));
    }

    #[test]
    fn comparability() {
        assert!(Value::from(1).is_comparable_with(&Value::from(2.5)));
        assert!(Value::from("a").is_comparable_with(&Value::from("b")));
        assert!(!Value::from("a").is_comparable_with(&Value::from(1)));
        assert!(!Value::Null.is_comparable_with(&Value::from(1)));
        assert!(!Value::Null.is_comparable_with(&Value::Null));
    }

    #[test]
    fn compare_lists_lexicographically() {
        let a = Value::from(vec![1, 2]);
        let b = Value::from(vec![1, 3]);
        let c = Value::from(vec![1, 2, 0]);
        assert_eq!(a.compare(&b), Some(Ordering::Less));
        assert_eq!(a.compare(&c), Some(Ordering::Less));
        assert_eq!(c.compare(&a), Some(Ordering::Greater));
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(Number::I64(5).compare(Number::U64(10)), Some(Ordering::Less));
        assert_eq!(Number::I64(-1).compare(Number::U64(0)), Some(Ordering::Less));
        assert_eq!(Number::I64(5).compare(Number::F64(5.0)), Some(Ordering::Equal));
        assert_eq!(Number::U64(10).compare(Number::F64(5.5)), Some(Ordering::Greater));
    }

    #[test]
    fn number_nan_comparison() {
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
        assert_ne!(Number::F64(f64::NAN), Number::F64(f64::NAN));
        assert_eq!(
            Number::F64(f64::NAN).total_cmp(Number::F64(1.0)),
            Ordering::Greater
        );
    }

    #[test]
    fn hash_keys_unify_integral_numbers() {
        assert_eq!(Value::from(1).hash_key(), Value::from(1.0).hash_key());
        assert_eq!(Value::from(1u8).hash_key(), Value::from(1i64).hash_key());
        assert_ne!(Value::from(1.5).hash_key(), Value::from(1).hash_key());
        assert_eq!(Value::from(f64::NAN).hash_key(), None);
        assert_eq!(Value::from(vec![1]).hash_key(), None);
    }

    #[test]
    fn json_conversion() {
        let json = serde_json::json!({"name": "x", "tags": ["a", "b"], "n": 3, "f": 1.5});
        let value = Value::from(&json);
        let Value::Map(map) = value else {
            panic!("expected map");
        };
        assert_eq!(map.get("name"), Some(&Value::from("x")));
        assert_eq!(map.get("tags"), Some(&Value::from(vec!["a", "b"])));
        assert_eq!(map.get("n"), Some(&Value::from(3)));
        assert_eq!(map.get("f"), Some(&Value::from(1.5)));
    }

    #[test]
    fn as_value_conversions() {
        assert_eq!("x".to_string().as_value(), Value::from("x"));
        assert_eq!(Some(3u8).as_value(), Value::from(3));
        assert_eq!(None::<u8>.as_value(), Value::Null);
        assert_eq!(vec![true, false].as_value(), Value::from(vec![true, false]));
    }

    #[test]
    fn into_owned_preserves_content() {
        let s = String::from("borrowed");
        let v = Value::from(vec![Value::from(s.as_str()), Value::Null]);
        let owned: Value<'static> = v.clone().into_owned();
        assert_eq!(owned, v);
    }

    #[test]
    fn display() {
        assert_eq!(Value::from(vec![Value::from("a"), Value::Null, Value::from(2)]).to_string(), r#"["a", null, 2]"#);
    }
}
