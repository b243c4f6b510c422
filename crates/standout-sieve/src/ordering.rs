//! Value ordering for sorting collections by field.

use std::cmp::Ordering;

use crate::error::{Result, SieveError};
use crate::resolve::FieldResolver;
use crate::value::Value;

/// Compares two values for sorting.
///
/// Values of the same kind compare naturally (NaN sorts after every other
/// number, lists compare element by element). Null sorts after everything
/// else. Returns `None` for two non-null values of different kinds.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => Some(a.total_cmp(*b)),
        (Value::String(a), Value::String(b)) => Some((**a).cmp(&**b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::List(a), Value::List(b)) => {
            for (x, y) in a.iter().zip(b) {
                match compare_values(x, y)? {
                    Ordering::Equal => continue,
                    other => return Some(other),
                }
            }
            Some(a.len().cmp(&b.len()))
        }

        // Null values sort last
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) => Some(Ordering::Greater),
        (_, Value::Null) => Some(Ordering::Less),

        _ => None,
    }
}

/// Stable sort of `items` by the value of `field`.
///
/// Items with equal keys keep their relative order, also when `reverse` is
/// set. Each key is resolved once. Fails with [`SieveError::Incomparable`]
/// if two keys have no order between them; `items` is left untouched then.
pub fn sort_by_field<T, R>(items: &mut Vec<&T>, field: &str, reverse: bool, resolver: &R) -> Result<()>
where
    T: ?Sized,
    R: FieldResolver<T> + ?Sized,
{
    let mut keyed: Vec<(Value<'_>, &T)> = items
        .iter()
        .map(|item| (resolver.resolve(*item, field), *item))
        .collect();

    check_sortable(keyed.iter().map(|(key, _)| key), field)?;

    keyed.sort_by(|(a, _), (b, _)| {
        // Keys passed the shape check, so every pair has an order
        let ordering = compare_values(a, b).unwrap_or(Ordering::Equal);
        if reverse {
            ordering.reverse()
        } else {
            ordering
        }
    });

    *items = keyed.into_iter().map(|(_, item)| item).collect();
    Ok(())
}

/// Kinds seen so far at one key position. Lists track each element slot.
enum Shape {
    Unseen,
    Number,
    String,
    Bool,
    List(Vec<Shape>),
    Map,
}

impl Shape {
    /// Records `value`, returning `false` if it has no order against the
    /// values recorded before it.
    fn absorb(&mut self, value: &Value<'_>) -> bool {
        if value.is_null() {
            return true;
        }
        if let Shape::Unseen = self {
            let seen = match value {
                Value::Number(_) => Shape::Number,
                Value::String(_) => Shape::String,
                Value::Bool(_) => Shape::Bool,
                Value::List(_) => Shape::List(Vec::new()),
                Value::Map(_) | Value::Null => Shape::Map,
            };
            // A lone map is only ever compared with nulls
            let fresh_map = matches!(seen, Shape::Map);
            *self = seen;
            if fresh_map {
                return true;
            }
        }
        match (self, value) {
            (Shape::Number, Value::Number(_))
            | (Shape::String, Value::String(_))
            | (Shape::Bool, Value::Bool(_)) => true,
            (Shape::List(slots), Value::List(elements)) => {
                for (index, element) in elements.iter().enumerate() {
                    if index == slots.len() {
                        slots.push(Shape::Unseen);
                    }
                    if !slots[index].absorb(element) {
                        return false;
                    }
                }
                true
            }
            _ => false,
        }
    }
}

/// Fails unless every pair of `keys` has an order under [`compare_values`].
fn check_sortable<'k, 'v: 'k>(keys: impl Iterator<Item = &'k Value<'v>>, field: &str) -> Result<()> {
    let mut shape = Shape::Unseen;
    let mut first: Option<&'static str> = None;
    for key in keys {
        if !shape.absorb(key) {
            return Err(SieveError::Incomparable {
                field: field.to_string(),
                op: "sort_by",
                left: first.unwrap_or("null"),
                right: key.type_name(),
            });
        }
        if first.is_none() && !key.is_null() {
            first = Some(key.type_name());
        }
    }
    Ok(())
}
