//! Queryable collections.
//!
//! A [`QueryableList`] borrows its items and pairs them with the
//! [`FieldResolver`] that knows how to read their fields. Filtering, sorting
//! and the set operations all return a new list of the same kind; only the
//! compound assignment operators (`+=`, `|=`, `&=`, `-=`, `^=`) modify a list
//! in place. Items themselves are never copied or mutated.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use standout_sieve::QueryableListDicts;
//!
//! let rows = vec![
//!     json!({"a": "one", "b": "two"}),
//!     json!({"a": "one", "b": "five"}),
//!     json!({"a": "six", "c": "eleven"}),
//! ];
//! let list = QueryableListDicts::new(&rows);
//!
//! let ones = list.filter([("a", "one")]).unwrap();
//! assert_eq!(ones.count(), 2);
//!
//! let first = ones.filter([("b", "two")]).unwrap();
//! assert_eq!(first[0], rows[0]);
//!
//! let rest = &list - &first;
//! assert_eq!(rest.len(), 2);
//! ```

use std::fmt;
use std::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Bound, Index,
    RangeBounds, Sub, SubAssign,
};

use crate::criteria::{Criteria, FilterArgs};
use crate::error::Result;
use crate::eval::{evaluate_with, EvalOptions};
use crate::op::Mode;
use crate::ordering::sort_by_field;
use crate::resolve::{AttributeAccess, FieldResolver, MappingAccess, MixedAccess};

/// An ordered collection of borrowed items with filter support.
pub struct QueryableList<'a, T: ?Sized, R = AttributeAccess> {
    items: Vec<&'a T>,
    resolver: R,
}

/// List of attribute-style items (structs implementing [`Attributes`](crate::Attributes)).
pub type QueryableListObjs<'a, T> = QueryableList<'a, T, AttributeAccess>;

/// List of mapping items (`serde_json::Value`, `HashMap<String, _>`, ...).
pub type QueryableListDicts<'a, T> = QueryableList<'a, T, MappingAccess>;

/// List of items that may be mappings or attribute-style objects.
pub type QueryableListMixed<'a, T> = QueryableList<'a, T, MixedAccess>;

impl<'a, T, R: Default> QueryableList<'a, T, R> {
    /// Creates a list over every item of a slice.
    pub fn new(items: &'a [T]) -> Self {
        Self::with_resolver(items, R::default())
    }
}

impl<'a, T: ?Sized, R: Default> QueryableList<'a, T, R> {
    /// Creates a list from item references.
    pub fn from_refs(items: impl IntoIterator<Item = &'a T>) -> Self {
        Self::with_resolver(items, R::default())
    }
}

impl<'a, T: ?Sized, R> QueryableList<'a, T, R> {
    /// Creates a list with an explicit resolver, such as an accessor function.
    ///
    /// ```
    /// use standout_sieve::{QueryableList, Value};
    ///
    /// fn accessor<'a>(n: &'a u32, _field: &str) -> Value<'a> {
    ///     Value::from(*n)
    /// }
    ///
    /// let numbers = [3u32, 8, 1];
    /// let list = QueryableList::with_resolver(&numbers, accessor);
    /// let big = list.filter([("n__gt", 2)]).unwrap();
    /// assert_eq!(big.into_vec(), vec![&3, &8]);
    /// ```
    pub fn with_resolver(items: impl IntoIterator<Item = &'a T>, resolver: R) -> Self {
        QueryableList {
            items: items.into_iter().collect(),
            resolver,
        }
    }

    /// The resolver used for field access.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the list holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items.
    pub fn count(&self) -> usize {
        self.len()
    }

    /// Iterates over the items in order.
    pub fn iter(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.items.iter().copied()
    }

    /// Item at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&'a T> {
        self.items.get(index).copied()
    }

    /// First item, if any.
    pub fn first(&self) -> Option<&'a T> {
        self.items.first().copied()
    }

    /// Last item, if any.
    pub fn last(&self) -> Option<&'a T> {
        self.items.last().copied()
    }

    /// The item references as a slice.
    pub fn as_slice(&self) -> &[&'a T] {
        &self.items
    }

    /// Appends an item.
    pub fn push(&mut self, item: &'a T) {
        self.items.push(item);
    }

    /// Consumes the list, returning the item references.
    pub fn into_vec(self) -> Vec<&'a T> {
        self.items
    }

    /// Clones every item into an owned vector.
    pub fn cloned(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.iter().map(|item| (*item).clone()).collect()
    }
}

impl<'a, T: ?Sized, R: Clone> QueryableList<'a, T, R> {
    fn derive(&self, items: Vec<&'a T>) -> Self {
        QueryableList {
            items,
            resolver: self.resolver.clone(),
        }
    }

    /// A copy of this list.
    pub fn all(&self) -> Self {
        self.derive(self.items.clone())
    }

    /// Items in `range`, clamped to the list bounds.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self {
        let len = self.items.len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(len);
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        }
        .clamp(start, len);
        self.derive(self.items[start..end].to_vec())
    }

    /// Keeps items for which `predicate` returns `true`.
    pub fn custom_filter(&self, predicate: impl Fn(&T) -> bool) -> Self {
        self.derive(
            self.items
                .iter()
                .copied()
                .filter(|item| predicate(*item))
                .collect(),
        )
    }

    /// Concatenation: every item of `self`, then every item of `other`.
    pub fn concat(&self, other: &Self) -> Self {
        let mut items = self.items.clone();
        items.extend_from_slice(&other.items);
        self.derive(items)
    }
}

impl<'a, T: ?Sized, R> QueryableList<'a, T, R>
where
    R: FieldResolver<T> + Clone,
{
    /// Keeps items matching every criterion. Same as [`filter_and`](Self::filter_and).
    pub fn filter(&self, args: impl Into<FilterArgs>) -> Result<Self> {
        self.filter_and(args)
    }

    /// Keeps items matching every criterion.
    pub fn filter_and(&self, args: impl Into<FilterArgs>) -> Result<Self> {
        let criteria = Criteria::parse(&args.into())?;
        self.filter_with(&criteria, Mode::And)
    }

    /// Keeps items matching at least one criterion.
    pub fn filter_or(&self, args: impl Into<FilterArgs>) -> Result<Self> {
        let criteria = Criteria::parse(&args.into())?;
        self.filter_with(&criteria, Mode::Or)
    }

    /// Filters with already-normalized criteria.
    pub fn filter_with(&self, criteria: &Criteria, mode: Mode) -> Result<Self> {
        self.filter_with_options(criteria, mode, EvalOptions::default())
    }

    /// Filters with already-normalized criteria and explicit options.
    pub fn filter_with_options(
        &self,
        criteria: &Criteria,
        mode: Mode,
        options: EvalOptions,
    ) -> Result<Self> {
        let kept = evaluate_with(self.iter(), criteria, mode, &self.resolver, options)?;
        Ok(self.derive(kept))
    }

    /// Stable sort by `field`. Missing or null values sort last, first when
    /// `reverse` is set.
    pub fn sort_by(&self, field: &str, reverse: bool) -> Result<Self> {
        let mut items = self.items.clone();
        sort_by_field(&mut items, field, reverse, &self.resolver)?;
        Ok(self.derive(items))
    }
}

impl<'a, T: PartialEq + ?Sized, R: Clone> QueryableList<'a, T, R> {
    /// Returns `true` if an equal item is in the list.
    pub fn contains(&self, item: &T) -> bool {
        self.items.iter().any(|own| *own == item)
    }

    /// Items of `self`, then items of `other` that are not in `self`.
    pub fn union(&self, other: &Self) -> Self {
        let mut items = self.items.clone();
        items.extend(other.iter().filter(|item| !self.contains(item)));
        self.derive(items)
    }

    /// Items of `self` that are also in `other`, in `self`'s order.
    pub fn intersection(&self, other: &Self) -> Self {
        self.derive(self.iter().filter(|item| other.contains(item)).collect())
    }

    /// Items of `self` with every occurrence of each item of `other` removed.
    pub fn difference(&self, other: &Self) -> Self {
        self.derive(self.iter().filter(|item| !other.contains(item)).collect())
    }

    /// Items of `self`, with items of `other` that are in `self` removed and
    /// the ones that are not appended.
    ///
    /// Each item of `other` found in `self` removes one occurrence.
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        let mut items = self.items.clone();
        for item in other.iter() {
            if !self.contains(item) {
                items.push(item);
            } else if let Some(pos) = items.iter().position(|own| *own == item) {
                items.remove(pos);
            }
        }
        self.derive(items)
    }
}

impl<'a, T: ?Sized, R> Extend<&'a T> for QueryableList<'a, T, R> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<'a, T: ?Sized, R: Default> FromIterator<&'a T> for QueryableList<'a, T, R> {
    fn from_iter<I: IntoIterator<Item = &'a T>>(iter: I) -> Self {
        Self::from_refs(iter)
    }
}

impl<'a, T: ?Sized, R> IntoIterator for QueryableList<'a, T, R> {
    type Item = &'a T;
    type IntoIter = std::vec::IntoIter<&'a T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'l, 'a, T: ?Sized, R> IntoIterator for &'l QueryableList<'a, T, R> {
    type Item = &'a T;
    type IntoIter = std::iter::Copied<std::slice::Iter<'l, &'a T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter().copied()
    }
}

impl<'a, T: ?Sized, R> Index<usize> for QueryableList<'a, T, R> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.items[index]
    }
}

impl<'a, T: ?Sized, R: Clone> Clone for QueryableList<'a, T, R> {
    fn clone(&self) -> Self {
        self.all()
    }
}

impl<'a, T: ?Sized, R: Default> Default for QueryableList<'a, T, R> {
    fn default() -> Self {
        QueryableList {
            items: Vec::new(),
            resolver: R::default(),
        }
    }
}

impl<'a, 'b, T: PartialEq + ?Sized, R, R2> PartialEq<QueryableList<'b, T, R2>> for QueryableList<'a, T, R> {
    fn eq(&self, other: &QueryableList<'b, T, R2>) -> bool {
        self.items.len() == other.items.len()
            && self.items.iter().zip(&other.items).all(|(a, b)| *a == *b)
    }
}

/// Prints the collection kind followed by the items, e.g.
/// `QueryableListDicts([{"a": 1}])`.
impl<'a, T: fmt::Debug + ?Sized, R: FieldResolver<T>> fmt::Debug for QueryableList<'a, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.resolver.collection_name())?;
        f.debug_list().entries(self.items.iter()).finish()?;
        write!(f, ")")
    }
}

impl<'a, T: ?Sized, R: Clone> Add for QueryableList<'a, T, R> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.concat(&other)
    }
}

impl<'a, T: ?Sized, R: Clone> Add for &QueryableList<'a, T, R> {
    type Output = QueryableList<'a, T, R>;

    fn add(self, other: Self) -> Self::Output {
        self.concat(other)
    }
}

impl<'a, T: ?Sized, R> AddAssign for QueryableList<'a, T, R> {
    fn add_assign(&mut self, other: Self) {
        self.items.extend(other.items);
    }
}

impl<'a, T: ?Sized, R> AddAssign<&QueryableList<'a, T, R>> for QueryableList<'a, T, R> {
    fn add_assign(&mut self, other: &Self) {
        self.items.extend_from_slice(&other.items);
    }
}

macro_rules! set_operator {
    ($op:ident, $method:ident, $assign:ident, $assign_method:ident, $combine:ident) => {
        impl<'a, T: PartialEq + ?Sized, R: Clone> $op for QueryableList<'a, T, R> {
            type Output = Self;

            fn $method(self, other: Self) -> Self {
                self.$combine(&other)
            }
        }

        impl<'a, T: PartialEq + ?Sized, R: Clone> $op for &QueryableList<'a, T, R> {
            type Output = QueryableList<'a, T, R>;

            fn $method(self, other: Self) -> Self::Output {
                self.$combine(other)
            }
        }

        impl<'a, T: PartialEq + ?Sized, R: Clone> $assign for QueryableList<'a, T, R> {
            fn $assign_method(&mut self, other: Self) {
                self.items = self.$combine(&other).items;
            }
        }

        impl<'a, T: PartialEq + ?Sized, R: Clone> $assign<&QueryableList<'a, T, R>>
            for QueryableList<'a, T, R>
        {
            fn $assign_method(&mut self, other: &Self) {
                self.items = self.$combine(other).items;
            }
        }
    };
}

set_operator!(BitOr, bitor, BitOrAssign, bitor_assign, union);
set_operator!(BitAnd, bitand, BitAndAssign, bitand_assign, intersection);
set_operator!(Sub, sub, SubAssign, sub_assign, difference);
set_operator!(BitXor, bitxor, BitXorAssign, bitxor_assign, symmetric_difference);
