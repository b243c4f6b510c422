//! Reusable filter queries.
//!
//! A [`QueryBuilder`] records a sequence of filter steps, each with its own
//! combination mode, and replays them against any collection. Arguments are
//! normalized when a step is added, so a malformed filter is reported before
//! the query ever runs.

use std::str::FromStr;

use tracing::debug;

use crate::criteria::{Criteria, FilterArgs};
use crate::error::Result;
use crate::list::{QueryableList, QueryableListMixed};
use crate::op::Mode;
use crate::resolve::{FieldResolver, MixedRecord};

/// One recorded filter call.
#[derive(Debug, Clone)]
pub struct Step {
    /// How the step's criteria combine.
    pub mode: Mode,
    /// The step's normalized criteria.
    pub criteria: Criteria,
}

/// An ordered sequence of filter steps.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use standout_sieve::{QueryBuilder, QueryableListDicts};
///
/// let rows = vec![
///     json!({"name": "Write docs", "priority": 3}),
///     json!({"name": "Fix bug", "priority": 5}),
///     json!({"name": "Old task", "priority": 1}),
/// ];
///
/// let query = QueryBuilder::new()
///     .and([("priority__gte", 3)]).unwrap()
///     .or([("name__icontains", "BUG"), ("name__icontains", "task")]).unwrap();
///
/// let found = query.execute(&QueryableListDicts::new(&rows)).unwrap();
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0]["name"], "Fix bug");
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    steps: Vec<Step>,
}

impl QueryBuilder {
    /// Creates an empty query. An empty query returns its input unchanged.
    pub fn new() -> Self {
        QueryBuilder::default()
    }

    /// Appends a step.
    ///
    /// Fails if any argument has an unknown operator or a malformed value.
    pub fn add_filter(&mut self, mode: Mode, args: impl Into<FilterArgs>) -> Result<&mut Self> {
        let criteria = Criteria::parse(&args.into())?;
        self.steps.push(Step { mode, criteria });
        Ok(self)
    }

    /// Appends a step whose mode is given by name (`"AND"` or `"OR"`, any
    /// case).
    pub fn add_filter_str(&mut self, mode: &str, args: impl Into<FilterArgs>) -> Result<&mut Self> {
        let mode = Mode::from_str(mode)?;
        self.add_filter(mode, args)
    }

    /// Appends an AND step, builder style.
    pub fn and(mut self, args: impl Into<FilterArgs>) -> Result<Self> {
        self.add_filter(Mode::And, args)?;
        Ok(self)
    }

    /// Appends an OR step, builder style.
    pub fn or(mut self, args: impl Into<FilterArgs>) -> Result<Self> {
        self.add_filter(Mode::Or, args)?;
        Ok(self)
    }

    /// The recorded steps.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if no steps were added.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step in order against `list`.
    ///
    /// Returns a list of the same kind. Stops as soon as a step leaves no
    /// items.
    pub fn execute<'a, T, R>(&self, list: &QueryableList<'a, T, R>) -> Result<QueryableList<'a, T, R>>
    where
        T: ?Sized,
        R: FieldResolver<T> + Clone,
    {
        let mut current = list.all();
        for (index, step) in self.steps.iter().enumerate() {
            if current.is_empty() {
                debug!(step = index, remaining = self.steps.len() - index, "query short-circuited on empty result");
                break;
            }
            current = current.filter_with(&step.criteria, step.mode)?;
        }
        Ok(current)
    }

    /// Runs the query against a plain slice, read as a mixed collection.
    pub fn execute_mixed<'a, T>(&self, items: &'a [T]) -> Result<QueryableListMixed<'a, T>>
    where
        T: MixedRecord,
    {
        self.execute(&QueryableListMixed::new(items))
    }
}
