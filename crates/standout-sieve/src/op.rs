//! Filter operators and combination modes.
//!
//! The [`Op`] enum is the closed set of operators accepted after the `__`
//! separator in a filter key (`name__icontains`). Variants are declared in
//! evaluation order: criteria groups are visited in this order for every item,
//! which decides which criterion short-circuits first.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SieveError;

/// Filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Op {
    /// Identity with the given value.
    #[serde(rename = "is")]
    Is,
    /// Not identical to the given value.
    #[serde(rename = "isnot")]
    IsNot,
    /// Field value is passed to a caller-supplied predicate.
    #[serde(rename = "customMatch")]
    CustomMatch,
    /// Field value is a member of the given container.
    #[serde(rename = "in")]
    In,
    /// Field value is not a member of the given container.
    #[serde(rename = "notin")]
    NotIn,
    /// Equal.
    #[serde(rename = "eq")]
    Eq,
    /// Equal, ignoring case.
    #[serde(rename = "ieq")]
    IEq,
    /// Not equal.
    #[serde(rename = "ne")]
    Ne,
    /// Not equal, ignoring case.
    #[serde(rename = "ine")]
    INe,
    /// Less than.
    #[serde(rename = "lt")]
    Lt,
    /// Less than or equal.
    #[serde(rename = "lte")]
    Lte,
    /// Greater than.
    #[serde(rename = "gt")]
    Gt,
    /// Greater than or equal.
    #[serde(rename = "gte")]
    Gte,
    /// Field value contains the given value.
    #[serde(rename = "contains")]
    Contains,
    /// Lower-cased field value contains the given value.
    #[serde(rename = "icontains")]
    IContains,
    /// Field value does not contain the given value.
    #[serde(rename = "notcontains")]
    NotContains,
    /// Lower-cased field value does not contain the given value.
    #[serde(rename = "noticontains")]
    NotIContains,
    /// Field value contains any of the given values.
    #[serde(rename = "containsAny")]
    ContainsAny,
    /// Field value contains none of the given values.
    #[serde(rename = "notcontainsAny")]
    NotContainsAny,
    /// Split field value contains the target.
    #[serde(rename = "splitcontains")]
    SplitContains,
    /// Split field value does not contain the target.
    #[serde(rename = "splitnotcontains")]
    SplitNotContains,
    /// Split field value contains any of the targets.
    #[serde(rename = "splitcontainsAny")]
    SplitContainsAny,
    /// Split field value contains none of the targets.
    #[serde(rename = "splitnotcontainsAny")]
    SplitNotContainsAny,
    /// Input-only: rewritten to `Is` / `IsNot` against null during
    /// normalization, so it never owns a criteria group.
    #[serde(rename = "isnull")]
    IsNull,
}

impl Op {
    /// Every operator accepted in a filter key.
    pub const ALL: [Op; 24] = [
        Op::Is,
        Op::IsNot,
        Op::CustomMatch,
        Op::In,
        Op::NotIn,
        Op::Eq,
        Op::IEq,
        Op::Ne,
        Op::INe,
        Op::Lt,
        Op::Lte,
        Op::Gt,
        Op::Gte,
        Op::Contains,
        Op::IContains,
        Op::NotContains,
        Op::NotIContains,
        Op::ContainsAny,
        Op::NotContainsAny,
        Op::SplitContains,
        Op::SplitNotContains,
        Op::SplitContainsAny,
        Op::SplitNotContainsAny,
        Op::IsNull,
    ];

    /// Returns the operator name as written in filter keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Is => "is",
            Op::IsNot => "isnot",
            Op::CustomMatch => "customMatch",
            Op::In => "in",
            Op::NotIn => "notin",
            Op::Eq => "eq",
            Op::IEq => "ieq",
            Op::Ne => "ne",
            Op::INe => "ine",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Contains => "contains",
            Op::IContains => "icontains",
            Op::NotContains => "notcontains",
            Op::NotIContains => "noticontains",
            Op::ContainsAny => "containsAny",
            Op::NotContainsAny => "notcontainsAny",
            Op::SplitContains => "splitcontains",
            Op::SplitNotContains => "splitnotcontains",
            Op::SplitContainsAny => "splitcontainsAny",
            Op::SplitNotContainsAny => "splitnotcontainsAny",
            Op::IsNull => "isnull",
        }
    }

    /// Returns `true` if this operator owns a criteria group.
    ///
    /// Only `isnull` does not; it is stored under `is` / `isnot`.
    pub fn has_group(self) -> bool {
        self != Op::IsNull
    }

    /// Comma-separated list of every valid operator name.
    pub fn choices() -> String {
        Op::ALL
            .iter()
            .map(|op| op.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Op {
    type Err = SieveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Op::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| SieveError::UnknownOperator {
                op: s.to_string(),
                choices: Op::choices(),
            })
    }
}

/// How the criteria of one filter call combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// Every criterion must match (ALL).
    #[default]
    And,
    /// At least one criterion must match (ANY).
    Or,
}

impl Mode {
    /// Returns the display name of this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::And => "AND",
            Mode::Or => "OR",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mode {
    type Err = SieveError;

    /// Parses `AND`/`OR` (also `ALL`/`ANY`), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AND" | "ALL" => Ok(Mode::And),
            "OR" | "ANY" => Ok(Mode::Or),
            _ => Err(SieveError::UnknownMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_round_trips_through_names() {
        for op in Op::ALL {
            assert_eq!(op.as_str().parse::<Op>().unwrap(), op);
        }
    }

    #[test]
    fn op_names_are_case_sensitive() {
        assert_eq!("containsAny".parse::<Op>().unwrap(), Op::ContainsAny);
        assert!("containsany".parse::<Op>().is_err());
        assert!("EQ".parse::<Op>().is_err());
    }

    #[test]
    fn unknown_op_lists_choices() {
        let err = "startswith".parse::<Op>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("startswith"));
        assert!(msg.contains("splitnotcontainsAny"));
        assert!(msg.contains("isnull"));
    }

    #[test]
    fn evaluation_order_follows_declaration() {
        assert!(Op::Is < Op::IsNot);
        assert!(Op::IsNot < Op::CustomMatch);
        assert!(Op::CustomMatch < Op::In);
        assert!(Op::Eq < Op::Lt);
        assert!(Op::Gte < Op::Contains);
        assert!(Op::SplitNotContainsAny < Op::IsNull);
    }

    #[test]
    fn only_isnull_lacks_a_group() {
        assert!(!Op::IsNull.has_group());
        assert!(Op::Is.has_group());
    }

    #[test]
    fn op_serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&Op::ContainsAny).unwrap(), "\"containsAny\"");
        assert_eq!(serde_json::from_str::<Op>("\"ine\"").unwrap(), Op::INe);
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("and".parse::<Mode>().unwrap(), Mode::And);
        assert_eq!("OR".parse::<Mode>().unwrap(), Mode::Or);
        assert_eq!("Any".parse::<Mode>().unwrap(), Mode::Or);
        assert!("xor".parse::<Mode>().is_err());
        assert_eq!(Mode::default(), Mode::And);
        assert_eq!(Mode::Or.to_string(), "OR");
    }
}
