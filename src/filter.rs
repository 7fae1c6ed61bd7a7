//! Filter expressions handed to the grid's filter engine.
//!
//! Only what the quick filter needs: disjunctions of case-insensitive
//! "contains" checks between a column value and a literal.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Column(String),
    Value(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    Or(Vec<FilterExpr>),
    Contain(Operand, Operand),
}

pub fn column(id: impl Into<String>) -> Operand {
    Operand::Column(id.into())
}

pub fn value(v: impl Into<String>) -> Operand {
    Operand::Value(v.into())
}

pub fn contain(haystack: Operand, needle: Operand) -> FilterExpr {
    FilterExpr::Contain(haystack, needle)
}

pub fn or(exprs: impl IntoIterator<Item = FilterExpr>) -> FilterExpr {
    FilterExpr::Or(exprs.into_iter().collect())
}

impl Operand {
    fn resolve<'r, F>(&self, lookup: &F) -> Option<String>
    where
        F: Fn(&str) -> Option<&'r str>,
    {
        match self {
            Operand::Column(id) => lookup(id).map(str::to_lowercase),
            Operand::Value(v) => Some(v.to_lowercase()),
        }
    }
}

impl FilterExpr {
    /// Evaluate against one row. `lookup` maps a column id to the row's text.
    pub fn matches<'r, F>(&self, lookup: &F) -> bool
    where
        F: Fn(&str) -> Option<&'r str>,
    {
        match self {
            FilterExpr::Or(exprs) => exprs.iter().any(|e| e.matches(lookup)),
            FilterExpr::Contain(haystack, needle) => {
                match (haystack.resolve(lookup), needle.resolve(lookup)) {
                    (Some(h), Some(n)) => h.contains(&n),
                    _ => false,
                }
            }
        }
    }
}

/// Condition understood by a filter bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub condition: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterRule {
    pub conditions: Vec<FilterCondition>,
}

/// A richer filter UI that the quick filter defers to when present
pub trait FilterBar {
    fn apply_filter(&mut self, rule: FilterRule);

    /// Drop the active filter; `silent` skips any confirmation UI
    fn clear_filter(&mut self, silent: bool);

    /// Open the bar together with its filter dialog
    fn show(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(id: &str) -> Option<&'static str> {
        match id {
            "name" => Some("Alice Smith"),
            "city" => Some("Leeds"),
            _ => None,
        }
    }

    #[test]
    fn test_contain_is_case_insensitive() {
        let expr = contain(column("name"), value("alice"));
        assert!(expr.matches(&lookup));
    }

    #[test]
    fn test_or_matches_any_column() {
        let expr = or(["name", "city"]
            .into_iter()
            .map(|c| contain(column(c), value("eed"))));
        assert!(expr.matches(&lookup));

        let expr = or(["name", "city"]
            .into_iter()
            .map(|c| contain(column(c), value("zzz"))));
        assert!(!expr.matches(&lookup));
    }

    #[test]
    fn test_unknown_column_does_not_match() {
        assert!(!contain(column("missing"), value("a")).matches(&lookup));
        assert!(!or(Vec::new()).matches(&lookup));
    }
}
