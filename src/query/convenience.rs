//! One-call helpers that build a query and apply it
//!
//! Each function accepts anything convertible into a query: an existing
//! query value, a string expression, or a predicate. String expressions
//! consult the process-wide default context registered through
//! [`register_context`](crate::expr::evaluator::register_context).

use crate::core::error::Result;
use crate::core::mask::Mask;
use crate::query::base::Query;
use crate::table::backend::Table;

/// Filter `table` in one call; equivalent to `Query::from(query).filter(table)`
pub fn filter<T: Table>(table: &T, query: impl Into<Query<T>>) -> Result<T> {
    query.into().filter(table)
}

/// Count matching rows in one call
pub fn count<T: Table>(table: &T, query: impl Into<Query<T>>) -> Result<usize> {
    query.into().count(table)
}

/// Evaluate a boolean mask in one call
pub fn mask<T: Table>(table: &T, query: impl Into<Query<T>>) -> Result<Mask> {
    query.into().mask(table)
}

/// Matching row indices in one call
pub fn indices<T: Table>(table: &T, query: impl Into<Query<T>>) -> Result<Vec<usize>> {
    query.into().indices(table)
}

/// Partition `table` into (matching, non-matching) halves in one call
pub fn split<T: Table>(table: &T, query: impl Into<Query<T>>) -> Result<(T, T)> {
    query.into().split(table)
}
