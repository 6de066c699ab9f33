//! Ready-made column predicates for common filtering patterns
//!
//! Every builder returns an ordinary query whose leaf is a column function,
//! so the results combine with `&`, `|`, `^` and `!` like any other query.

use crate::core::error::{Error, Result};
use crate::core::mask::Mask;
use crate::expr::ast::LiteralValue;
use crate::query::base::Query;
use crate::table::backend::Table;
use crate::table::column::{Column, ColumnType};

fn expected_type(value: &LiteralValue) -> ColumnType {
    match value {
        LiteralValue::Number(_) => ColumnType::Float64,
        LiteralValue::String(_) => ColumnType::Str,
        LiteralValue::Boolean(_) => ColumnType::Bool,
    }
}

/// Elementwise equality between a column and a scalar
fn scalar_eq(column: &Column, value: &LiteralValue) -> Result<Mask> {
    match (column, value) {
        (Column::Int64(data), LiteralValue::Number(n)) => {
            Ok(data.iter().map(|&v| v as f64 == *n).collect())
        }
        (Column::Float64(data), LiteralValue::Number(n)) => {
            Ok(data.iter().map(|&v| v == *n).collect())
        }
        (Column::Str(data), LiteralValue::String(s)) => Ok(data.iter().map(|v| v == s).collect()),
        (Column::Bool(data), LiteralValue::Boolean(b)) => {
            Ok(data.iter().map(|&v| v == *b).collect())
        }
        (column, value) => Err(Error::ColumnTypeMismatch {
            expected: expected_type(value),
            found: column.column_type(),
        }),
    }
}

/// Rows whose `column` value equals `value`
pub fn equals<T: Table>(
    column: impl Into<String>,
    value: impl Into<LiteralValue>,
) -> Result<Query<T>> {
    let value = value.into();
    Query::columns([column.into()], move |cols| scalar_eq(&cols[0], &value))
}

/// Rows whose `column` value differs from `value`
pub fn not_equals<T: Table>(
    column: impl Into<String>,
    value: impl Into<LiteralValue>,
) -> Result<Query<T>> {
    let value = value.into();
    Query::columns([column.into()], move |cols| {
        let mut mask = scalar_eq(&cols[0], &value)?;
        for entry in mask.iter_mut() {
            *entry = !*entry;
        }
        Ok(mask)
    })
}

/// Rows whose `column` value appears in `values`
pub fn is_in<T, V>(
    column: impl Into<String>,
    values: impl IntoIterator<Item = V>,
) -> Result<Query<T>>
where
    T: Table,
    V: Into<LiteralValue>,
{
    let values: Vec<LiteralValue> = values.into_iter().map(Into::into).collect();
    Query::columns([column.into()], move |cols| {
        let mut mask = vec![false; cols[0].len()];
        for value in &values {
            let hits = scalar_eq(&cols[0], value)?;
            for (entry, hit) in mask.iter_mut().zip(&hits) {
                *entry = *entry || *hit;
            }
        }
        Ok(mask)
    })
}

fn string_predicate<T, F>(column: impl Into<String>, predicate: F) -> Result<Query<T>>
where
    T: Table,
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    Query::columns([column.into()], move |cols| {
        let values = cols[0].as_str().ok_or_else(|| Error::ColumnTypeMismatch {
            expected: ColumnType::Str,
            found: cols[0].column_type(),
        })?;
        Ok(values.iter().map(|value| predicate(value)).collect())
    })
}

/// Rows whose string `column` starts with `prefix`
pub fn starts_with<T: Table>(
    column: impl Into<String>,
    prefix: impl Into<String>,
) -> Result<Query<T>> {
    let prefix = prefix.into();
    string_predicate(column, move |value| value.starts_with(&prefix))
}

/// Rows whose string `column` ends with `suffix`
pub fn ends_with<T: Table>(
    column: impl Into<String>,
    suffix: impl Into<String>,
) -> Result<Query<T>> {
    let suffix = suffix.into();
    string_predicate(column, move |value| value.ends_with(&suffix))
}

/// Rows whose string `column` contains `needle`
pub fn contains<T: Table>(
    column: impl Into<String>,
    needle: impl Into<String>,
) -> Result<Query<T>> {
    let needle = needle.into();
    string_predicate(column, move |value| value.contains(&needle))
}

/// Rows whose numeric `column` value is NaN
pub fn is_nan<T: Table>(column: impl Into<String>) -> Result<Query<T>> {
    Query::columns([column.into()], |cols| {
        Ok(cols[0].to_f64()?.iter().map(|v| v.is_nan()).collect())
    })
}

/// Rows whose numeric `column` value is finite
pub fn is_finite<T: Table>(column: impl Into<String>) -> Result<Query<T>> {
    Query::columns([column.into()], |cols| {
        Ok(cols[0].to_f64()?.iter().map(|v| v.is_finite()).collect())
    })
}

/// Rows whose numeric `column` value is within tolerance of `value`
///
/// A row matches when `|v - value| <= atol + rtol * |value|`.
pub fn is_close<T: Table>(
    column: impl Into<String>,
    value: f64,
    rtol: f64,
    atol: f64,
) -> Result<Query<T>> {
    Query::columns([column.into()], move |cols| {
        Ok(cols[0]
            .to_f64()?
            .iter()
            .map(|v| (v - value).abs() <= atol + rtol * value.abs())
            .collect())
    })
}

/// Fold each row's values across `columns` with `reduce`, keeping the rows
/// where `compare` accepts the folded value
pub fn reduce_compare<T, I, S, R, C>(columns: I, reduce: R, compare: C) -> Result<Query<T>>
where
    T: Table,
    I: IntoIterator<Item = S>,
    S: Into<String>,
    R: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    C: Fn(f64) -> bool + Send + Sync + 'static,
{
    Query::columns(columns, move |cols| {
        let views: Vec<Vec<f64>> = cols.iter().map(Column::to_f64).collect::<Result<_>>()?;
        let nrows = views.first().map(Vec::len).unwrap_or(0);
        for view in &views {
            if view.len() != nrows {
                return Err(Error::LengthMismatch {
                    expected: nrows,
                    actual: view.len(),
                });
            }
        }

        let mut mask = Vec::with_capacity(nrows);
        for row in 0..nrows {
            let mut acc = views[0][row];
            for view in &views[1..] {
                acc = reduce(acc, view[row]);
            }
            mask.push(compare(acc));
        }
        Ok(mask)
    })
}
