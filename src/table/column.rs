//! Typed column storage shared across tabular backends
//!
//! Columns hold their data behind `Arc` so handing a column out of a table,
//! or sharing one between two tables produced by a split, never copies the
//! underlying values.

use std::sync::Arc;

use crate::core::error::{Error, Result};

/// Data type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int64,
    Float64,
    Str,
    Bool,
}

/// A single column of values, cheap to clone and share
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int64(Arc<[i64]>),
    Float64(Arc<[f64]>),
    Str(Arc<[String]>),
    Bool(Arc<[bool]>),
}

impl Column {
    /// Number of entries in the column
    pub fn len(&self) -> usize {
        match self {
            Column::Int64(data) => data.len(),
            Column::Float64(data) => data.len(),
            Column::Str(data) => data.len(),
            Column::Bool(data) => data.len(),
        }
    }

    /// Whether the column has no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The type of the column
    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Int64(_) => ColumnType::Int64,
            Column::Float64(_) => ColumnType::Float64,
            Column::Str(_) => ColumnType::Str,
            Column::Bool(_) => ColumnType::Bool,
        }
    }

    /// New column keeping the entries where `mask` is true, in order
    pub fn select(&self, mask: &[bool]) -> Result<Column> {
        if mask.len() != self.len() {
            return Err(Error::LengthMismatch {
                expected: self.len(),
                actual: mask.len(),
            });
        }

        fn keep<T: Clone>(data: &[T], mask: &[bool]) -> Arc<[T]> {
            data.iter()
                .zip(mask)
                .filter(|&(_, &m)| m)
                .map(|(value, _)| value.clone())
                .collect()
        }

        Ok(match self {
            Column::Int64(data) => Column::Int64(keep(data, mask)),
            Column::Float64(data) => Column::Float64(keep(data, mask)),
            Column::Str(data) => Column::Str(keep(data, mask)),
            Column::Bool(data) => Column::Bool(keep(data, mask)),
        })
    }

    /// Numeric view of the column, integers widened to f64
    pub fn to_f64(&self) -> Result<Vec<f64>> {
        match self {
            Column::Int64(data) => Ok(data.iter().map(|&v| v as f64).collect()),
            Column::Float64(data) => Ok(data.to_vec()),
            other => Err(Error::ColumnTypeMismatch {
                expected: ColumnType::Float64,
                found: other.column_type(),
            }),
        }
    }

    /// Borrow the values if this is an Int64 column
    pub fn as_i64(&self) -> Option<&[i64]> {
        match self {
            Column::Int64(data) => Some(data),
            _ => None,
        }
    }

    /// Borrow the values if this is a Float64 column
    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            Column::Float64(data) => Some(data),
            _ => None,
        }
    }

    /// Borrow the values if this is a string column
    pub fn as_str(&self) -> Option<&[String]> {
        match self {
            Column::Str(data) => Some(data),
            _ => None,
        }
    }

    /// Borrow the values if this is a boolean column
    pub fn as_bool(&self) -> Option<&[bool]> {
        match self {
            Column::Bool(data) => Some(data),
            _ => None,
        }
    }
}

// From implementations for type conversion
impl From<Vec<i64>> for Column {
    fn from(data: Vec<i64>) -> Self {
        Column::Int64(data.into())
    }
}

impl From<Vec<f64>> for Column {
    fn from(data: Vec<f64>) -> Self {
        Column::Float64(data.into())
    }
}

impl From<Vec<String>> for Column {
    fn from(data: Vec<String>) -> Self {
        Column::Str(data.into())
    }
}

impl From<Vec<&str>> for Column {
    fn from(data: Vec<&str>) -> Self {
        Column::Str(data.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<bool>> for Column {
    fn from(data: Vec<bool>) -> Self {
        Column::Bool(data.into())
    }
}
