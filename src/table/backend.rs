//! Backend adapter trait for tabular representations
//!
//! One query tree can run against any table shape that can report its row
//! count, hand out columns by name, and select rows by mask. The shipped
//! [`DataFrame`](crate::table::dataframe::DataFrame) implements this trait;
//! other representations adapt by producing [`Column`] views of their data.

use std::collections::HashMap;

use crate::core::error::Result;
use crate::table::column::Column;

/// Capability set a tabular representation must provide for query evaluation
pub trait Table: Clone {
    /// Number of rows
    fn nrows(&self) -> usize;

    /// Column by name
    fn column(&self, name: &str) -> Result<Column>;

    /// Mapping of every column name to its column
    fn column_map(&self) -> Result<HashMap<String, Column>>;

    /// New table containing the rows where `mask` is true, in order
    fn select(&self, mask: &[bool]) -> Result<Self>;
}
