//! Column-oriented DataFrame, the crate's built-in tabular backend

use std::collections::HashMap;

use crate::core::error::{Error, Result};
use crate::table::backend::Table;
use crate::table::column::Column;

/// DataFrame struct: column-oriented 2D data structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    columns: HashMap<String, Column>,
    column_order: Vec<String>,
    row_count: usize,
}

impl DataFrame {
    /// Create a new empty DataFrame
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a DataFrame from name/column pairs
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut df = Self::new();
        for (name, column) in columns {
            df.add_column(name, column)?;
        }
        Ok(df)
    }

    /// Add a column to the DataFrame
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();

        // Check if column already exists
        if self.columns.contains_key(&name) {
            return Err(Error::DuplicateColumnName(name));
        }

        // Check length consistency
        let column_len = column.len();
        if !self.columns.is_empty() && column_len != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
                found: column_len,
            });
        }

        self.columns.insert(name.clone(), column);
        self.column_order.push(name);

        // Update row count if this is the first column
        if self.row_count == 0 {
            self.row_count = column_len;
        }

        Ok(())
    }

    /// Check if the DataFrame contains a column with the given name
    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> &[String] {
        &self.column_order
    }

    /// Get the number of rows in the DataFrame
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Get the number of columns in the DataFrame
    pub fn column_count(&self) -> usize {
        self.column_order.len()
    }
}

impl Table for DataFrame {
    fn nrows(&self) -> usize {
        self.row_count
    }

    fn column(&self, name: &str) -> Result<Column> {
        self.columns
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    fn column_map(&self) -> Result<HashMap<String, Column>> {
        Ok(self.columns.clone())
    }

    fn select(&self, mask: &[bool]) -> Result<Self> {
        let mut selected = Self::new();
        for name in &self.column_order {
            selected.add_column(name.clone(), self.columns[name].select(mask)?)?;
        }
        Ok(selected)
    }
}
