//! Composable boolean queries over tabular data
//!
//! This crate provides a small algebra of row predicates:
//! - Queries built from string expressions, whole-table functions, or
//!   per-column functions
//! - Combination with `&` (and), `|` (or), `^` (xor) and `!` (not), with
//!   same-operator chains kept flat
//! - Evaluation into boolean row masks, and filter/count/indices/split
//!   operations layered on top
//! - A backend trait so one query runs against any tabular representation
//!
//! # Example
//!
//! ```
//! use ezquery::{DataFrame, Query};
//!
//! let table = DataFrame::from_columns([
//!     ("a", vec![1i64, 1, 3, 5].into()),
//!     ("b", vec![5i64, 1, 2, 5].into()),
//!     ("c", vec![4.5, 6.2, 0.5, -3.5].into()),
//! ])?;
//!
//! let q = Query::expr("a > 3");
//! assert_eq!(q.mask(&table)?, vec![false, false, false, true]);
//! assert_eq!(q.count(&table)?, 1);
//!
//! let q2 = !q & Query::expr("b > c");
//! assert_eq!(q2.count(&table)?, 2);
//! # Ok::<(), ezquery::Error>(())
//! ```

// Core types shared across the crate
pub mod core;

// Expression engine for string predicates
pub mod expr;

// Query trees, combination algebra, and row-level operations
pub mod query;

// Tabular backends and the adapter trait
pub mod table;

// Re-export the primary surface at the crate root
pub use crate::core::error::{Error, Result};
pub use crate::core::mask::Mask;
pub use crate::expr::evaluator::{default_context, register_context, QueryContext};
pub use crate::query::base::Query;
pub use crate::query::combine::Operator;
pub use crate::query::convenience::{count, filter, indices, mask, split};
pub use crate::query::maker;
pub use crate::query::predicate::Predicate;
pub use crate::table::backend::Table;
pub use crate::table::column::{Column, ColumnType};
pub use crate::table::dataframe::DataFrame;

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
