//! Composable boolean queries
//!
//! The module is organized into:
//! - predicate: the leaf predicate variants
//! - base: the query tree, construction and variable-name resolution
//! - combine: the AND/OR/XOR/NOT combination algebra
//! - eval: mask evaluation and filter/count/indices/split
//! - maker: ready-made column predicates
//! - convenience: build-then-apply helpers

pub mod base;
pub mod combine;
pub mod convenience;
pub mod eval;
pub mod maker;
pub mod predicate;

// Re-exports for convenience
pub use base::Query;
pub use combine::Operator;
pub use convenience::{count, filter, indices, mask, split};
pub use predicate::{ColumnsFn, Predicate, TableFn};
