//! Leaf predicate representation
//!
//! A predicate is an irreducible query: it matches rows on its own, without
//! reference to sub-queries. Function predicates are stored behind `Arc` so
//! a predicate can be shared by every tree that mentions it.

use std::fmt;
use std::sync::Arc;

use crate::core::error::{Error, Result};
use crate::core::mask::Mask;
use crate::table::backend::Table;
use crate::table::column::Column;

/// Whole-table predicate function
pub type TableFn<T> = Arc<dyn Fn(&T) -> Result<Mask> + Send + Sync>;

/// Per-column predicate function, called with one column per declared name
pub type ColumnsFn = Arc<dyn Fn(&[Column]) -> Result<Mask> + Send + Sync>;

/// An irreducible query
#[derive(Clone)]
pub enum Predicate<T: Table> {
    /// Matches every row
    Identity,
    /// String expression evaluated against named columns
    Expression(String),
    /// Function of the whole table
    Callable(TableFn<T>),
    /// Function of the named columns, applied in declaration order
    ColumnFunc { func: ColumnsFn, names: Vec<String> },
}

impl<T: Table> Predicate<T> {
    /// Build a column-function predicate, validating the name list
    pub fn column_func<I, S, F>(names: I, func: F) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[Column]) -> Result<Mask> + Send + Sync + 'static,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(Error::InvalidPredicate(
                "a column predicate needs at least one column name".to_string(),
            ));
        }
        Ok(Predicate::ColumnFunc {
            func: Arc::new(func),
            names,
        })
    }
}

impl<T: Table> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Identity => write!(f, "Identity"),
            Predicate::Expression(text) => f.debug_tuple("Expression").field(text).finish(),
            Predicate::Callable(_) => write!(f, "Callable(..)"),
            Predicate::ColumnFunc { names, .. } => f
                .debug_struct("ColumnFunc")
                .field("names", names)
                .finish_non_exhaustive(),
        }
    }
}
