//! Mask evaluation and the row-level operations built on it

use crate::core::error::{Error, Result};
use crate::core::mask::{self, Mask};
use crate::expr::evaluator;
use crate::query::base::{Node, Query};
use crate::query::combine::Operator;
use crate::query::predicate::Predicate;
use crate::table::backend::Table;
use crate::table::column::Column;

fn eval_leaf<T: Table>(predicate: &Predicate<T>, table: &T) -> Result<Mask> {
    match predicate {
        Predicate::Identity => Ok(mask::ones(table.nrows())),
        Predicate::Expression(text) => {
            let columns = table.column_map()?;
            let context = evaluator::default_context();
            evaluator::evaluate(text, &columns, &context, table.nrows())
        }
        Predicate::Callable(func) => func(table),
        Predicate::ColumnFunc { func, names } => {
            let columns: Vec<Column> = names
                .iter()
                .map(|name| table.column(name))
                .collect::<Result<_>>()?;
            func(&columns)
        }
    }
}

impl<T: Table> Query<T> {
    /// Evaluate this query into a boolean mask over `table`
    ///
    /// Operator nodes fold their children's masks left-to-right into the
    /// first child's buffer; the buffer is owned by this call and never
    /// aliases caller data.
    pub fn mask(&self, table: &T) -> Result<Mask> {
        match &*self.node {
            Node::Leaf(predicate) => eval_leaf(predicate, table),
            Node::Not(child) => {
                let mut inverted = child.mask(table)?;
                mask::invert(&mut inverted);
                Ok(inverted)
            }
            Node::Op { kind, children } => {
                let (first, rest) = children.split_first().ok_or_else(|| {
                    Error::InvalidCombination(
                        "an operator node needs at least two operands".to_string(),
                    )
                })?;
                let mut acc = first.mask(table)?;
                for child in rest {
                    let child_mask = child.mask(table)?;
                    match kind {
                        Operator::And => mask::and_assign(&mut acc, &child_mask)?,
                        Operator::Or => mask::or_assign(&mut acc, &child_mask)?,
                        Operator::Xor => mask::xor_assign(&mut acc, &child_mask)?,
                    }
                }
                Ok(acc)
            }
        }
    }

    /// Rows of `table` satisfying the query
    pub fn filter(&self, table: &T) -> Result<T> {
        match &*self.node {
            Node::Leaf(Predicate::Identity) => Ok(table.clone()),
            Node::Op {
                kind: Operator::And,
                children,
            } => {
                // Each step narrows the table, so later children evaluate
                // their masks over fewer rows
                let mut narrowed = table.clone();
                for child in children {
                    narrowed = child.filter(&narrowed)?;
                }
                Ok(narrowed)
            }
            _ => table.select(&self.mask(table)?),
        }
    }

    /// Entries of one column satisfying the query
    ///
    /// The mask is still evaluated over the full table; only the selection
    /// is narrowed to the named column.
    pub fn filter_column(&self, table: &T, name: &str) -> Result<Column> {
        let column = table.column(name)?;
        if self.is_identity() {
            return Ok(column);
        }
        column.select(&self.mask(table)?)
    }

    /// Number of rows satisfying the query
    pub fn count(&self, table: &T) -> Result<usize> {
        if self.is_identity() {
            return Ok(table.nrows());
        }
        Ok(mask::count_true(&self.mask(table)?))
    }

    /// Ascending row indices satisfying the query
    pub fn indices(&self, table: &T) -> Result<Vec<usize>> {
        if self.is_identity() {
            return Ok((0..table.nrows()).collect());
        }
        Ok(mask::nonzero(&self.mask(table)?))
    }

    /// Partition `table` into (matching, non-matching) halves
    ///
    /// The two halves together contain every row exactly once, each keeping
    /// the original row order.
    pub fn split(&self, table: &T) -> Result<(T, T)> {
        let selected = self.mask(table)?;
        let rejected = mask::complement(&selected);
        Ok((table.select(&selected)?, table.select(&rejected)?))
    }

    /// Partition one column into (matching, non-matching) halves
    pub fn split_column(&self, table: &T, name: &str) -> Result<(Column, Column)> {
        let column = table.column(name)?;
        let selected = self.mask(table)?;
        let rejected = mask::complement(&selected);
        Ok((column.select(&selected)?, column.select(&rejected)?))
    }
}
