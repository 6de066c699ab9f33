//! Query tree: construction rules and variable-name resolution
//!
//! A query wraps one tree node behind `Arc`. Combination never mutates an
//! existing node, so subtrees can be shared freely between the queries
//! produced by successive combinations.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use log::warn;

use crate::core::error::Result;
use crate::core::mask::Mask;
use crate::expr::lexer_parser;
use crate::query::combine::Operator;
use crate::query::predicate::Predicate;
use crate::table::backend::Table;
use crate::table::column::Column;
use crate::table::dataframe::DataFrame;

/// A query tree node: a leaf predicate or an operator over sub-queries
pub(crate) enum Node<T: Table> {
    Leaf(Predicate<T>),
    Not(Query<T>),
    Op {
        kind: Operator,
        children: Vec<Query<T>>,
    },
}

/// A composable boolean query over tabular data
///
/// Queries are built from predicates, combined with `&`, `|`, `^` and `!`,
/// and applied to a table through [`mask`](Query::mask),
/// [`filter`](Query::filter), [`count`](Query::count),
/// [`indices`](Query::indices) and [`split`](Query::split).
pub struct Query<T: Table = DataFrame> {
    pub(crate) node: Arc<Node<T>>,
    variable_names: OnceLock<BTreeSet<String>>,
}

impl<T: Table> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
            variable_names: self.variable_names.clone(),
        }
    }
}

impl<T: Table> Default for Query<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Table> Query<T> {
    pub(crate) fn from_node(node: Node<T>) -> Self {
        Self {
            node: Arc::new(node),
            variable_names: OnceLock::new(),
        }
    }

    /// The identity query: matches every row
    pub fn new() -> Self {
        Self::from_node(Node::Leaf(Predicate::Identity))
    }

    /// Query from a string expression
    ///
    /// The expression is not compiled here; syntax errors surface when the
    /// query is evaluated against a table.
    pub fn expr(text: impl Into<String>) -> Self {
        Self::from_node(Node::Leaf(Predicate::Expression(text.into())))
    }

    /// Query from a function of the whole table
    pub fn callable<F>(func: F) -> Self
    where
        F: Fn(&T) -> Result<Mask> + Send + Sync + 'static,
    {
        Self::from_node(Node::Leaf(Predicate::Callable(Arc::new(func))))
    }

    /// Query from a function of the named columns
    ///
    /// Fails when `names` is empty: the function must declare at least one
    /// column it depends on.
    pub fn columns<I, S, F>(names: I, func: F) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[Column]) -> Result<Mask> + Send + Sync + 'static,
    {
        Ok(Self::from_node(Node::Leaf(Predicate::column_func(
            names, func,
        )?)))
    }

    /// Conjunction of several queries as one flat AND node
    ///
    /// An empty iterator yields the identity; a single query is returned
    /// as-is.
    pub fn all<I>(queries: I) -> Self
    where
        I: IntoIterator<Item = Query<T>>,
    {
        let mut children: Vec<Query<T>> = queries.into_iter().collect();
        if children.len() >= 2 {
            Self::from_node(Node::Op {
                kind: Operator::And,
                children,
            })
        } else if let Some(query) = children.pop() {
            query
        } else {
            Self::new()
        }
    }

    /// Whether this is the identity query
    pub fn is_identity(&self) -> bool {
        matches!(&*self.node, Node::Leaf(Predicate::Identity))
    }

    /// Operator kind of the top node, if it is an n-ary combination
    pub fn operator(&self) -> Option<Operator> {
        match &*self.node {
            Node::Op { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Number of direct sub-queries under the top node
    pub fn operand_count(&self) -> usize {
        match &*self.node {
            Node::Leaf(_) => 0,
            Node::Not(_) => 1,
            Node::Op { children, .. } => children.len(),
        }
    }

    /// Distinct column names this query depends on
    ///
    /// Computed once per query value and cached. A whole-table callable
    /// cannot be inspected for dependencies: it contributes an empty set and
    /// logs a warning rather than failing, so a tree stays introspectable
    /// even when one leaf cannot report its columns.
    pub fn variable_names(&self) -> Result<&BTreeSet<String>> {
        if let Some(names) = self.variable_names.get() {
            return Ok(names);
        }
        let computed = self.collect_variable_names()?;
        Ok(self.variable_names.get_or_init(|| computed))
    }

    fn collect_variable_names(&self) -> Result<BTreeSet<String>> {
        match &*self.node {
            Node::Leaf(Predicate::Identity) => Ok(BTreeSet::new()),
            Node::Leaf(Predicate::Expression(text)) => lexer_parser::variable_names(text),
            Node::Leaf(Predicate::Callable(_)) => {
                warn!("variable names are not available for a whole-table callable");
                Ok(BTreeSet::new())
            }
            Node::Leaf(Predicate::ColumnFunc { names, .. }) => {
                Ok(names.iter().cloned().collect())
            }
            Node::Not(child) => Ok(child.variable_names()?.clone()),
            Node::Op { children, .. } => {
                let mut names = BTreeSet::new();
                for child in children {
                    names.extend(child.variable_names()?.iter().cloned());
                }
                Ok(names)
            }
        }
    }
}

impl<T: Table> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.node {
            Node::Leaf(predicate) => f.debug_tuple("Query").field(predicate).finish(),
            Node::Not(child) => f.debug_tuple("Not").field(child).finish(),
            Node::Op { kind, children } => {
                let mut tuple = f.debug_tuple(match kind {
                    Operator::And => "And",
                    Operator::Or => "Or",
                    Operator::Xor => "Xor",
                });
                for child in children {
                    tuple.field(child);
                }
                tuple.finish()
            }
        }
    }
}

impl<T: Table> From<Predicate<T>> for Query<T> {
    fn from(predicate: Predicate<T>) -> Self {
        Query::from_node(Node::Leaf(predicate))
    }
}

impl<T: Table> From<&str> for Query<T> {
    fn from(text: &str) -> Self {
        Query::expr(text)
    }
}

impl<T: Table> From<String> for Query<T> {
    fn from(text: String) -> Self {
        Query::expr(text)
    }
}
