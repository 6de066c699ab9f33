//! Combination algebra: AND/OR/XOR flattening and NOT collapse
//!
//! Combining under a kind merges same-kind operand lists instead of nesting,
//! so `q1 & q2 & q3 & q4` stays one 4-child AND node. A differently-kinded
//! subtree is always nested as a single opaque child.

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use crate::query::base::{Node, Query};
use crate::table::backend::Table;

/// n-ary boolean combination kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    Xor,
}

impl<T: Table> Query<T> {
    /// Combine two queries under `kind`, flattening same-kind operands
    pub fn combine(&self, other: impl Into<Query<T>>, kind: Operator) -> Query<T> {
        let other = other.into();
        let mut children = self.operands_for(kind);
        children.extend(other.operands_for(kind));
        Query::from_node(Node::Op { kind, children })
    }

    /// The operand list this query contributes under `kind`: its own children
    /// when its top node has the same kind, otherwise itself as one operand
    fn operands_for(&self, kind: Operator) -> Vec<Query<T>> {
        match &*self.node {
            Node::Op { kind: own, children } if *own == kind => children.clone(),
            _ => vec![self.clone()],
        }
    }

    /// Logical negation with one-level double-negation collapse
    ///
    /// Inverting a NOT node hands back a copy of its child instead of
    /// stacking a second NOT; deeper runs are left as they are.
    pub fn invert(&self) -> Query<T> {
        match &*self.node {
            Node::Not(child) => child.clone(),
            _ => Query::from_node(Node::Not(self.clone())),
        }
    }
}

impl<T: Table, R: Into<Query<T>>> BitAnd<R> for Query<T> {
    type Output = Query<T>;

    fn bitand(self, rhs: R) -> Query<T> {
        self.combine(rhs, Operator::And)
    }
}

impl<T: Table, R: Into<Query<T>>> BitAnd<R> for &Query<T> {
    type Output = Query<T>;

    fn bitand(self, rhs: R) -> Query<T> {
        self.combine(rhs, Operator::And)
    }
}

impl<T: Table, R: Into<Query<T>>> BitOr<R> for Query<T> {
    type Output = Query<T>;

    fn bitor(self, rhs: R) -> Query<T> {
        self.combine(rhs, Operator::Or)
    }
}

impl<T: Table, R: Into<Query<T>>> BitOr<R> for &Query<T> {
    type Output = Query<T>;

    fn bitor(self, rhs: R) -> Query<T> {
        self.combine(rhs, Operator::Or)
    }
}

impl<T: Table, R: Into<Query<T>>> BitXor<R> for Query<T> {
    type Output = Query<T>;

    fn bitxor(self, rhs: R) -> Query<T> {
        self.combine(rhs, Operator::Xor)
    }
}

impl<T: Table, R: Into<Query<T>>> BitXor<R> for &Query<T> {
    type Output = Query<T>;

    fn bitxor(self, rhs: R) -> Query<T> {
        self.combine(rhs, Operator::Xor)
    }
}

// Reflected forms: a bare expression on the left of an operator
impl<T: Table> BitAnd<Query<T>> for &str {
    type Output = Query<T>;

    fn bitand(self, rhs: Query<T>) -> Query<T> {
        Query::from(self).combine(rhs, Operator::And)
    }
}

impl<T: Table> BitOr<Query<T>> for &str {
    type Output = Query<T>;

    fn bitor(self, rhs: Query<T>) -> Query<T> {
        Query::from(self).combine(rhs, Operator::Or)
    }
}

impl<T: Table> BitXor<Query<T>> for &str {
    type Output = Query<T>;

    fn bitxor(self, rhs: Query<T>) -> Query<T> {
        Query::from(self).combine(rhs, Operator::Xor)
    }
}

// In-place forms rebind the receiver to the freshly combined tree; shared
// subtrees are never written through
impl<T: Table, R: Into<Query<T>>> BitAndAssign<R> for Query<T> {
    fn bitand_assign(&mut self, rhs: R) {
        let combined = self.combine(rhs, Operator::And);
        *self = combined;
    }
}

impl<T: Table, R: Into<Query<T>>> BitOrAssign<R> for Query<T> {
    fn bitor_assign(&mut self, rhs: R) {
        let combined = self.combine(rhs, Operator::Or);
        *self = combined;
    }
}

impl<T: Table, R: Into<Query<T>>> BitXorAssign<R> for Query<T> {
    fn bitxor_assign(&mut self, rhs: R) {
        let combined = self.combine(rhs, Operator::Xor);
        *self = combined;
    }
}

impl<T: Table> Not for Query<T> {
    type Output = Query<T>;

    fn not(self) -> Query<T> {
        self.invert()
    }
}

impl<T: Table> Not for &Query<T> {
    type Output = Query<T>;

    fn not(self) -> Query<T> {
        self.invert()
    }
}
