//! Vectorized expression evaluation over named columns
//!
//! Expressions are evaluated column-at-a-time: identifiers resolve to whole
//! columns, literals stay scalar until an operation broadcasts them, and the
//! final value must reduce to a boolean mask with one entry per row.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;

use super::ast::{BinaryOp, Expr, LiteralValue, UnaryOp};
use super::lexer_parser::parse_str;
use crate::core::error::{Error, Result};
use crate::core::mask::Mask;
use crate::table::column::Column;

/// Function registered with a [`QueryContext`], applied one row at a time
pub type ExprFn = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Expression evaluation context: variable bindings and registered functions
#[derive(Clone)]
pub struct QueryContext {
    variables: HashMap<String, LiteralValue>,
    functions: HashMap<String, ExprFn>,
}

impl fmt::Debug for QueryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryContext")
            .field("variables", &self.variables)
            .field("functions", &format!("{} functions", self.functions.len()))
            .finish()
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        let mut context = Self {
            variables: HashMap::new(),
            functions: HashMap::new(),
        };
        context.add_builtin_functions();
        context
    }
}

impl QueryContext {
    /// Create a new context with the built-in math functions
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable usable from expressions
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<LiteralValue>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Look up a bound variable
    pub fn variable(&self, name: &str) -> Option<&LiteralValue> {
        self.variables.get(name)
    }

    /// Register a custom function callable from expressions
    pub fn add_function<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(func));
    }

    /// Look up a registered function
    pub fn function(&self, name: &str) -> Option<&ExprFn> {
        self.functions.get(name)
    }

    /// Add built-in mathematical functions
    fn add_builtin_functions(&mut self) {
        self.add_function("abs", |args| if args.is_empty() { 0.0 } else { args[0].abs() });
        self.add_function("sqrt", |args| if args.is_empty() { 0.0 } else { args[0].sqrt() });
        self.add_function("log", |args| if args.is_empty() { 0.0 } else { args[0].ln() });
        self.add_function("log10", |args| if args.is_empty() { 0.0 } else { args[0].log10() });
        self.add_function("exp", |args| if args.is_empty() { 0.0 } else { args[0].exp() });
        self.add_function("sin", |args| if args.is_empty() { 0.0 } else { args[0].sin() });
        self.add_function("cos", |args| if args.is_empty() { 0.0 } else { args[0].cos() });
        self.add_function("tan", |args| if args.is_empty() { 0.0 } else { args[0].tan() });
        self.add_function("floor", |args| if args.is_empty() { 0.0 } else { args[0].floor() });
        self.add_function("ceil", |args| if args.is_empty() { 0.0 } else { args[0].ceil() });
        self.add_function("round", |args| if args.is_empty() { 0.0 } else { args[0].round() });
    }
}

lazy_static! {
    static ref DEFAULT_CONTEXT: RwLock<QueryContext> = RwLock::new(QueryContext::new());
}

/// Replace the process-wide default context consulted when queries evaluate
/// string expressions
///
/// Configure before use: the binding is read at each evaluation call and is
/// not synchronized with evaluations running on other threads.
pub fn register_context(context: QueryContext) {
    *DEFAULT_CONTEXT.write().unwrap() = context;
}

/// Snapshot of the process-wide default context
pub fn default_context() -> QueryContext {
    DEFAULT_CONTEXT.read().unwrap().clone()
}

/// Compile and evaluate a query expression into a boolean mask
pub fn evaluate(
    text: &str,
    columns: &HashMap<String, Column>,
    context: &QueryContext,
    nrows: usize,
) -> Result<Mask> {
    let expr = parse_str(text)?;
    Evaluator::new(columns, context).evaluate_mask(&expr, nrows)
}

/// Columnar value produced while evaluating an expression
#[derive(Debug, Clone)]
enum Value {
    Float(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
    FloatScalar(f64),
    BoolScalar(bool),
    StrScalar(String),
}

impl Value {
    fn kind_name(&self) -> &'static str {
        match self {
            Value::Float(_) | Value::FloatScalar(_) => "number",
            Value::Bool(_) | Value::BoolScalar(_) => "boolean",
            Value::Str(_) | Value::StrScalar(_) => "string",
        }
    }

    fn is_string(&self) -> bool {
        matches!(self, Value::Str(_) | Value::StrScalar(_))
    }

    fn is_boolean(&self) -> bool {
        matches!(self, Value::Bool(_) | Value::BoolScalar(_))
    }
}

/// Numeric operand view, scalar or per-row
enum Floats {
    Scalar(f64),
    Array(Vec<f64>),
}

impl Floats {
    fn at(&self, index: usize) -> f64 {
        match self {
            Floats::Scalar(value) => *value,
            Floats::Array(data) => data[index],
        }
    }
}

enum Bools {
    Scalar(bool),
    Array(Vec<bool>),
}

enum Strs {
    Scalar(String),
    Array(Vec<String>),
}

fn as_floats(value: Value, op: &str) -> Result<Floats> {
    match value {
        Value::FloatScalar(v) => Ok(Floats::Scalar(v)),
        Value::Float(v) => Ok(Floats::Array(v)),
        other => Err(Error::Evaluation(format!(
            "'{}' requires numeric operands, found {}",
            op,
            other.kind_name()
        ))),
    }
}

fn as_bools(value: Value, op: &str) -> Result<Bools> {
    match value {
        Value::BoolScalar(v) => Ok(Bools::Scalar(v)),
        Value::Bool(v) => Ok(Bools::Array(v)),
        other => Err(Error::Evaluation(format!(
            "'{}' requires boolean operands, found {}",
            op,
            other.kind_name()
        ))),
    }
}

fn as_strs(value: Value, op: &str) -> Result<Strs> {
    match value {
        Value::StrScalar(v) => Ok(Strs::Scalar(v)),
        Value::Str(v) => Ok(Strs::Array(v)),
        other => Err(Error::Evaluation(format!(
            "'{}' requires string operands, found {}",
            op,
            other.kind_name()
        ))),
    }
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::LengthMismatch { expected, actual });
    }
    Ok(())
}

fn numeric_binary(left: Value, right: Value, op: &str, f: fn(f64, f64) -> f64) -> Result<Value> {
    match (as_floats(left, op)?, as_floats(right, op)?) {
        (Floats::Scalar(a), Floats::Scalar(b)) => Ok(Value::FloatScalar(f(a, b))),
        (Floats::Scalar(a), Floats::Array(b)) => {
            Ok(Value::Float(b.into_iter().map(|x| f(a, x)).collect()))
        }
        (Floats::Array(a), Floats::Scalar(b)) => {
            Ok(Value::Float(a.into_iter().map(|x| f(x, b)).collect()))
        }
        (Floats::Array(a), Floats::Array(b)) => {
            check_len(a.len(), b.len())?;
            Ok(Value::Float(
                a.into_iter().zip(b).map(|(x, y)| f(x, y)).collect(),
            ))
        }
    }
}

fn numeric_compare(left: Value, right: Value, op: &str, f: fn(f64, f64) -> bool) -> Result<Value> {
    match (as_floats(left, op)?, as_floats(right, op)?) {
        (Floats::Scalar(a), Floats::Scalar(b)) => Ok(Value::BoolScalar(f(a, b))),
        (Floats::Scalar(a), Floats::Array(b)) => {
            Ok(Value::Bool(b.into_iter().map(|x| f(a, x)).collect()))
        }
        (Floats::Array(a), Floats::Scalar(b)) => {
            Ok(Value::Bool(a.into_iter().map(|x| f(x, b)).collect()))
        }
        (Floats::Array(a), Floats::Array(b)) => {
            check_len(a.len(), b.len())?;
            Ok(Value::Bool(
                a.into_iter().zip(b).map(|(x, y)| f(x, y)).collect(),
            ))
        }
    }
}

fn string_compare(left: Value, right: Value, op: &str, f: fn(&str, &str) -> bool) -> Result<Value> {
    match (as_strs(left, op)?, as_strs(right, op)?) {
        (Strs::Scalar(a), Strs::Scalar(b)) => Ok(Value::BoolScalar(f(&a, &b))),
        (Strs::Scalar(a), Strs::Array(b)) => {
            Ok(Value::Bool(b.iter().map(|x| f(&a, x)).collect()))
        }
        (Strs::Array(a), Strs::Scalar(b)) => {
            Ok(Value::Bool(a.iter().map(|x| f(x, &b)).collect()))
        }
        (Strs::Array(a), Strs::Array(b)) => {
            check_len(a.len(), b.len())?;
            Ok(Value::Bool(
                a.iter().zip(&b).map(|(x, y)| f(x, y)).collect(),
            ))
        }
    }
}

fn boolean_binary(left: Value, right: Value, op: &str, f: fn(bool, bool) -> bool) -> Result<Value> {
    match (as_bools(left, op)?, as_bools(right, op)?) {
        (Bools::Scalar(a), Bools::Scalar(b)) => Ok(Value::BoolScalar(f(a, b))),
        (Bools::Scalar(a), Bools::Array(b)) => {
            Ok(Value::Bool(b.into_iter().map(|x| f(a, x)).collect()))
        }
        (Bools::Array(a), Bools::Scalar(b)) => {
            Ok(Value::Bool(a.into_iter().map(|x| f(x, b)).collect()))
        }
        (Bools::Array(a), Bools::Array(b)) => {
            check_len(a.len(), b.len())?;
            Ok(Value::Bool(
                a.into_iter().zip(b).map(|(x, y)| f(x, y)).collect(),
            ))
        }
    }
}

fn compare(left: Value, right: Value, op: BinaryOp) -> Result<Value> {
    if left.is_string() || right.is_string() {
        // Ordering comparisons on strings are lexicographic
        let f: fn(&str, &str) -> bool = match op {
            BinaryOp::Equal => |a, b| a == b,
            BinaryOp::NotEqual => |a, b| a != b,
            BinaryOp::LessThan => |a, b| a < b,
            BinaryOp::LessThanOrEqual => |a, b| a <= b,
            BinaryOp::GreaterThan => |a, b| a > b,
            BinaryOp::GreaterThanOrEqual => |a, b| a >= b,
            _ => {
                return Err(Error::Evaluation(format!(
                    "{:?} is not a comparison operator",
                    op
                )))
            }
        };
        return string_compare(left, right, "comparison", f);
    }

    if left.is_boolean() || right.is_boolean() {
        let f: fn(bool, bool) -> bool = match op {
            BinaryOp::Equal => |a, b| a == b,
            BinaryOp::NotEqual => |a, b| a != b,
            _ => {
                return Err(Error::Evaluation(
                    "booleans only support == and != comparisons".to_string(),
                ))
            }
        };
        return boolean_binary(left, right, "comparison", f);
    }

    let f: fn(f64, f64) -> bool = match op {
        BinaryOp::Equal => |a, b| a == b,
        BinaryOp::NotEqual => |a, b| a != b,
        BinaryOp::LessThan => |a, b| a < b,
        BinaryOp::LessThanOrEqual => |a, b| a <= b,
        BinaryOp::GreaterThan => |a, b| a > b,
        BinaryOp::GreaterThanOrEqual => |a, b| a >= b,
        _ => {
            return Err(Error::Evaluation(format!(
                "{:?} is not a comparison operator",
                op
            )))
        }
    };
    numeric_compare(left, right, "comparison", f)
}

fn column_value(column: &Column) -> Value {
    match column {
        Column::Int64(data) => Value::Float(data.iter().map(|&v| v as f64).collect()),
        Column::Float64(data) => Value::Float(data.to_vec()),
        Column::Str(data) => Value::Str(data.to_vec()),
        Column::Bool(data) => Value::Bool(data.to_vec()),
    }
}

/// Vectorized evaluator for query expressions
pub struct Evaluator<'a> {
    columns: &'a HashMap<String, Column>,
    context: &'a QueryContext,
}

impl<'a> Evaluator<'a> {
    /// Create a new evaluator over a column mapping and a context
    pub fn new(columns: &'a HashMap<String, Column>, context: &'a QueryContext) -> Self {
        Self { columns, context }
    }

    /// Evaluate `expr` into a boolean mask of `nrows` entries
    pub fn evaluate_mask(&self, expr: &Expr, nrows: usize) -> Result<Mask> {
        match self.evaluate(expr)? {
            Value::Bool(mask) => Ok(mask),
            Value::BoolScalar(value) => Ok(vec![value; nrows]),
            other => Err(Error::Evaluation(format!(
                "expression evaluates to a {}, not a boolean mask",
                other.kind_name()
            ))),
        }
    }

    fn evaluate(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(LiteralValue::Number(value)) => Ok(Value::FloatScalar(*value)),
            Expr::Literal(LiteralValue::String(value)) => Ok(Value::StrScalar(value.clone())),
            Expr::Literal(LiteralValue::Boolean(value)) => Ok(Value::BoolScalar(*value)),
            Expr::Column(name) => self.resolve(name),
            Expr::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                match op {
                    UnaryOp::Not => match as_bools(value, "not")? {
                        Bools::Scalar(v) => Ok(Value::BoolScalar(!v)),
                        Bools::Array(v) => Ok(Value::Bool(v.into_iter().map(|b| !b).collect())),
                    },
                    UnaryOp::Negate => match as_floats(value, "-")? {
                        Floats::Scalar(v) => Ok(Value::FloatScalar(-v)),
                        Floats::Array(v) => Ok(Value::Float(v.into_iter().map(|x| -x).collect())),
                    },
                }
            }
            Expr::Binary { left, op, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                match op {
                    BinaryOp::Add => numeric_binary(left, right, "+", |a, b| a + b),
                    BinaryOp::Subtract => numeric_binary(left, right, "-", |a, b| a - b),
                    BinaryOp::Multiply => numeric_binary(left, right, "*", |a, b| a * b),
                    BinaryOp::Divide => numeric_binary(left, right, "/", |a, b| a / b),
                    BinaryOp::Modulo => numeric_binary(left, right, "%", |a, b| a % b),
                    BinaryOp::Power => numeric_binary(left, right, "**", f64::powf),
                    BinaryOp::And => boolean_binary(left, right, "&&", |a, b| a && b),
                    BinaryOp::Or => boolean_binary(left, right, "||", |a, b| a || b),
                    comparison => compare(left, right, *comparison),
                }
            }
            Expr::Function { name, args } => self.call_function(name, args),
        }
    }

    /// Resolve an identifier: columns shadow context variables
    fn resolve(&self, name: &str) -> Result<Value> {
        if let Some(column) = self.columns.get(name) {
            return Ok(column_value(column));
        }
        match self.context.variable(name) {
            Some(LiteralValue::Number(value)) => Ok(Value::FloatScalar(*value)),
            Some(LiteralValue::String(value)) => Ok(Value::StrScalar(value.clone())),
            Some(LiteralValue::Boolean(value)) => Ok(Value::BoolScalar(*value)),
            None => Err(Error::ColumnNotFound(name.to_string())),
        }
    }

    fn call_function(&self, name: &str, args: &[Expr]) -> Result<Value> {
        let func = self
            .context
            .function(name)
            .cloned()
            .ok_or_else(|| Error::Evaluation(format!("Unknown function: {}", name)))?;

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(as_floats(self.evaluate(arg)?, name)?);
        }

        // All per-row arguments must agree on the row count
        let mut rows: Option<usize> = None;
        for value in &values {
            if let Floats::Array(data) = value {
                match rows {
                    None => rows = Some(data.len()),
                    Some(n) => check_len(n, data.len())?,
                }
            }
        }

        match rows {
            None => {
                let row: Vec<f64> = values.iter().map(|v| v.at(0)).collect();
                Ok(Value::FloatScalar(func(&row)))
            }
            Some(n) => {
                let mut out = Vec::with_capacity(n);
                let mut row = vec![0.0; values.len()];
                for i in 0..n {
                    for (slot, value) in row.iter_mut().zip(&values) {
                        *slot = value.at(i);
                    }
                    out.push(func(&row));
                }
                Ok(Value::Float(out))
            }
        }
    }
}
