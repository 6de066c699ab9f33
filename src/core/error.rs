use thiserror::Error;

/// Error type definitions
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid predicate: {0}")]
    InvalidPredicate(String),

    #[error("Invalid combination: {0}")]
    InvalidCombination(String),

    #[error("Expression error: {0}")]
    Expression(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column type mismatch: expected {expected:?}, found {found:?}")]
    ColumnTypeMismatch {
        expected: crate::table::column::ColumnType,
        found: crate::table::column::ColumnType,
    },

    #[error("Length mismatch: expected {expected}, actual {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("Inconsistent row count: expected {expected}, found {found}")]
    InconsistentRowCount { expected: usize, found: usize },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
