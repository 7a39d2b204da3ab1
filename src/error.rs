
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiftqlError {
    #[error("Operator '{operator}' is not supported for in-memory filtering of field '{field}'")]
    UnsupportedOperator { field: String, operator: String },
    #[error("Condition on field '{field}' is not supported for in-memory filtering: {detail}")]
    UnsupportedCondition { field: String, detail: String },
    #[error("Pattern '{pattern}' on field '{field}' does not compile: {message}")]
    InvalidPattern {
        field: String,
        pattern: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, SiftqlError>;
