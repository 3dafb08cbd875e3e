//! Contract execution error types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("contract source failed to parse: {0}")]
    Parse(String),
    #[error("function '{0}' not found in contract")]
    FunctionNotFound(String),
    #[error("function '{function}' expects {expected} argument(s), got {got}")]
    ArgumentMismatch {
        function: String,
        expected: usize,
        got: usize,
    },
    #[error("type error: {0}")]
    Type(String),
    #[error("execution exceeded the gas limit")]
    OutOfGas,
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),
}
