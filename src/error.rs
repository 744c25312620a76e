//! Errors reported by the interpreter.
//!
//! Every variant here is a user-level error: it is reported and the
//! interpreter moves on to the next token. Internal corruption of the stack
//! is not represented, it aborts the process instead.

use crate::lexer::LexingError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not enough cells on the stack for the requested operation.
    #[error("stack underflow error")]
    Underflow,

    /// A push would exceed the configured number of slots.
    #[error("stack overflow error: number of words on stack would be greater than {0}")]
    Overflow(usize),

    /// The value can not be stored in a cell.
    #[error("invalid operand: {0}")]
    InvalidOperand(String),

    /// Arithmetic on something that is not an unsigned decimal integer.
    #[error("type error with given argument: {0}")]
    Type(String),

    /// The result of an arithmetic operation does not fit the integer type.
    #[error("integer overflow computing {lhs} {op} {rhs}")]
    IntegerOverflow { lhs: i64, op: char, rhs: i64 },

    #[error(transparent)]
    Lexing(#[from] LexingError),

    #[error("variable name can't begin with $")]
    DollarVariable,

    /// The external program could not be started.
    #[error("error starting {program}: {reason}")]
    Launch { program: String, reason: String },

    /// The working directory could not be changed.
    #[error("cd: {path}: {reason}")]
    ChangeDir { path: String, reason: String },

    /// The external program did not exit normally.
    #[error("prog {program} has not exited: {status}")]
    Process { program: String, status: String },
}
