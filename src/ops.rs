//! Arithmetic and stack-shuffling words.
//!
//! Every operation checks the depth it needs up front and leaves the stack
//! untouched when it fails. Arithmetic validates both operands, and checks
//! that the result fits in a cell, before popping anything.

use crate::error::{Error, Result};
use crate::stack::Stack;

/// Words that operate on the stack alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOp {
    /// `.s`: display the whole stack.
    Show,
    /// `.`: pop and display the top cell.
    Dot,
    /// `.dropall`: empty the stack.
    DropAll,
    Plus,
    Minus,
    Swap,
    Dup,
    Over,
    Drop,
    Rot,
    MinusRot,
}

impl StackOp {
    pub const ALL: [StackOp; 11] = [
        StackOp::Show,
        StackOp::Dot,
        StackOp::DropAll,
        StackOp::Plus,
        StackOp::Minus,
        StackOp::Swap,
        StackOp::Dup,
        StackOp::Over,
        StackOp::Drop,
        StackOp::Rot,
        StackOp::MinusRot,
    ];

    /// The word that invokes this operation.
    pub fn name(self) -> &'static str {
        match self {
            StackOp::Show => ".s",
            StackOp::Dot => ".",
            StackOp::DropAll => ".dropall",
            StackOp::Plus => "+",
            StackOp::Minus => "-",
            StackOp::Swap => ".swap",
            StackOp::Dup => ".dup",
            StackOp::Over => ".over",
            StackOp::Drop => ".drop",
            StackOp::Rot => ".rot",
            StackOp::MinusRot => ".-rot",
        }
    }

    pub fn from_name(word: &str) -> Option<StackOp> {
        StackOp::ALL.into_iter().find(|op| op.name() == word)
    }

    /// Run the operation. Returns a line to display, if the operation
    /// produces output.
    pub fn apply(self, stack: &mut Stack) -> Result<Option<String>> {
        match self {
            StackOp::Show => return Ok(Some(stack.show())),
            StackOp::Dot => return stack.pop().map(Some),
            StackOp::DropAll => stack.clear_all(),
            StackOp::Plus => arithmetic(stack, '+', i64::checked_add)?,
            StackOp::Minus => arithmetic(stack, '-', i64::checked_sub)?,
            StackOp::Swap => swap(stack)?,
            StackOp::Dup => dup(stack)?,
            StackOp::Over => over(stack)?,
            StackOp::Drop => {
                stack.pop()?;
            }
            StackOp::Rot => rot(stack)?,
            StackOp::MinusRot => {
                stack.require(3)?;
                rot(stack)?;
                rot(stack)?;
            }
        }
        Ok(None)
    }
}

/// Parse a cell holding an unsigned decimal integer. Signs and whitespace
/// are not accepted.
pub fn parse_int(cell: &str) -> Result<i64> {
    if cell.is_empty() || !cell.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Type(cell.to_string()));
    }
    cell.parse::<i64>()
        .map_err(|_| Error::Type(cell.to_string()))
}

/// `[.., b, a]` becomes `[.., f(b, a)]`.
fn arithmetic(stack: &mut Stack, op: char, f: fn(i64, i64) -> Option<i64>) -> Result<()> {
    stack.require(2)?;
    let a = parse_int(stack.peek_at(0)?)?;
    let b = parse_int(stack.peek_at(1)?)?;
    let result = f(b, a).ok_or(Error::IntegerOverflow { lhs: b, op, rhs: a })?;
    let result = result.to_string();
    stack.check_fits(&result)?;
    stack.pop_2()?;
    stack.push(result)
}

fn swap(stack: &mut Stack) -> Result<()> {
    let (b, a) = stack.pop_2()?;
    stack.push(a)?;
    stack.push(b)
}

fn dup(stack: &mut Stack) -> Result<()> {
    let top = stack.peek()?.to_string();
    stack.push(top)
}

fn over(stack: &mut Stack) -> Result<()> {
    let second = stack.peek_at(1)?.to_string();
    stack.push(second)
}

/// `[.., a, b, c]` becomes `[.., b, c, a]`.
fn rot(stack: &mut Stack) -> Result<()> {
    stack.require(3)?;
    let c = stack.pop()?;
    let (a, b) = stack.pop_2()?;
    stack.push(b)?;
    stack.push(c)?;
    stack.push(a)
}
