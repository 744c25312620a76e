//! A stack calculator that doubles as a shell.
//!
//! Input is read a line at a time and split into words. Words either push
//! themselves onto a single operand stack or operate on it: integer
//! arithmetic (`+`, `-`), stack shuffling (`.swap`, `.dup`, `.over`, `.rot`,
//! `.-rot`, `.drop`, `.dropall`), display (`.`, `.s`), environment variables
//! (`$name`, `$`, `!`) and running programs (`;`, `.name`), which take the
//! rest of the stack as their arguments and leave their exit code behind.
//!
//! The main entry point is [`Interpreter`]. Reading lines and running
//! programs go through the [`LineSource`] and [`ProgramRunner`] traits so
//! the core can be driven without a terminal or child processes.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
mod error;
mod external;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod ops;
pub mod stack;

pub use command::{ExitCode, ProgramRunner};
pub use config::Config;
pub use env::Environment;
pub use error::{Error, Result};
pub use external::{ExternalRunner, resolve_program};
pub use interpreter::{Interpreter, Word, classify};
pub use io_adapters::{EditorSource, LineSource, ReaderSource};
pub use stack::Stack;
