use crate::builtin;
use crate::command::ProgramRunner;
use crate::config::Config;
use crate::env::{self, Environment};
use crate::error::{Error, Result};
use crate::external::{self, ExternalRunner};
use crate::io_adapters::LineSource;
use crate::lexer;
use crate::ops::StackOp;
use crate::stack::Stack;
use std::io::Write;

/// What a word does, decided from its spelling alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Word<'a> {
    /// A stack or arithmetic operation such as `+` or `.swap`.
    Op(StackOp),
    /// `!`: bind a variable.
    SetVariable,
    /// `$`: look up the variable named on the stack.
    GetVariable,
    /// `;`: run the program named on top of the stack.
    Execute,
    /// `.cd`: change the working directory.
    ChangeDir,
    /// `$$...`: rejected, variable names can't begin with `$`.
    DollarName,
    /// `$name`: push `name` and look it up.
    Variable(&'a str),
    /// `.name`: push `name` and run it with the stack as arguments.
    Program(&'a str),
    /// Anything else, pushed as is. `$.name` pushes `.name`.
    Literal(&'a str),
}

/// Classify a word. Exact keywords win over sigil forms, and a word that
/// matches nothing is a literal.
pub fn classify(word: &str) -> Word<'_> {
    if let Some(op) = StackOp::from_name(word) {
        return Word::Op(op);
    }
    match word {
        "!" => return Word::SetVariable,
        "$" => return Word::GetVariable,
        ";" => return Word::Execute,
        ".cd" => return Word::ChangeDir,
        _ => {}
    }
    if word.starts_with("$$") {
        Word::DollarName
    } else if let Some(rest) = word.strip_prefix('$') {
        if rest.starts_with('.') {
            Word::Literal(rest)
        } else {
            Word::Variable(rest)
        }
    } else if let Some(rest) = word.strip_prefix('.').filter(|rest| !rest.is_empty()) {
        Word::Program(rest)
    } else {
        Word::Literal(word)
    }
}

/// The read-eval-print loop over a single operand stack.
///
/// Words on a line run left to right, lines in the order they arrive. An
/// error is reported with the line and column of the word that caused it and
/// evaluation carries on with the next word; a malformed quote also drops the
/// rest of its line.
///
/// Example
/// ```
/// use stack_shell::Interpreter;
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// let mut diag = Vec::new();
/// sh.eval_line("3 4 + .", &mut out, &mut diag).unwrap();
/// assert_eq!(out, b"7\n");
/// ```
pub struct Interpreter {
    stack: Stack,
    env: Environment,
    runner: Box<dyn ProgramRunner>,
    line_number: usize,
}

impl Interpreter {
    pub fn new(config: Config, env: Environment, runner: Box<dyn ProgramRunner>) -> Self {
        Self {
            stack: Stack::new(config),
            env,
            runner,
            line_number: 0,
        }
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// The prompt shows the current depth.
    pub fn prompt(&self) -> String {
        format!("{} > ", self.stack.depth())
    }

    /// Evaluate one word. Returns the text to display, if any.
    pub fn eval_word(&mut self, word: &str) -> Result<Option<String>> {
        match classify(word) {
            Word::Op(op) => return op.apply(&mut self.stack),
            Word::SetVariable => env::set_variable(&mut self.stack, &mut self.env)?,
            Word::GetVariable => env::get_variable(&mut self.stack, &self.env)?,
            Word::Execute => external::execute(&mut self.stack, &self.env, self.runner.as_mut())?,
            Word::ChangeDir => builtin::change_dir(&mut self.stack, &mut self.env)?,
            Word::DollarName => return Err(Error::DollarVariable),
            Word::Variable(name) => {
                self.stack.push(name)?;
                env::get_variable(&mut self.stack, &self.env)?;
            }
            Word::Program(name) => {
                self.stack.push(name)?;
                external::execute(&mut self.stack, &self.env, self.runner.as_mut())?;
            }
            Word::Literal(text) => self.stack.push(text)?,
        }
        Ok(None)
    }

    /// Evaluate every word of `line`, writing displayed values to `out` and
    /// diagnostics to `diag`. Only I/O failures on those writers are errors.
    pub fn eval_line(
        &mut self,
        line: &str,
        out: &mut dyn Write,
        diag: &mut dyn Write,
    ) -> anyhow::Result<()> {
        self.line_number += 1;
        for token in lexer::tokens(line) {
            let token = match token {
                Ok(token) => token,
                Err(e) => {
                    self.report(diag, e.column(), &Error::from(e))?;
                    break;
                }
            };
            log::debug!("{}:{}: {:?}", self.line_number, token.column + 1, classify(&token.text));
            match self.eval_word(&token.text) {
                Ok(Some(text)) => {
                    writeln!(out, "{}", text)?;
                    out.flush()?;
                }
                Ok(None) => {}
                Err(e) => self.report(diag, token.column, &e)?,
            }
        }
        Ok(())
    }

    /// Read and evaluate lines until the source runs dry.
    pub fn repl(
        &mut self,
        source: &mut dyn LineSource,
        out: &mut dyn Write,
        diag: &mut dyn Write,
    ) -> anyhow::Result<()> {
        while let Some(line) = source.next_line(&self.prompt())? {
            self.eval_line(&line, out, diag)?;
        }
        Ok(())
    }

    fn report(&self, diag: &mut dyn Write, column: usize, error: &Error) -> anyhow::Result<()> {
        writeln!(diag, "{}:{}: {}", self.line_number, column + 1, error)?;
        Ok(())
    }
}

impl Default for Interpreter {
    /// Default limits, the process environment and real child processes.
    fn default() -> Self {
        Self::new(
            Config::default(),
            Environment::new(),
            Box::new(ExternalRunner),
        )
    }
}
