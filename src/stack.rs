use crate::config::Config;
use crate::error::{Error, Result};

/// ## Bounded stack of string cells
///
/// The single operand stack every word operates on. Depth never exceeds the
/// configured number of slots and no cell is longer than the configured cell
/// size; values that do not fit are rejected rather than truncated.
#[derive(Clone, PartialEq, Eq)]
pub struct Stack {
    config: Config,
    cells: Vec<String>,
}

impl std::fmt::Debug for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.cells)
    }
}

impl Default for Stack {
    fn default() -> Self {
        Stack::new(Config::default())
    }
}

impl Stack {
    pub fn new(config: Config) -> Stack {
        Stack {
            config,
            cells: Vec::with_capacity(config.slots()),
        }
    }

    /// Number of occupied cells.
    ///
    /// A depth outside `0..=slots` means the stack was corrupted; there is no
    /// sane way to continue, so the process aborts.
    pub fn depth(&self) -> usize {
        let depth = self.cells.len();
        if depth > self.config.slots() {
            log::error!(
                "stack depth {} exceeds {} slots, this shouldn't happen. aborting.",
                depth,
                self.config.slots()
            );
            std::process::abort();
        }
        depth
    }

    pub fn is_empty(&self) -> bool {
        self.depth() == 0
    }

    /// Fail with `Underflow` unless at least `n` cells are present.
    pub fn require(&self, n: usize) -> Result<()> {
        if self.depth() < n {
            Err(Error::Underflow)
        } else {
            Ok(())
        }
    }

    pub fn push(&mut self, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        if self.depth() + 1 > self.config.slots() {
            return Err(Error::Overflow(self.config.slots()));
        }
        self.check_fits(&value)?;
        self.cells.push(value);
        Ok(())
    }

    /// Fail with `InvalidOperand` if `value` is too long for a cell.
    pub fn check_fits(&self, value: &str) -> Result<()> {
        if value.len() > self.config.max_value_len() {
            return Err(Error::InvalidOperand(format!(
                "value of {} bytes exceeds cell size of {} bytes",
                value.len(),
                self.config.max_value_len()
            )));
        }
        Ok(())
    }

    pub fn pop(&mut self) -> Result<String> {
        self.cells.pop().ok_or(Error::Underflow)
    }

    /// Pop two cells, returning `(second, top)` in push order.
    pub fn pop_2(&mut self) -> Result<(String, String)> {
        self.require(2)?;
        let two = self.pop()?;
        let one = self.pop()?;
        Ok((one, two))
    }

    pub fn peek(&self) -> Result<&str> {
        self.cells.last().map(String::as_str).ok_or(Error::Underflow)
    }

    /// Cell `n` positions below the top; `peek_at(0)` is the top.
    pub fn peek_at(&self, n: usize) -> Result<&str> {
        let depth = self.depth();
        if n >= depth {
            return Err(Error::Underflow);
        }
        Ok(&self.cells[depth - 1 - n])
    }

    pub fn clear_all(&mut self) {
        self.cells.clear();
    }

    /// All cells bottom to top, each followed by a tab.
    pub fn show(&self) -> String {
        let mut s = String::new();
        for cell in &self.cells {
            s.push_str(cell);
            s.push('\t');
        }
        s
    }

    /// Cells bottom to top.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}
