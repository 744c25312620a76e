use anyhow::{Result, bail};

/// Number of cells the operand stack holds unless configured otherwise.
pub const DEFAULT_SLOTS: usize = 255;

/// Size of a cell in bytes, counting the terminator the historical
/// fixed-size buffers reserved. A cell stores at most `cell_size - 1` bytes.
pub const DEFAULT_CELL_SIZE: usize = 255;

/// Capacity limits of the operand stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    slots: usize,
    cell_size: usize,
}

impl Config {
    /// Validate and build a configuration.
    pub fn new(slots: usize, cell_size: usize) -> Result<Self> {
        if slots == 0 {
            bail!("stack must have at least one slot");
        }
        if cell_size < 2 {
            bail!("cell size must be at least 2 bytes, got {}", cell_size);
        }
        Ok(Self { slots, cell_size })
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Longest value, in bytes, a single cell accepts.
    pub fn max_value_len(&self) -> usize {
        self.cell_size - 1
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slots: DEFAULT_SLOTS,
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}
