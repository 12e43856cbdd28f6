use serde::{Deserialize, Serialize};
use std::fmt;

/// Error outcome of evaluating a formula
///
/// These are stored and propagated as ordinary cell values; they never abort
/// a sheet mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellError {
    /// #VALUE! - An operand could not be read as a number
    Value,
    /// #ARITHM! - The computation produced a non-finite number
    Arithmetic,
}

impl CellError {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Value => "#VALUE!",
            CellError::Arithmetic => "#ARITHM!",
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
