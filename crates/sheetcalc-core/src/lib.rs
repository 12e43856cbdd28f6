pub mod address;
pub mod error;
pub mod value;

pub use address::{col_from_label, col_to_label, Address, Size};
pub use error::CellError;
pub use value::{format_number, CellValue};

/// Leading character that marks cell input as a formula
pub const FORMULA_SIGN: char = '=';
/// Leading character that forces cell input to be read as text
pub const ESCAPE_SIGN: char = '\'';
