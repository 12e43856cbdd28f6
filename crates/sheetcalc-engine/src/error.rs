use sheetcalc_core::Address;
use sheetcalc_formula::FormulaError;
use thiserror::Error;

/// Faults that abort a sheet operation
///
/// A call that returns one of these leaves the sheet exactly as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SheetError {
    #[error("invalid position ({}, {})", .0.row, .0.col)]
    InvalidPosition(Address),

    #[error("invalid formula: {0}")]
    Formula(#[from] FormulaError),

    #[error("circular reference at {position}: {}", format_path(.cycle))]
    CircularDependency {
        position: Address,
        cycle: Vec<Address>,
    },
}

pub type Result<T> = std::result::Result<T, SheetError>;

fn format_path(cycle: &[Address]) -> String {
    cycle
        .iter()
        .map(Address::to_a1)
        .collect::<Vec<_>>()
        .join(" -> ")
}
