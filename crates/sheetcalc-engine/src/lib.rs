//! Cell storage, reference tracking and recalculation for a single sheet

pub mod bounds;
pub mod cell;
pub mod dependency;
pub mod error;
pub mod sheet;

pub use bounds::BoundsTracker;
pub use cell::{Cell, CellContent};
pub use dependency::DependencyGraph;
pub use error::{Result, SheetError};
pub use sheet::{CellView, Sheet};

pub use sheetcalc_core::{Address, CellError, CellValue, Size};
pub use sheetcalc_formula::{Formula, FormulaError};
