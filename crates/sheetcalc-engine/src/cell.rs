use std::cell::OnceCell;
use std::collections::BTreeSet;

use sheetcalc_core::{Address, CellValue, ESCAPE_SIGN, FORMULA_SIGN};
use sheetcalc_formula::{Formula, FormulaError};

/// The content of a cell
#[derive(Debug, Clone, Default)]
pub enum CellContent {
    #[default]
    Empty,
    /// Raw text as entered, escape sign included
    Text(String),
    Formula(Formula),
}

impl CellContent {
    /// Interpret user input
    ///
    /// `""` is empty, `=` followed by at least one character is a formula,
    /// anything else (a lone `=` included) is text.
    pub fn parse(input: &str) -> Result<Self, FormulaError> {
        if input.is_empty() {
            return Ok(CellContent::Empty);
        }

        match input.strip_prefix(FORMULA_SIGN) {
            Some(expression) if !expression.is_empty() => {
                Ok(CellContent::Formula(Formula::parse(expression)?))
            }
            _ => Ok(CellContent::Text(input.to_string())),
        }
    }

    /// Text as the user would edit it
    pub fn text(&self) -> String {
        match self {
            CellContent::Empty => String::new(),
            CellContent::Text(text) => text.clone(),
            CellContent::Formula(formula) => format!("{}{}", FORMULA_SIGN, formula.expression()),
        }
    }

    /// Addresses read by this content, deduplicated and in row-major order
    pub fn referenced_cells(&self) -> BTreeSet<Address> {
        match self {
            CellContent::Formula(formula) => formula.referenced_cells().into_iter().collect(),
            CellContent::Empty | CellContent::Text(_) => BTreeSet::new(),
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, CellContent::Formula(_))
    }
}

/// A stored cell: content plus the memoized result of its formula
///
/// Only finite formula results are memoized. Errors are recomputed on every
/// read.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    content: CellContent,
    cache: OnceCell<f64>,
}

impl Cell {
    pub fn new(content: CellContent) -> Self {
        Cell {
            content,
            cache: OnceCell::new(),
        }
    }

    pub fn content(&self) -> &CellContent {
        &self.content
    }

    /// Replace the content, dropping any memoized value
    pub fn set_content(&mut self, content: CellContent) {
        self.content = content;
        self.invalidate_cache();
    }

    pub fn text(&self) -> String {
        self.content.text()
    }

    pub fn referenced_cells(&self) -> BTreeSet<Address> {
        self.content.referenced_cells()
    }

    /// Compute the value, reading other cells through `lookup`
    pub fn value(&self, lookup: impl Fn(Address) -> CellValue) -> CellValue {
        match &self.content {
            CellContent::Empty => CellValue::Number(0.0),
            CellContent::Text(text) => {
                let shown = text.strip_prefix(ESCAPE_SIGN).unwrap_or(text);
                CellValue::Text(shown.to_string())
            }
            CellContent::Formula(formula) => {
                if let Some(&cached) = self.cache.get() {
                    return CellValue::Number(cached);
                }
                match formula.evaluate(lookup) {
                    Ok(n) => {
                        let _ = self.cache.set(n);
                        CellValue::Number(n)
                    }
                    Err(e) => CellValue::Error(e),
                }
            }
        }
    }

    /// Whether reading the value needs other cells: only formulas without
    /// a memoized result do
    pub fn needs_evaluation(&self) -> bool {
        self.content.is_formula() && !self.has_cache()
    }

    pub fn has_cache(&self) -> bool {
        self.cache.get().is_some()
    }

    pub fn invalidate_cache(&mut self) {
        self.cache.take();
    }
}
