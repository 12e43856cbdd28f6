pub mod ast;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use error::FormulaError;
pub use evaluator::Evaluator;
pub use lexer::{Lexer, Token};
pub use parser::Parser;

use sheetcalc_core::{Address, CellError, CellValue};

/// A parsed formula expression (the text after the leading `=`)
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    ast: Expr,
}

impl Formula {
    /// Parse formula text into an expression tree
    pub fn parse(expression: &str) -> Result<Self, FormulaError> {
        let tokens = Lexer::new(expression).tokenize()?;
        let ast = Parser::new(tokens).parse()?;
        Ok(Self { ast })
    }

    /// Evaluate against a cell lookup
    ///
    /// Absent cells are the caller's concern: `lookup` must answer for every
    /// address (typically with `Number(0.0)` for missing cells).
    pub fn evaluate(&self, lookup: impl Fn(Address) -> CellValue) -> Result<f64, CellError> {
        Evaluator::new(lookup).evaluate(&self.ast)
    }

    /// Canonical text without the leading `=`
    pub fn expression(&self) -> String {
        self.ast.to_string()
    }

    /// Referenced addresses in first-appearance order, duplicates included
    pub fn referenced_cells(&self) -> Vec<Address> {
        self.ast.references()
    }
}
