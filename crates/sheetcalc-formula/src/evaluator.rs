use crate::ast::{BinaryOp, Expr, UnaryOp};
use sheetcalc_core::{Address, CellError, CellValue};

/// Evaluator for formula AST
///
/// Cell contents are read through `get_cell_value`; the evaluator never
/// touches a sheet directly.
pub struct Evaluator<F>
where
    F: Fn(Address) -> CellValue,
{
    get_cell_value: F,
}

impl<F> Evaluator<F>
where
    F: Fn(Address) -> CellValue,
{
    pub fn new(get_cell_value: F) -> Self {
        Self { get_cell_value }
    }

    /// Evaluate an expression AST to a number
    ///
    /// The first error met is returned as is; later operands are not
    /// evaluated.
    pub fn evaluate(&self, expr: &Expr) -> Result<f64, CellError> {
        match expr {
            Expr::Number(n) => finite(*n),
            Expr::CellRef(address) => (self.get_cell_value)(*address).as_number(),
            Expr::Binary { left, op, right } => self.evaluate_binary(left, *op, right),
            Expr::Unary { op, operand } => self.evaluate_unary(*op, operand),
        }
    }

    fn evaluate_binary(&self, left: &Expr, op: BinaryOp, right: &Expr) -> Result<f64, CellError> {
        let a = self.evaluate(left)?;
        let b = self.evaluate(right)?;

        let result = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
        };
        finite(result)
    }

    fn evaluate_unary(&self, op: UnaryOp, operand: &Expr) -> Result<f64, CellError> {
        let value = self.evaluate(operand)?;

        match op {
            UnaryOp::Neg => Ok(-value),
            UnaryOp::Pos => Ok(value),
        }
    }
}

fn finite(n: f64) -> Result<f64, CellError> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(CellError::Arithmetic)
    }
}
