use std::fmt;

use sheetcalc_core::Address;

/// Abstract Syntax Tree for formula expressions
///
/// Parentheses are not kept as nodes; `Display` re-inserts only the ones the
/// tree shape requires.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),

    // Cell reference (e.g., A1)
    CellRef(Address),

    // Binary operation
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    // Unary operation
    Unary { op: UnaryOp, operand: Box<Expr> },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    /// Get the precedence of this operator (higher = binds tighter)
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }

    /// Whether `a op (b op' c)` differs from `a op b op' c` for a right
    /// operand of equal precedence
    fn needs_grouped_right(&self) -> bool {
        matches!(self, BinaryOp::Sub | BinaryOp::Div)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg, // -
    Pos, // +
}

const UNARY_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 4;

impl Expr {
    /// Create a cell reference expression
    pub fn cell_ref(row: i32, col: i32) -> Self {
        Expr::CellRef(Address::new(row, col))
    }

    /// Create a binary expression
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a unary expression
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Number(_) | Expr::CellRef(_) => ATOM_PRECEDENCE,
            Expr::Unary { .. } => UNARY_PRECEDENCE,
            Expr::Binary { op, .. } => op.precedence(),
        }
    }

    /// Cell references in order of first appearance, duplicates included
    pub fn references(&self) -> Vec<Address> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references(&self, refs: &mut Vec<Address>) {
        match self {
            Expr::Number(_) => {}
            Expr::CellRef(address) => refs.push(*address),
            Expr::Binary { left, right, .. } => {
                left.collect_references(refs);
                right.collect_references(refs);
            }
            Expr::Unary { operand, .. } => operand.collect_references(refs),
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, grouped: bool) -> fmt::Result {
    if grouped {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => {
                // Format numbers without unnecessary decimals
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    // Debug keeps the exponent form, so the text parses back
                    write!(f, "{:?}", n)
                }
            }
            Expr::CellRef(address) => write!(f, "{}", address),
            Expr::Binary { left, op, right } => {
                let prec = op.precedence();
                write_operand(f, left, left.precedence() < prec)?;
                write!(f, "{}", op)?;
                let right_prec = right.precedence();
                let group_right =
                    right_prec < prec || (right_prec == prec && op.needs_grouped_right());
                write_operand(f, right, group_right)
            }
            Expr::Unary { op, operand } => {
                write!(f, "{}", op)?;
                write_operand(f, operand, operand.precedence() < UNARY_PRECEDENCE)
            }
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Pos => write!(f, "+"),
        }
    }
}
