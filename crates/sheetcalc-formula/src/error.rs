use thiserror::Error;

/// Reasons a formula expression can be rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("invalid cell reference: {0}")]
    InvalidReference(String),

    #[error("unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of formula")]
    UnexpectedEnd,

    #[error("empty formula")]
    Empty,

    #[error("formula nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}
