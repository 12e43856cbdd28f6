use std::fmt;

use sheetcalc_core::Address;

use crate::error::FormulaError;

/// Token types for formula parsing
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    CellRef(Address),

    // Operators
    Plus,
    Minus,
    Multiply,
    Divide,

    // Delimiters
    LeftParen,
    RightParen,

    // End of input
    EOF,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::CellRef(address) => write!(f, "{}", address),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Multiply => f.write_str("*"),
            Token::Divide => f.write_str("/"),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::EOF => f.write_str("end of input"),
        }
    }
}

/// Lexer for tokenizing formula expressions
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, FormulaError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.position >= self.input.len() {
                break;
            }
            tokens.push(self.next_token()?);
        }

        tokens.push(Token::EOF);
        Ok(tokens)
    }

    fn skip_whitespace(&mut self) {
        while self.position < self.input.len() && self.input[self.position].is_whitespace() {
            self.position += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        self.position += 1;
        c
    }

    fn next_token(&mut self) -> Result<Token, FormulaError> {
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::EOF),
        };

        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Multiply,
            '/' => Token::Divide,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '0'..='9' | '.' => return self.read_number(),
            'A'..='Z' | 'a'..='z' => return self.read_cell_ref(),
            _ => {
                return Err(FormulaError::UnexpectedChar {
                    ch: c,
                    position: self.position,
                })
            }
        };

        self.advance();
        Ok(token)
    }

    fn read_number(&mut self) -> Result<Token, FormulaError> {
        let mut s = String::new();
        let mut has_dot = false;
        let mut has_e = false;

        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => {
                    s.push(c);
                    self.advance();
                }
                '.' if !has_dot && !has_e => {
                    has_dot = true;
                    s.push(c);
                    self.advance();
                }
                'e' | 'E' if !has_e => {
                    has_e = true;
                    s.push(c);
                    self.advance();
                    // Optional sign after E
                    if let Some(sign @ ('+' | '-')) = self.peek() {
                        s.push(sign);
                        self.advance();
                    }
                }
                _ => break,
            }
        }

        // Literals that overflow to infinity have no canonical text
        match s.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Token::Number(n)),
            _ => Err(FormulaError::InvalidNumber(s)),
        }
    }

    fn read_cell_ref(&mut self) -> Result<Token, FormulaError> {
        let mut s = String::new();

        while let Some(c) = self.peek().filter(|c| c.is_ascii_alphabetic()) {
            s.push(c);
            self.advance();
        }
        while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
            s.push(c);
            self.advance();
        }

        let address = Address::from_a1(&s);
        if address.is_valid() {
            Ok(Token::CellRef(address))
        } else {
            Err(FormulaError::InvalidReference(s))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Result<Vec<Token>, FormulaError> {
        Lexer::new(input).tokenize()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            tokenize("1 + 2 * 3").unwrap(),
            vec![
                Token::Number(1.0),
                Token::Plus,
                Token::Number(2.0),
                Token::Multiply,
                Token::Number(3.0),
                Token::EOF,
            ]
        );
    }

    #[test]
    fn test_cell_references() {
        assert_eq!(
            tokenize("A1 / (B2-ZZ10)").unwrap(),
            vec![
                Token::CellRef(Address::new(0, 0)),
                Token::Divide,
                Token::LeftParen,
                Token::CellRef(Address::new(1, 1)),
                Token::Minus,
                Token::CellRef(Address::new(9, 701)),
                Token::RightParen,
                Token::EOF,
            ]
        );
    }

    #[test]
    fn test_adjacent_references_split() {
        assert_eq!(
            tokenize("R2D2").unwrap(),
            vec![
                Token::CellRef(Address::new(1, 17)),
                Token::CellRef(Address::new(1, 3)),
                Token::EOF,
            ]
        );
    }

    #[test]
    fn test_scientific_numbers() {
        assert_eq!(
            tokenize("1e+200/1E-200 .5").unwrap(),
            vec![
                Token::Number(1e200),
                Token::Divide,
                Token::Number(1e-200),
                Token::Number(0.5),
                Token::EOF,
            ]
        );
    }

    #[test]
    fn test_rejects_bad_references() {
        for input in ["X0", "ABCD1", "A123456", "XFD16385", "XFE16384", "a1", "SUM"] {
            assert!(
                matches!(tokenize(input), Err(FormulaError::InvalidReference(_))),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_rejects_unknown_characters() {
        assert_eq!(
            tokenize("1 & 2"),
            Err(FormulaError::UnexpectedChar { ch: '&', position: 2 })
        );
        // Two literals; the parser rejects the pair
        assert_eq!(
            tokenize("1.2.3").unwrap(),
            vec![Token::Number(1.2), Token::Number(0.3), Token::EOF]
        );
        assert!(matches!(tokenize("."), Err(FormulaError::InvalidNumber(_))));
    }

    #[test]
    fn test_rejects_overflowing_literals() {
        assert_eq!(
            tokenize("1e400"),
            Err(FormulaError::InvalidNumber("1e400".to_string()))
        );
        assert!(tokenize("1e308").is_ok());
        // Underflow to zero is still a finite number
        assert_eq!(
            tokenize("1e-400").unwrap(),
            vec![Token::Number(0.0), Token::EOF]
        );
    }
}
