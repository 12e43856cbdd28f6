use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::FormulaError;
use crate::lexer::Token;

/// Deepest allowed nesting of parentheses and unary operators
pub const MAX_DEPTH: usize = 256;

/// Parser for formula expressions
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// Parse the token stream into an AST
    pub fn parse(&mut self) -> Result<Expr, FormulaError> {
        if self.is_at_end() {
            return Err(FormulaError::Empty);
        }

        let expr = self.parse_expression()?;

        if !self.is_at_end() {
            return Err(FormulaError::UnexpectedToken(self.peek().to_string()));
        }

        Ok(expr)
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::EOF)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.tokens
            .get(self.position - 1)
            .unwrap_or(&Token::EOF)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::EOF)
    }

    fn unexpected(&self) -> FormulaError {
        match self.peek() {
            Token::EOF => FormulaError::UnexpectedEnd,
            token => FormulaError::UnexpectedToken(token.to_string()),
        }
    }

    /// Run `parse` one nesting level deeper
    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Expr, FormulaError>,
    ) -> Result<Expr, FormulaError> {
        if self.depth >= MAX_DEPTH {
            return Err(FormulaError::TooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parse expression with operator precedence
    fn parse_expression(&mut self) -> Result<Expr, FormulaError> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };

            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek() {
                Token::Multiply => BinaryOp::Mul,
                Token::Divide => BinaryOp::Div,
                _ => break,
            };

            self.advance();
            let right = self.parse_unary()?;
            left = Expr::binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, FormulaError> {
        let op = match self.peek() {
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Pos,
            _ => return self.parse_primary(),
        };

        self.advance();
        let operand = self.nested(Self::parse_unary)?;
        Ok(Expr::unary(op, operand))
    }

    fn parse_primary(&mut self) -> Result<Expr, FormulaError> {
        match *self.peek() {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Token::CellRef(address) => {
                self.advance();
                Ok(Expr::CellRef(address))
            }
            Token::LeftParen => {
                self.advance();
                let expr = self.nested(Self::parse_expression)?;
                if !matches!(self.peek(), Token::RightParen) {
                    return Err(self.unexpected());
                }
                self.advance();
                Ok(expr)
            }
            _ => Err(self.unexpected()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> Result<Expr, FormulaError> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize()?;
        let mut parser = Parser::new(tokens);
        parser.parse()
    }

    fn reformat(input: &str) -> String {
        parse(input).unwrap().to_string()
    }

    #[test]
    fn test_number() {
        assert_eq!(parse("42").unwrap(), Expr::Number(42.0));
    }

    #[test]
    fn test_arithmetic_precedence() {
        let expr = parse("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                Expr::Number(1.0),
                BinaryOp::Add,
                Expr::binary(Expr::Number(2.0), BinaryOp::Mul, Expr::Number(3.0)),
            )
        );
    }

    #[test]
    fn test_left_associative() {
        let expr = parse("8 - 4 - 2").unwrap();
        assert!(matches!(
            expr,
            Expr::Binary { op: BinaryOp::Sub, ref left, .. } if matches!(**left, Expr::Binary { .. })
        ));
    }

    #[test]
    fn test_cell_reference() {
        assert_eq!(parse("B3").unwrap(), Expr::cell_ref(2, 1));
    }

    #[test]
    fn test_unary() {
        assert_eq!(
            parse("-A1").unwrap(),
            Expr::unary(UnaryOp::Neg, Expr::cell_ref(0, 0))
        );
    }

    #[test]
    fn test_canonical_text() {
        assert_eq!(reformat("  1  "), "1");
        assert_eq!(reformat("  -1  "), "-1");
        assert_eq!(reformat("2 + 2"), "2+2");
        assert_eq!(reformat("(2*3)+4"), "2*3+4");
        assert_eq!(reformat("(2*3)-4"), "2*3-4");
        assert_eq!(reformat("( ( (  1) ) )"), "1");
        assert_eq!(reformat("(1+2)*3"), "(1+2)*3");
        assert_eq!(reformat("1+(2*3)"), "1+2*3");
        assert_eq!(reformat("1-(2+3)"), "1-(2+3)");
        assert_eq!(reformat("1+(2-3)"), "1+2-3");
        assert_eq!(reformat("8/(4*2)"), "8/(4*2)");
        assert_eq!(reformat("8*(4/2)"), "8*4/2");
        assert_eq!(reformat("-(1+2)"), "-(1+2)");
        assert_eq!(reformat("+(A1)"), "+A1");
        assert_eq!(reformat("1e+200/1e-200"), "1e200/1e-200");
        assert_eq!(reformat("0.5 + 1.25"), "0.5+1.25");
        assert_eq!(
            reformat("A1 + A2 + A1 + A3 + A1 + A2 + A1"),
            "A1+A2+A1+A3+A1+A2+A1"
        );
    }

    #[test]
    fn test_canonical_text_reparses_to_same_tree() {
        for input in ["(12+13) * (14+(13-24/(1+1))*55-46)", "-(-A1)/(B2-C3)", "1-(2-(3-4))"] {
            let expr = parse(input).unwrap();
            assert_eq!(parse(&expr.to_string()).unwrap(), expr);
        }
    }

    #[test]
    fn test_incorrect_formulas() {
        for input in ["A2B", "3X", "A0++", "((1)", "2+4-", "R2D2", "1.2.3", ")", "1 2", ""] {
            assert!(parse(input).is_err(), "input {:?}", input);
        }
        assert_eq!(parse("2+4-"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(parse("  "), Err(FormulaError::Empty));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}1{}", "(".repeat(depth), ")".repeat(depth));

        assert_eq!(parse(&nested(MAX_DEPTH)).unwrap(), Expr::Number(1.0));
        assert_eq!(
            parse(&nested(3000)),
            Err(FormulaError::TooDeep { limit: MAX_DEPTH })
        );
        assert_eq!(
            parse(&format!("{}1", "-".repeat(3000))),
            Err(FormulaError::TooDeep { limit: MAX_DEPTH })
        );
    }
}
