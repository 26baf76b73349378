use crate::lexer::token::{Location, TokenKind};

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::{ParseError, Parser};

impl Parser {
    pub(crate) fn expression(&mut self) -> Result<Expr, ParseError> {
        if self.matches(TokenKind::If) {
            return self.conditional();
        }
        self.comparison()
    }

    /// `<comparison> 'then' <expr> 'else' <expr>`; both branches use the
    /// full expression production, so conditionals nest to the right.
    fn conditional(&mut self) -> Result<Expr, ParseError> {
        let condition = self.comparison()?;

        self.consume(TokenKind::Then, "Expected 'then' after if condition")?;
        let then_expr = self.expression()?;

        self.consume(TokenKind::Else, "Expected 'else' after then expression")?;
        let else_expr = self.expression()?;

        let location = condition.location().clone();
        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
            location,
        })
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.addition()?;

        loop {
            let op = if self.matches(TokenKind::LessThan) {
                Some(BinaryOp::Less)
            } else if self.matches(TokenKind::GreaterThan) {
                Some(BinaryOp::Greater)
            } else if self.matches(TokenKind::LessEqual) {
                Some(BinaryOp::LessEqual)
            } else if self.matches(TokenKind::GreaterEqual) {
                Some(BinaryOp::GreaterEqual)
            } else if self.matches(TokenKind::EqualEqual) {
                Some(BinaryOp::Equal)
            } else if self.matches(TokenKind::NotEqual) {
                Some(BinaryOp::NotEqual)
            } else {
                None
            };

            let Some(op) = op else { break };
            let location = self.previous().location.clone();
            let right = self.addition()?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
                location,
            };
        }

        Ok(expr)
    }

    fn addition(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.multiplication()?;

        loop {
            let op = if self.matches(TokenKind::Plus) {
                Some(BinaryOp::Add)
            } else if self.matches(TokenKind::Minus) {
                Some(BinaryOp::Subtract)
            } else {
                None
            };

            let Some(op) = op else { break };
            let location = self.previous().location.clone();
            let right = self.multiplication()?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
                location,
            };
        }

        Ok(expr)
    }

    fn multiplication(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.unary()?;

        loop {
            let op = if self.matches(TokenKind::Multiply) {
                Some(BinaryOp::Multiply)
            } else if self.matches(TokenKind::Divide) {
                Some(BinaryOp::Divide)
            } else {
                None
            };

            let Some(op) = op else { break };
            let location = self.previous().location.clone();
            let right = self.unary()?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
                location,
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.matches(TokenKind::Minus) {
            let location = self.previous().location.clone();
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Negate,
                operand: Box::new(operand),
                location,
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        if self.matches(TokenKind::StringLiteral) {
            let token = self.previous().clone();
            return Ok(Expr::StringLiteral {
                value: token.value,
                location: token.location,
            });
        }

        if self.matches(TokenKind::IntLiteral) {
            let token = self.previous().clone();
            let value = token
                .value
                .parse::<i32>()
                .map_err(|_| ParseError::new("Invalid integer literal", &token))?;
            return Ok(Expr::IntLiteral {
                value,
                location: token.location,
            });
        }

        if self.matches(TokenKind::FloatLiteral) {
            let token = self.previous().clone();
            let value = token
                .value
                .parse::<f32>()
                .map_err(|_| ParseError::new("Invalid float literal", &token))?;
            return Ok(Expr::FloatLiteral {
                value,
                location: token.location,
            });
        }

        if self.matches(TokenKind::Identifier) {
            let token = self.previous().clone();
            if self.check(TokenKind::LeftParen) {
                return self.call(token.value, token.location);
            }
            return Ok(Expr::Identifier {
                name: token.value,
                location: token.location,
            });
        }

        if self.matches(TokenKind::LeftParen) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, "Expected ')' after expression")?;
            return Ok(expr);
        }

        Err(ParseError::at_token(self.peek(), "Expected expression"))
    }

    fn call(&mut self, callee: String, location: Location) -> Result<Expr, ParseError> {
        self.consume(TokenKind::LeftParen, "Expected '(' after function name")?;

        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.expression()?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenKind::RightParen, "Expected ')' after arguments")?;

        Ok(Expr::Call {
            callee,
            args,
            location,
        })
    }
}
