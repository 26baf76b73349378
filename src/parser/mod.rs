pub mod ast;
mod expr;

use std::error::Error;
use std::fmt;

use crate::lexer::token::{Token, TokenKind};
use ast::{FunctionDef, Parameter, Program, Type, TypeKind};

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    /// Short form: `<msg> at L:C`.
    fn new(message: impl Into<String>, token: &Token) -> Self {
        let message = message.into();
        Self {
            message: format!(
                "{} at {}:{}",
                message, token.location.line, token.location.column
            ),
            line: token.location.line,
            column: token.location.column,
        }
    }

    /// Long form: `Error at <file>:L:C near '<lexeme>': <msg>`, with a
    /// special case for end of input.
    fn at_token(token: &Token, message: &str) -> Self {
        let rendered = if token.kind == TokenKind::Eof {
            format!("Error at end of file: {}", message)
        } else {
            format!(
                "Error at {}:{}:{} near '{}': {}",
                token.location.filename,
                token.location.line,
                token.location.column,
                token.value,
                message
            )
        };
        Self {
            message: rendered,
            line: token.location.line,
            column: token.location.column,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ParseError {}

/// Recursive-descent parser over the token vector. Collects every error it
/// can recover from; the caller must check `has_errors` before using the
/// returned program for code generation.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    pub fn parse(&mut self) -> Program {
        let mut functions = Vec::new();

        while !self.is_at_end() {
            while self.matches(TokenKind::Comment) {}

            if self.is_at_end() {
                break;
            }

            match self.parse_function() {
                Ok(func) => functions.push(func),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }

        Program { functions }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// `let <name>: <type> = (<params>) -> <expr>`
    fn parse_function(&mut self) -> Result<FunctionDef, ParseError> {
        self.consume(TokenKind::Let, "Expected 'let' at start of function definition")?;

        let name_token = self.consume(TokenKind::Identifier, "Expected function name after 'let'")?;

        self.consume(TokenKind::Colon, "Expected ':' after function name")?;
        let return_type = self.parse_type()?;
        self.consume(TokenKind::Equals, "Expected '=' after return type")?;

        self.consume(TokenKind::LeftParen, "Expected '(' for function parameters")?;
        let parameters = self.parse_parameters()?;
        self.consume(TokenKind::RightParen, "Expected ')' after function parameters")?;

        self.consume(TokenKind::Arrow, "Expected '->' after parameters")?;
        let body = self.expression()?;

        Ok(FunctionDef {
            name: name_token.value,
            return_type,
            parameters,
            body,
            location: name_token.location,
        })
    }

    fn parse_type(&mut self) -> Result<Type, ParseError> {
        let token = self.advance().clone();
        let kind = match token.kind {
            TokenKind::TypeInt => TypeKind::Int,
            TokenKind::TypeFloat => TypeKind::Float,
            TokenKind::TypeChar => TypeKind::Char,
            TokenKind::TypeStr => TypeKind::Str,
            // Accepted, but the parameter/return payload is never parsed.
            TokenKind::TypeFunc => TypeKind::Func,
            _ => return Err(ParseError::new("Expected type identifier", &token)),
        };

        Ok(Type::new(kind, token.location))
    }

    fn parse_parameters(&mut self) -> Result<Vec<Parameter>, ParseError> {
        let mut params = Vec::new();

        if self.check(TokenKind::RightParen) {
            return Ok(params);
        }

        loop {
            let name_token = self.consume(TokenKind::Identifier, "Expected parameter name")?;
            self.consume(TokenKind::Colon, "Expected ':' after parameter name")?;
            let ty = self.parse_type()?;

            params.push(Parameter {
                name: name_token.value,
                ty,
                location: name_token.location,
            });

            if !self.matches(TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }

    /// Skips to a likely definition boundary after a failure: advance once,
    /// then stop once the previous token was a newline or the next token
    /// begins a new `let` form.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Newline {
                return;
            }
            if self.peek().kind == TokenKind::Let {
                return;
            }
            self.advance();
        }
    }

    pub(crate) fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }
        Err(ParseError::new(message, self.peek()))
    }

    pub(crate) fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.peek().kind == kind
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }
}
