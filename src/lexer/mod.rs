pub mod token;

use token::{Location, Token, TokenKind};

/// Scans a source buffer into tokens, one per `next_token` call. Lex errors
/// become `Unknown` tokens carrying the message; scanning never stops early.
pub struct Lexer {
    chars: Vec<char>,
    filename: String,
    current: usize,
    start: usize,
    line: usize,
    column: usize,
    token_line: usize,
    token_column: usize,
}

impl Lexer {
    pub fn new(source: &str, filename: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            filename: filename.to_string(),
            current: 0,
            start: 0,
            line: 1,
            column: 1,
            token_line: 1,
            token_column: 1,
        }
    }

    /// Drives the scanner to end of input and appends the EOF sentinel.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start_token();

        if self.is_at_end() {
            return self.make_token(TokenKind::Eof, String::new());
        }

        let c = self.advance();

        if c.is_ascii_alphabetic() || c == '_' {
            return self.identifier();
        }

        if c.is_ascii_digit() {
            return self.number();
        }

        match c {
            '"' => self.string(),
            '#' => self.comment(),
            '(' => self.make_token(TokenKind::LeftParen, "(".to_string()),
            ')' => self.make_token(TokenKind::RightParen, ")".to_string()),
            ',' => self.make_token(TokenKind::Comma, ",".to_string()),
            ':' => self.make_token(TokenKind::Colon, ":".to_string()),
            '+' => self.make_token(TokenKind::Plus, "+".to_string()),
            '*' => self.make_token(TokenKind::Multiply, "*".to_string()),
            '/' => self.make_token(TokenKind::Divide, "/".to_string()),
            '\\' => self.make_token(TokenKind::Backslash, "\\".to_string()),
            // Unreachable in practice: skip_whitespace consumes newlines
            // before dispatch ever sees one.
            '\n' => self.make_token(TokenKind::Newline, "\n".to_string()),
            '-' => {
                if self.matches('>') {
                    self.make_token(TokenKind::Arrow, "->".to_string())
                } else {
                    self.make_token(TokenKind::Minus, "-".to_string())
                }
            }
            '=' => {
                if self.matches('=') {
                    self.make_token(TokenKind::EqualEqual, "==".to_string())
                } else {
                    self.make_token(TokenKind::Equals, "=".to_string())
                }
            }
            '<' => {
                if self.matches('=') {
                    self.make_token(TokenKind::LessEqual, "<=".to_string())
                } else {
                    self.make_token(TokenKind::LessThan, "<".to_string())
                }
            }
            '>' => {
                if self.matches('=') {
                    self.make_token(TokenKind::GreaterEqual, ">=".to_string())
                } else {
                    self.make_token(TokenKind::GreaterThan, ">".to_string())
                }
            }
            '!' => {
                if self.matches('=') {
                    self.make_token(TokenKind::NotEqual, "!=".to_string())
                } else {
                    self.error_token("Unexpected character '!'")
                }
            }
            _ => self.error_token("Unexpected character"),
        }
    }

    fn identifier(&mut self) -> Token {
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text = self.current_lexeme();
        let kind = match text.as_str() {
            "let" => TokenKind::Let,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "int" => TokenKind::TypeInt,
            "float" => TokenKind::TypeFloat,
            "char" => TokenKind::TypeChar,
            "str" => TokenKind::TypeStr,
            "func" => TokenKind::TypeFunc,
            _ => TokenKind::Identifier,
        };

        self.make_token(kind, text)
    }

    fn number(&mut self) -> Token {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let mut is_float = false;
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            is_float = true;
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        };
        let lexeme = self.current_lexeme();
        self.make_token(kind, lexeme)
    }

    fn string(&mut self) -> Token {
        let mut value = String::new();

        while !self.is_at_end() && self.peek() != '"' {
            let c = self.advance();
            if c == '\\' {
                if self.is_at_end() {
                    break;
                }
                let escaped = self.advance();
                match escaped {
                    '"' => value.push('"'),
                    '\\' => value.push('\\'),
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    other => value.push(other),
                }
            } else {
                value.push(c);
            }
        }

        if self.is_at_end() {
            return self.error_token("Unterminated string");
        }

        self.advance();
        self.make_token(TokenKind::StringLiteral, value)
    }

    fn comment(&mut self) -> Token {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
        let text = self.current_lexeme();
        self.make_token(TokenKind::Comment, text)
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                _ => return,
            }
        }
    }

    fn start_token(&mut self) {
        self.start = self.current;
        self.token_line = self.line;
        self.token_column = self.column;
    }

    fn current_lexeme(&self) -> String {
        self.chars[self.start..self.current].iter().collect()
    }

    fn make_token(&self, kind: TokenKind, value: String) -> Token {
        Token::new(
            kind,
            value,
            Location::new(self.token_line, self.token_column, self.filename.clone()),
        )
    }

    fn error_token(&self, message: &str) -> Token {
        Token::new(
            TokenKind::Unknown,
            message.to_string(),
            Location::new(self.token_line, self.token_column, self.filename.clone()),
        )
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            return false;
        }
        self.advance();
        true
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.current]
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.chars.len() {
            '\0'
        } else {
            self.chars[self.current + 1]
        }
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }
}
