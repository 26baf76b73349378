use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Unknown,
    Identifier,
    StringLiteral,
    IntLiteral,
    FloatLiteral,
    Let,
    If,
    Then,
    Else,
    Arrow,
    Plus,
    Minus,
    Multiply,
    Divide,
    Equals,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    EqualEqual,
    NotEqual,
    LeftParen,
    RightParen,
    Colon,
    Comma,
    TypeInt,
    TypeFloat,
    TypeChar,
    TypeStr,
    TypeFunc,
    Newline,
    Backslash,
    Comment,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Unknown => "UNKNOWN",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::StringLiteral => "STRING_LITERAL",
            TokenKind::IntLiteral => "INT_LITERAL",
            TokenKind::FloatLiteral => "FLOAT_LITERAL",
            TokenKind::Let => "LET",
            TokenKind::If => "IF",
            TokenKind::Then => "THEN",
            TokenKind::Else => "ELSE",
            TokenKind::Arrow => "ARROW",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Multiply => "MULTIPLY",
            TokenKind::Divide => "DIVIDE",
            TokenKind::Equals => "EQUALS",
            TokenKind::LessThan => "LESS_THAN",
            TokenKind::GreaterThan => "GREATER_THAN",
            TokenKind::LessEqual => "LESS_EQUAL",
            TokenKind::GreaterEqual => "GREATER_EQUAL",
            TokenKind::EqualEqual => "EQUAL_EQUAL",
            TokenKind::NotEqual => "NOT_EQUAL",
            TokenKind::LeftParen => "LPAREN",
            TokenKind::RightParen => "RPAREN",
            TokenKind::Colon => "COLON",
            TokenKind::Comma => "COMMA",
            TokenKind::TypeInt => "TYPE_INT",
            TokenKind::TypeFloat => "TYPE_FLOAT",
            TokenKind::TypeChar => "TYPE_CHAR",
            TokenKind::TypeStr => "TYPE_STR",
            TokenKind::TypeFunc => "TYPE_FUNC",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Backslash => "BACKSLASH",
            TokenKind::Comment => "COMMENT",
            TokenKind::Eof => "EOF_TOKEN",
        };
        f.write_str(name)
    }
}

/// Source position of a token or AST node, 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub filename: String,
}

impl Location {
    pub fn new(line: usize, column: usize, filename: impl Into<String>) -> Self {
        Self {
            line,
            column,
            filename: filename.into(),
        }
    }
}

/// A single lexeme. `value` holds the source text, the decoded value for
/// string literals, or the error message for `Unknown` tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, value: String, location: Location) -> Self {
        Self {
            kind,
            value,
            location,
        }
    }
}
