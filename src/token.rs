use std::fmt;

pub const LIST_CONSTRUCT: &str = "{list}";
pub const IMPLICIT_MULTIPLY: &str = "*";

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Argument count, filled in by the parser for functions and list literals.
    pub arity: Option<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            kind,
            text: text.into(),
            arity: None,
        }
    }

    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    String,
    Variable,
    Function,
    BinaryOperator,
    LeftUnaryOperator,
    RightUnaryOperator,
    Comma,
    LeftParen,
    RightParen,
    ListOpen,
    ListClose,
    ListConstruct,
}

impl TokenKind {
    pub fn is_opener(self) -> bool {
        matches!(self, Self::LeftParen | Self::ListOpen)
    }
}

/// Writes the token back out as expression source.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "\"{}\"", self.text),
            TokenKind::ListConstruct => Ok(()),
            _ => write!(f, "{}", self.text),
        }
    }
}
