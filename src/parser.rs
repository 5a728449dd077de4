use log::trace;
use thiserror::Error;

use crate::token::{Token, TokenKind, LIST_CONSTRUCT};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrType {
    #[error("Expected '{expected}' to close '{found}'")]
    MismatchedParen { expected: char, found: char },
    #[error("Unmatched '{0}'")]
    UnmatchedClose(char),
    #[error("Unclosed '{0}'")]
    Unclosed(char),
    #[error("Comma outside of a call or list")]
    UnexpectedComma,
    #[error("Unexpected token '{0}'")]
    UnexpectedToken(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{data} in '{expression}'.")]
pub struct ParseErr {
    pub data: ParseErrType,
    pub expression: String,
}

fn precedence(token: &Token) -> u8 {
    match token.text.as_str() {
        "²" | "!" => 7,
        "-" | "√" => 6,
        "^" => 5,
        " nPr " | " nCr " => 4,
        "*" | "×" | "/" | "÷" => 3,
        "+" | "—" | "−" => 2,
        "=" | "≠" | ">" | "<" | "≥" | "≤" => 1,
        // " and ", " or ", " xor "
        _ => 0,
    }
}

fn is_right_associative(token: &Token) -> bool {
    token.text == "^"
}

fn glyph(kind: TokenKind) -> char {
    match kind {
        TokenKind::LeftParen => '(',
        TokenKind::RightParen => ')',
        TokenKind::ListOpen => '{',
        _ => '}',
    }
}

/// Shunting-yard conversion of infix tokens to postfix.
pub struct Parser<'a> {
    tokens: &'a [Token],
    index: usize,
    output: Vec<Token>,
    // Openers keep their running comma count in `arity`.
    stack: Vec<Token>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser {
            tokens,
            index: 0,
            output: vec![],
            stack: vec![],
        }
    }

    fn error(&self, data: ParseErrType) -> ParseErr {
        ParseErr {
            data,
            expression: self.tokens.iter().map(ToString::to_string).collect(),
        }
    }

    fn advance(&mut self) -> Option<&'a Token> {
        self.index += 1;
        self.tokens.get(self.index - 1)
    }

    fn previous_kind(&self) -> Option<TokenKind> {
        self.index
            .checked_sub(2)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.kind)
    }

    pub fn parse(mut self) -> Result<Vec<Token>, ParseErr> {
        while let Some(token) = self.advance() {
            match token.kind {
                TokenKind::Number | TokenKind::String | TokenKind::Variable => {
                    self.output.push(token.clone())
                }
                TokenKind::LeftParen | TokenKind::ListOpen => {
                    self.stack.push(token.clone().with_arity(0))
                }
                TokenKind::Function
                | TokenKind::LeftUnaryOperator
                | TokenKind::RightUnaryOperator => self.stack.push(token.clone()),
                TokenKind::BinaryOperator => self.binary(token),
                TokenKind::Comma => self.comma()?,
                TokenKind::RightParen => self.close(TokenKind::LeftParen)?,
                TokenKind::ListClose => self.close(TokenKind::ListOpen)?,
                TokenKind::ListConstruct => {
                    return Err(self.error(ParseErrType::UnexpectedToken(token.text.clone())))
                }
            }
        }

        while let Some(top) = self.stack.pop() {
            if top.kind.is_opener() {
                return Err(self.error(ParseErrType::Unclosed(glyph(top.kind))));
            }
            self.output.push(top);
        }

        trace!(
            "postfix: {}",
            self.output
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        );
        Ok(self.output)
    }

    fn binary(&mut self, token: &Token) {
        while let Some(top) = self.stack.pop() {
            let pops = !top.kind.is_opener() && !top.is(TokenKind::Function) && {
                let (above, incoming) = (precedence(&top), precedence(token));
                above > incoming || (above == incoming && !is_right_associative(token))
            };
            if !pops {
                self.stack.push(top);
                break;
            }
            self.output.push(top);
        }
        self.stack.push(token.clone());
    }

    fn comma(&mut self) -> Result<(), ParseErr> {
        loop {
            match self.stack.pop() {
                None => return Err(self.error(ParseErrType::UnexpectedComma)),
                Some(mut top) if top.kind.is_opener() => {
                    top.arity = Some(top.arity.unwrap_or(0) + 1);
                    self.stack.push(top);
                    return Ok(());
                }
                Some(top) => self.output.push(top),
            }
        }
    }

    fn close(&mut self, opener: TokenKind) -> Result<(), ParseErr> {
        let empty = self.previous_kind() == Some(opener);
        let commas = loop {
            match self.stack.pop() {
                None => {
                    let close = if opener == TokenKind::LeftParen { ')' } else { '}' };
                    return Err(self.error(ParseErrType::UnmatchedClose(close)));
                }
                Some(top) if top.kind == opener => break top.arity.unwrap_or(0),
                Some(top) if top.kind.is_opener() => {
                    return Err(self.error(ParseErrType::MismatchedParen {
                        expected: if opener == TokenKind::LeftParen { '}' } else { ')' },
                        found: glyph(top.kind),
                    }));
                }
                Some(top) => self.output.push(top),
            }
        };
        let arity = if empty { 0 } else { commas + 1 };

        if opener == TokenKind::ListOpen {
            self.output
                .push(Token::new(TokenKind::ListConstruct, LIST_CONSTRUCT).with_arity(arity));
        } else if let Some(top) = self.stack.pop() {
            if top.is(TokenKind::Function) {
                self.output.push(top.with_arity(arity));
            } else {
                self.stack.push(top);
            }
        }
        Ok(())
    }
}

pub fn parse(tokens: &[Token]) -> Result<Vec<Token>, ParseErr> {
    Parser::new(tokens).parse()
}
