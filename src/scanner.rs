use log::trace;
use thiserror::Error;

use crate::number::{E_CHAR, PI_CHAR};
use crate::store::{ListName, ListSlot, LIST_SIGIL, MAX_LIST_NAME, STR_PREFIX};
use crate::token::{Token, TokenKind, IMPLICIT_MULTIPLY};

/// Operators spelled as words. The surrounding spaces are part of the operator.
pub const WORD_OPERATORS: [&str; 5] = [" and ", " xor ", " nCr ", " nPr ", " or "];
pub const NEGATION: char = '-';
pub const SQUARE_ROOT: char = '√';
pub const FACTORIAL: char = '!';
pub const SQUARED: char = '²';

const BINARY_SYMBOLS: [char; 14] = [
    '^', '*', '×', '/', '÷', '+', '—', '−', '=', '≠', '>', '<', '≥', '≤',
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TokenizeErr {
    #[error("Unmatched quote in '{0}'.")]
    UnmatchedQuote(String),
    #[error("Illegal space in '{0}'.")]
    IllegalSpace(String),
    #[error("Malformed number '{0}'.")]
    MalformedNumber(String),
    #[error("Missing list name after 'ʟ'.")]
    EmptyListName,
}

struct Scanner<'a> {
    str: &'a [char],
    index: usize,
}

impl<'a> Scanner<'a> {
    fn advance(&mut self) -> Option<char> {
        self.index += 1;
        self.str.get(self.index - 1).copied()
    }

    fn peek(&self) -> Option<char> {
        self.str.get(self.index).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.str.get(self.index + offset).copied()
    }

    // Consumes `word` if the input continues with it.
    fn match_word(&mut self, word: &str) -> bool {
        let mut len = 0;
        for c in word.chars() {
            if self.peek_at(len) != Some(c) {
                return false;
            }
            len += 1;
        }
        self.index += len;
        true
    }

    fn new(str: &'a [char]) -> Self {
        Self { index: 0, str }
    }
}

/// Splits one line of expression text into tokens.
///
/// Quoted strings win over everything, then word operators, then single
/// character symbols. Whatever is left between those forms unclassified runs,
/// which are split into numbers, variables and function names.
pub fn scan(code: &str) -> Result<Vec<Token>, TokenizeErr> {
    let chars = code.chars().collect::<Vec<_>>();
    let mut scanner = Scanner::new(&chars);
    let mut result = vec![];
    let mut run = String::new();

    while let Some(c) = scanner.peek() {
        if c == '"' {
            classify_run(&mut run, false, &mut result)?;
            scanner.advance();
            let mut text = String::new();
            loop {
                match scanner.advance() {
                    Some('"') => break,
                    Some(c) => text.push(c),
                    None => return Err(TokenizeErr::UnmatchedQuote(code.to_string())),
                }
            }
            result.push(Token::new(TokenKind::String, text));
            continue;
        }

        if let Some(op) = WORD_OPERATORS.iter().find(|op| scanner.match_word(op)) {
            classify_run(&mut run, false, &mut result)?;
            result.push(Token::new(TokenKind::BinaryOperator, *op));
            continue;
        }

        let kind = match c {
            '(' => Some(TokenKind::LeftParen),
            ')' => Some(TokenKind::RightParen),
            '{' => Some(TokenKind::ListOpen),
            '}' => Some(TokenKind::ListClose),
            ',' => Some(TokenKind::Comma),
            // A minus directly before a digit is the sign of a literal.
            NEGATION if !matches!(scanner.peek_at(1), Some('0'..='9' | '.' | NEGATION)) => {
                Some(TokenKind::LeftUnaryOperator)
            }
            SQUARE_ROOT => Some(TokenKind::LeftUnaryOperator),
            FACTORIAL | SQUARED => Some(TokenKind::RightUnaryOperator),
            E_CHAR | PI_CHAR => Some(TokenKind::Number),
            c if BINARY_SYMBOLS.contains(&c) => Some(TokenKind::BinaryOperator),
            _ => None,
        };

        scanner.advance();
        match kind {
            Some(kind) => {
                classify_run(&mut run, kind == TokenKind::LeftParen, &mut result)?;
                result.push(Token::new(kind, c));
            }
            None => run.push(c),
        }
    }
    classify_run(&mut run, false, &mut result)?;

    let tokens = insert_implicit_multiplication(result);
    trace!("scanned {code:?} into {tokens:?}");
    Ok(tokens)
}

fn classify_run(
    run: &mut String,
    followed_by_paren: bool,
    out: &mut Vec<Token>,
) -> Result<(), TokenizeErr> {
    if run.is_empty() {
        return Ok(());
    }
    if run.contains(' ') {
        return Err(TokenizeErr::IllegalSpace(std::mem::take(run)));
    }

    let chars = std::mem::take(run).chars().collect::<Vec<_>>();
    let mut i = 0;
    while i < chars.len() {
        let rest = &chars[i..];

        if let Some(len) = number_prefix(rest)? {
            out.push(Token::new(TokenKind::Number, rest[..len].iter().collect::<String>()));
            i += len;
            continue;
        }

        if let Some(digit) = string_slot(rest) {
            out.push(Token::new(TokenKind::Variable, format!("{STR_PREFIX}{digit}")));
            i += STR_PREFIX.len() + 1;
            continue;
        }

        if rest[0] == LIST_SIGIL {
            let name = rest[1..]
                .iter()
                .take_while(|c| c.is_ascii_uppercase())
                .take(MAX_LIST_NAME)
                .collect::<String>();
            if name.is_empty() {
                return Err(TokenizeErr::EmptyListName);
            }
            i += 1 + name.len();
            out.push(Token::new(TokenKind::Variable, ListName::User(name).to_string()));
            continue;
        }

        if let ['L', d, ..] = rest {
            if let Some(slot) = ListSlot::from_digit(*d) {
                out.push(Token::new(TokenKind::Variable, ListName::Builtin(slot).to_string()));
                i += 2;
                continue;
            }
        }

        if followed_by_paren && rest.len() > 1 {
            out.push(Token::new(TokenKind::Function, rest.iter().collect::<String>()));
            break;
        }

        out.push(Token::new(TokenKind::Variable, rest[0]));
        i += 1;
    }
    Ok(())
}

/// Length of a leading numeric literal: at most one sign, then digits with at
/// most one decimal point.
fn number_prefix(rest: &[char]) -> Result<Option<usize>, TokenizeErr> {
    let signs = rest.iter().take_while(|c| **c == NEGATION).count();
    let body = rest[signs..]
        .iter()
        .take_while(|c| c.is_ascii_digit() || **c == '.')
        .count();
    if signs == 0 && body == 0 {
        return Ok(None);
    }

    let literal = rest[..signs + body].iter().collect::<String>();
    let dots = literal.matches('.').count();
    let has_digit = literal.chars().any(|c| c.is_ascii_digit());
    if signs > 1 || dots > 1 || !has_digit {
        return Err(TokenizeErr::MalformedNumber(literal));
    }
    Ok(Some(signs + body))
}

fn string_slot(rest: &[char]) -> Option<char> {
    match rest {
        ['S', 't', 'r', d, ..] if d.is_ascii_digit() => Some(*d),
        _ => None,
    }
}

fn ends_operand(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::RightParen
            | TokenKind::ListClose
            | TokenKind::Number
            | TokenKind::Variable
            | TokenKind::RightUnaryOperator
    )
}

fn starts_operand(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::LeftParen
            | TokenKind::ListOpen
            | TokenKind::Number
            | TokenKind::Variable
            | TokenKind::Function
            | TokenKind::LeftUnaryOperator
    )
}

fn insert_implicit_multiplication(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let juxtaposed = out
            .last()
            .is_some_and(|prev| ends_operand(prev.kind) && starts_operand(token.kind));
        if juxtaposed {
            out.push(Token::new(TokenKind::BinaryOperator, IMPLICIT_MULTIPLY));
        }
        out.push(token);
    }
    out
}
