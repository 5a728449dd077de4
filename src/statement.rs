use thiserror::Error;

use crate::scanner::scan;
use crate::store::VarName;
use crate::token::TokenKind;

pub const STORE_ARROW: char = '→';

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatementErr {
    #[error("'{op}' expects {expected} arguments, got {got}.")]
    ArgumentCount {
        op: &'static str,
        expected: &'static str,
        got: usize,
    },
    #[error("'{0}' lacks a closing parenthesis.")]
    MissingParen(&'static str),
    #[error("'{0}' is not a variable.")]
    NotVariable(String),
    #[error("Multiple stores in one line.")]
    MultipleStores,
    #[error("Unknown statement '{0}'.")]
    Unknown(String),
    #[error("Unknown label '{0}'.")]
    UnknownLabel(String),
    #[error("Menu has no option {0}.")]
    BadChoice(usize),
    #[error("{0} must be an integer of at least 1, got {1}.")]
    BadPosition(&'static str, String),
    #[error("Pause needs a non-negative duration, got {0}.")]
    BadDuration(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    ClrHome,
    Pause {
        message: Option<String>,
        seconds: Option<String>,
    },
    Disp(Vec<String>),
    Output {
        row: String,
        col: String,
        expr: String,
    },
    Input {
        prompt: Option<String>,
        target: VarName,
    },
    Prompt(Vec<VarName>),
    Menu {
        title: String,
        options: Vec<(String, String)>,
    },
    Stop,
    Store {
        expr: String,
        target: VarName,
    },
}

impl Stmt {
    /// Recognizes one program line by its leading keyword. Any other line
    /// holding a store arrow is an assignment.
    pub fn parse(line: &str) -> Result<Stmt, StatementErr> {
        if line == "ClrHome" {
            return Ok(Stmt::ClrHome);
        }
        if line == "Stop" {
            return Ok(Stmt::Stop);
        }

        if let Some(rest) = keyword(line, "Pause") {
            let mut args = split_args(rest).into_iter();
            let stmt = Stmt::Pause {
                message: args.next(),
                seconds: args.next(),
            };
            return match args.count() {
                0 => Ok(stmt),
                extra => Err(StatementErr::ArgumentCount {
                    op: "Pause",
                    expected: "0 to 2",
                    got: extra + 2,
                }),
            };
        }

        if let Some(rest) = keyword(line, "Prompt") {
            let vars = split_args(rest)
                .iter()
                .map(|var| variable(var))
                .collect::<Result<Vec<_>, _>>()?;
            if vars.is_empty() {
                return Err(StatementErr::ArgumentCount {
                    op: "Prompt",
                    expected: "at least 1",
                    got: 0,
                });
            }
            return Ok(Stmt::Prompt(vars));
        }

        if let Some(rest) = keyword(line, "Disp") {
            return Ok(Stmt::Disp(split_args(rest)));
        }

        if let Some(rest) = line.strip_prefix("Output(") {
            let inner = rest.strip_suffix(')').ok_or(StatementErr::MissingParen("Output"))?;
            return match <[String; 3]>::try_from(split_args(inner)) {
                Ok([row, col, expr]) => Ok(Stmt::Output { row, col, expr }),
                Err(args) => Err(StatementErr::ArgumentCount {
                    op: "Output",
                    expected: "3",
                    got: args.len(),
                }),
            };
        }

        if let Some(rest) = keyword(line, "Input") {
            let mut args = split_args(rest);
            let got = args.len();
            let target = match args.pop() {
                Some(var) if got <= 2 => variable(&var)?,
                _ => {
                    return Err(StatementErr::ArgumentCount {
                        op: "Input",
                        expected: "1 or 2",
                        got,
                    })
                }
            };
            return Ok(Stmt::Input {
                prompt: args.pop(),
                target,
            });
        }

        if let Some(rest) = line.strip_prefix("Menu(") {
            let inner = rest.strip_suffix(')').ok_or(StatementErr::MissingParen("Menu"))?;
            let mut args = split_args(inner).into_iter();
            let title = args.next().unwrap_or_default();
            let rest = args.collect::<Vec<_>>();
            if rest.is_empty() || rest.len() % 2 != 0 {
                return Err(StatementErr::ArgumentCount {
                    op: "Menu",
                    expected: "a title and text/label pairs",
                    got: rest.len() + 1,
                });
            }
            let options = rest
                .chunks_exact(2)
                .map(|pair| (pair[0].clone(), pair[1].clone()))
                .collect();
            return Ok(Stmt::Menu { title, options });
        }

        if let Some(arrow) = find_top_level(line, STORE_ARROW) {
            let (expr, target) = (&line[..arrow], &line[arrow + STORE_ARROW.len_utf8()..]);
            if find_top_level(target, STORE_ARROW).is_some() {
                return Err(StatementErr::MultipleStores);
            }
            return Ok(Stmt::Store {
                expr: expr.trim().to_string(),
                target: variable(target.trim())?,
            });
        }

        Err(StatementErr::Unknown(line.to_string()))
    }
}

/// Argument text after `word`, when the line is that statement.
fn keyword<'a>(line: &'a str, word: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(word)?;
    (rest.is_empty() || rest.starts_with(' ')).then(|| rest.trim())
}

/// Resolves a store target: it must scan to a single variable token, or be
/// written as a bare list name.
pub fn variable(text: &str) -> Result<VarName, StatementErr> {
    let not_variable = || StatementErr::NotVariable(text.to_string());
    if let Some(name) = VarName::parse(text) {
        return Ok(name);
    }
    match scan(text).map_err(|_| not_variable())?.as_slice() {
        [token] if token.is(TokenKind::Variable) => VarName::parse(&token.text).ok_or_else(not_variable),
        _ => Err(not_variable()),
    }
}

// Byte offset of the first `target` outside quotes, parentheses and braces.
fn find_top_level(text: &str, target: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quoted = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => quoted = !quoted,
            _ if quoted => {}
            '(' | '{' => depth += 1,
            ')' | '}' => depth = depth.saturating_sub(1),
            c if c == target && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Splits statement arguments on commas that are not inside a string, a call
/// or a list literal. Each argument is trimmed; empty text has no arguments.
pub fn split_args(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![];
    }
    let mut args = vec![];
    let mut rest = text;
    while let Some(comma) = find_top_level(rest, ',') {
        args.push(rest[..comma].trim().to_string());
        rest = &rest[comma + 1..];
    }
    args.push(rest.trim().to_string());
    args
}
