use log::trace;
use thiserror::Error;

use crate::number::{Number, NumericErr};
use crate::ops::{registry, Arity};
use crate::store::{VarName, VariableStore};
use crate::token::{Token, TokenKind};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalErr {
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),
    #[error("'{0}' is not a variable name.")]
    InvalidVariable(String),
    #[error("Unknown operator '{0}'.")]
    UnknownOperator(String),
    #[error("Missing operands for '{0}'.")]
    MissingOperands(String),
    #[error("'{op}' expects {expected} arguments, got {got}.")]
    WrongArgumentCount {
        op: String,
        expected: usize,
        got: usize,
    },
    #[error("'{op}' cannot be applied to a {found}.")]
    NotNumeric { op: String, found: &'static str },
    #[error("'{op}' on lists of length {left} and {right}.")]
    DimensionMismatch {
        op: String,
        left: usize,
        right: usize,
    },
    #[error("'{0}' of an empty list.")]
    EmptyList(String),
    #[error("Lists hold only numbers, found a {0}.")]
    ListElement(&'static str),
    #[error("Expected a {expected}, found a {found}.")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("Expression left {0} values.")]
    LeftoverValues(usize),
    #[error("Empty expression.")]
    EmptyExpression,
    #[error("Cannot store a {found} in '{name}'.")]
    TypeMismatch { name: String, found: &'static str },
    #[error(transparent)]
    Numeric(#[from] NumericErr),
}

/// Runs a postfix token queue as a stack machine and returns the single
/// value it leaves behind.
pub fn evaluate(postfix: &[Token], store: &VariableStore) -> Result<Value, EvalErr> {
    let mut stack: Vec<Value> = Vec::with_capacity(postfix.len());

    for token in postfix {
        match token.kind {
            TokenKind::Number => stack.push(Value::Scalar(Number::parse(&token.text)?)),
            TokenKind::String => stack.push(Value::Text(token.text.clone())),
            TokenKind::Variable => stack.push(lookup(&token.text, store)?),
            TokenKind::Function
            | TokenKind::BinaryOperator
            | TokenKind::LeftUnaryOperator
            | TokenKind::RightUnaryOperator
            | TokenKind::ListConstruct => {
                let result = apply(token, &mut stack)?;
                stack.push(result);
            }
            TokenKind::Comma
            | TokenKind::LeftParen
            | TokenKind::RightParen
            | TokenKind::ListOpen
            | TokenKind::ListClose => return Err(EvalErr::UnknownOperator(token.text.clone())),
        }
    }

    let result = stack.pop().ok_or(EvalErr::EmptyExpression)?;
    if !stack.is_empty() {
        return Err(EvalErr::LeftoverValues(stack.len() + 1));
    }
    trace!("evaluated to {result}");
    Ok(result)
}

fn lookup(text: &str, store: &VariableStore) -> Result<Value, EvalErr> {
    let name = VarName::parse(text).ok_or_else(|| EvalErr::InvalidVariable(text.to_string()))?;
    store
        .get(&name)
        .ok_or_else(|| EvalErr::UndefinedVariable(name.to_string()))
}

fn apply(token: &Token, stack: &mut Vec<Value>) -> Result<Value, EvalErr> {
    let op = registry()
        .get(&token.text)
        .ok_or_else(|| EvalErr::UnknownOperator(token.text.clone()))?;

    let count = match (op.arity, token.arity) {
        (Arity::Fixed(n), Some(given)) if n != given => {
            return Err(EvalErr::WrongArgumentCount {
                op: token.text.clone(),
                expected: n,
                got: given,
            })
        }
        (Arity::Fixed(n), _) => n,
        (Arity::Variadic, Some(given)) => given,
        (Arity::Variadic, None) => return Err(EvalErr::MissingOperands(token.text.clone())),
    };

    if stack.len() < count {
        return Err(EvalErr::MissingOperands(token.text.trim().to_string()));
    }
    let args = stack.split_off(stack.len() - count);
    op.call(&args)
}

/// Requires `value` to be a number, naming what was found otherwise.
pub fn expect_scalar(value: Value) -> Result<Number, EvalErr> {
    match value {
        Value::Scalar(n) => Ok(n),
        other => Err(EvalErr::WrongType {
            expected: "number",
            found: other.kind(),
        }),
    }
}
