use std::io;

use thiserror::Error;

use crate::block::BlockErr;
use crate::eval::EvalErr;
use crate::number::NumericErr;
use crate::parser::ParseErr;
use crate::scanner::TokenizeErr;
use crate::statement::StatementErr;

/// Any failure that ends a program run.
#[derive(Debug, Error)]
pub enum InterpretErr {
    #[error(transparent)]
    Tokenize(#[from] TokenizeErr),
    #[error(transparent)]
    Parse(#[from] ParseErr),
    #[error(transparent)]
    ControlFlow(#[from] BlockErr),
    #[error(transparent)]
    Eval(EvalErr),
    #[error(transparent)]
    Numeric(#[from] NumericErr),
    #[error(transparent)]
    Statement(#[from] StatementErr),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

// Arithmetic failures keep their own kind instead of hiding inside `Eval`.
impl From<EvalErr> for InterpretErr {
    fn from(value: EvalErr) -> Self {
        match value {
            EvalErr::Numeric(err) => InterpretErr::Numeric(err),
            err => InterpretErr::Eval(err),
        }
    }
}
