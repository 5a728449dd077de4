pub mod block;
pub mod error;
pub mod eval;
pub mod interpreter;
pub mod number;
pub mod ops;
pub mod parser;
pub mod scanner;
pub mod screen;
pub mod statement;
pub mod store;
pub mod token;
pub mod value;
