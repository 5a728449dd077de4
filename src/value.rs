use std::fmt;

use crate::number::Number;

#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Scalar(Number),
    List(Vec<Number>),
    Text(String),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "number",
            Value::List(_) => "list",
            Value::Text(_) => "string",
        }
    }

    pub fn as_scalar(&self) -> Option<&Number> {
        match self {
            Value::Scalar(n) => Some(n),
            _ => None,
        }
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Scalar(value)
    }
}

impl From<Vec<Number>> for Value {
    fn from(value: Vec<Number>) -> Self {
        Value::List(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Scalar(x) => write!(f, "{}", x),
            Self::List(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
            Self::Text(x) => write!(f, "{}", x),
        }
    }
}
