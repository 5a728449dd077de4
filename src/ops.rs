use std::{cmp::Ordering, sync::OnceLock};

use rustc_hash::FxHashMap;

use crate::eval::EvalErr;
use crate::number::{Number, NumericErr};
use crate::token::LIST_CONSTRUCT;
use crate::value::Value;

pub type Apply = fn(&'static str, &[Value]) -> Result<Value, EvalErr>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    /// Takes as many operands as the parser counted.
    Variadic,
}

#[derive(Clone, Copy)]
pub struct Operator {
    pub symbol: &'static str,
    pub arity: Arity,
    pub apply: Apply,
}

impl Operator {
    pub fn call(&self, args: &[Value]) -> Result<Value, EvalErr> {
        (self.apply)(self.symbol, args)
    }
}

/// Every operator and built-in function, keyed by the symbol the scanner produces.
pub struct Registry {
    ops: FxHashMap<&'static str, Operator>,
}

impl Registry {
    pub fn standard() -> Self {
        let mut registry = Registry {
            ops: FxHashMap::default(),
        };

        registry.add(&["+"], Arity::Fixed(2), add);
        registry.add(&["—", "−"], Arity::Fixed(2), |op, args| {
            numeric_binary(op, args, |a, b| Ok(a.sub(b)))
        });
        registry.add(&["*", "×"], Arity::Fixed(2), |op, args| {
            numeric_binary(op, args, |a, b| Ok(a.mul(b)))
        });
        registry.add(&["/", "÷"], Arity::Fixed(2), |op, args| {
            numeric_binary(op, args, Number::div)
        });
        registry.add(&["^"], Arity::Fixed(2), |op, args| {
            numeric_binary(op, args, Number::pow)
        });
        registry.add(&[" nCr "], Arity::Fixed(2), |op, args| {
            numeric_binary(op, args, Number::n_cr)
        });
        registry.add(&[" nPr "], Arity::Fixed(2), |op, args| {
            numeric_binary(op, args, Number::n_pr)
        });

        registry.add(&["="], Arity::Fixed(2), |op, args| equality(op, args, true));
        registry.add(&["≠"], Arity::Fixed(2), |op, args| equality(op, args, false));
        registry.add(&[">"], Arity::Fixed(2), |op, args| {
            comparison(op, args, |o| o == Ordering::Greater)
        });
        registry.add(&["<"], Arity::Fixed(2), |op, args| {
            comparison(op, args, |o| o == Ordering::Less)
        });
        registry.add(&["≥"], Arity::Fixed(2), |op, args| {
            comparison(op, args, |o| o != Ordering::Less)
        });
        registry.add(&["≤"], Arity::Fixed(2), |op, args| {
            comparison(op, args, |o| o != Ordering::Greater)
        });

        registry.add(&[" and "], Arity::Fixed(2), |op, args| {
            logical(op, args, |a, b| a && b)
        });
        registry.add(&[" or "], Arity::Fixed(2), |op, args| {
            logical(op, args, |a, b| a || b)
        });
        registry.add(&[" xor "], Arity::Fixed(2), |op, args| {
            logical(op, args, |a, b| a != b)
        });

        registry.add(&["-"], Arity::Fixed(1), |op, args| {
            numeric_unary(op, args, |a| Ok(a.neg()))
        });
        registry.add(&["√"], Arity::Fixed(1), |op, args| {
            numeric_unary(op, args, Number::sqrt)
        });
        registry.add(&["!"], Arity::Fixed(1), |op, args| {
            numeric_unary(op, args, Number::factorial)
        });
        registry.add(&["²"], Arity::Fixed(1), |op, args| {
            numeric_unary(op, args, |a| Ok(a.square()))
        });
        registry.add(&["not"], Arity::Fixed(1), |op, args| {
            numeric_unary(op, args, |a| Ok(Number::from_bool(a.is_zero())))
        });

        registry.add(&["max"], Arity::Variadic, |op, args| {
            extreme(op, args, Ordering::Greater)
        });
        registry.add(&["min"], Arity::Variadic, |op, args| {
            extreme(op, args, Ordering::Less)
        });
        registry.add(&[LIST_CONSTRUCT], Arity::Variadic, make_list);

        registry
    }

    fn add(&mut self, symbols: &[&'static str], arity: Arity, apply: Apply) {
        for &symbol in symbols {
            self.ops.insert(
                symbol,
                Operator {
                    symbol,
                    arity,
                    apply,
                },
            );
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&Operator> {
        self.ops.get(symbol)
    }
}

/// The process-wide registry, built on first use.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::standard)
}

fn operands<'v, const N: usize>(
    op: &'static str,
    args: &'v [Value],
) -> Result<&'v [Value; N], EvalErr> {
    args.try_into().map_err(|_| EvalErr::WrongArgumentCount {
        op: op.trim().to_string(),
        expected: N,
        got: args.len(),
    })
}

fn not_numeric(op: &'static str, value: &Value) -> EvalErr {
    EvalErr::NotNumeric {
        op: op.trim().to_string(),
        found: value.kind(),
    }
}

/// Applies `f` elementwise: scalar with scalar, list with list of the same
/// length, or list with scalar on either side.
fn broadcast<F>(op: &'static str, left: &Value, right: &Value, f: F) -> Result<Value, EvalErr>
where
    F: Fn(&Number, &Number) -> Result<Number, NumericErr>,
{
    match (left, right) {
        (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(f(a, b)?)),
        (Value::List(a), Value::List(b)) => {
            if a.len() != b.len() {
                return Err(EvalErr::DimensionMismatch {
                    op: op.trim().to_string(),
                    left: a.len(),
                    right: b.len(),
                });
            }
            let items = a.iter().zip(b).map(|(x, y)| f(x, y)).collect::<Result<_, _>>()?;
            Ok(Value::List(items))
        }
        (Value::List(a), Value::Scalar(b)) => {
            let items = a.iter().map(|x| f(x, b)).collect::<Result<_, _>>()?;
            Ok(Value::List(items))
        }
        (Value::Scalar(a), Value::List(b)) => {
            let items = b.iter().map(|y| f(a, y)).collect::<Result<_, _>>()?;
            Ok(Value::List(items))
        }
        (Value::Text(_), _) => Err(not_numeric(op, left)),
        (_, other) => Err(not_numeric(op, other)),
    }
}

fn numeric_binary<F>(op: &'static str, args: &[Value], f: F) -> Result<Value, EvalErr>
where
    F: Fn(&Number, &Number) -> Result<Number, NumericErr>,
{
    let [left, right] = operands::<2>(op, args)?;
    broadcast(op, left, right, f)
}

fn numeric_unary<F>(op: &'static str, args: &[Value], f: F) -> Result<Value, EvalErr>
where
    F: Fn(&Number) -> Result<Number, NumericErr>,
{
    let [value] = operands::<1>(op, args)?;
    match value {
        Value::Scalar(a) => Ok(Value::Scalar(f(a)?)),
        Value::List(items) => Ok(Value::List(items.iter().map(f).collect::<Result<_, _>>()?)),
        Value::Text(_) => Err(not_numeric(op, value)),
    }
}

fn add(op: &'static str, args: &[Value]) -> Result<Value, EvalErr> {
    match operands::<2>(op, args)? {
        [Value::Text(a), Value::Text(b)] => Ok(Value::Text(format!("{a}{b}"))),
        [left, right] => broadcast(op, left, right, |a, b| Ok(a.add(b))),
    }
}

fn equality(op: &'static str, args: &[Value], equal: bool) -> Result<Value, EvalErr> {
    match operands::<2>(op, args)? {
        [Value::Text(a), Value::Text(b)] => Ok(Value::Scalar(Number::from_bool((a == b) == equal))),
        [left, right] => broadcast(op, left, right, |a, b| {
            Ok(Number::from_bool(a.num_eq(b) == equal))
        }),
    }
}

fn comparison(
    op: &'static str,
    args: &[Value],
    test: fn(Ordering) -> bool,
) -> Result<Value, EvalErr> {
    numeric_binary(op, args, |a, b| {
        Ok(Number::from_bool(a.compare(b).is_some_and(test)))
    })
}

fn logical(op: &'static str, args: &[Value], test: fn(bool, bool) -> bool) -> Result<Value, EvalErr> {
    numeric_binary(op, args, |a, b| {
        Ok(Number::from_bool(test(!a.is_zero(), !b.is_zero())))
    })
}

fn pick(a: &Number, b: &Number, wanted: Ordering) -> Number {
    if b.compare(a) == Some(wanted) {
        b.clone()
    } else {
        a.clone()
    }
}

/// `max`/`min`: the extreme of one list, elementwise between two operands, or
/// the extreme of three or more scalars.
fn extreme(op: &'static str, args: &[Value], wanted: Ordering) -> Result<Value, EvalErr> {
    let fold = |items: &[Number]| -> Result<Value, EvalErr> {
        let (first, rest) = items.split_first().ok_or(EvalErr::EmptyList(op.to_string()))?;
        let best = rest.iter().fold(first.clone(), |best, n| pick(&best, n, wanted));
        Ok(Value::Scalar(best))
    };

    match args {
        [Value::List(items)] => fold(items.as_slice()),
        [other] => Err(EvalErr::NotNumeric {
            op: op.to_string(),
            found: other.kind(),
        }),
        [left, right] => broadcast(op, left, right, |a, b| Ok(pick(a, b, wanted))),
        [] => Err(EvalErr::WrongArgumentCount {
            op: op.to_string(),
            expected: 1,
            got: 0,
        }),
        _ => {
            let items = args
                .iter()
                .map(|v| v.as_scalar().cloned().ok_or_else(|| not_numeric(op, v)))
                .collect::<Result<Vec<_>, _>>()?;
            fold(items.as_slice())
        }
    }
}

fn make_list(_op: &'static str, args: &[Value]) -> Result<Value, EvalErr> {
    let items = args
        .iter()
        .map(|v| match v {
            Value::Scalar(n) => Ok(n.clone()),
            other => Err(EvalErr::ListElement(other.kind())),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::List(items))
}
