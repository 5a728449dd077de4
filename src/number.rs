use std::{cmp::Ordering, f64::consts, fmt};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};
use thiserror::Error;

pub const E_CHAR: char = 'e';
pub const PI_CHAR: char = 'π';

// Large enough for any calculator program, small enough not to hang.
const FACTORIAL_LIMIT: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericErr {
    #[error("Division by zero.")]
    DivisionByZero,
    #[error("{0} requires integer operands.")]
    NotInteger(&'static str),
    #[error("{0} requires non-negative operands.")]
    Negative(&'static str),
    #[error("{op} is undefined for n = {n}, r = {r}.")]
    InvalidCombinatorial { op: &'static str, n: BigInt, r: BigInt },
    #[error("{0} is too large.")]
    Overflow(&'static str),
    #[error("Result is not a real number.")]
    NonReal,
    #[error("Malformed number '{0}'.")]
    Malformed(String),
}

/// An exact fraction, always stored in lowest terms with a positive denominator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rational {
    numer: BigInt,
    denom: BigInt,
}

impl Rational {
    pub fn new(numer: BigInt, denom: BigInt) -> Result<Self, NumericErr> {
        if denom.is_zero() {
            return Err(NumericErr::DivisionByZero);
        }
        Ok(Self::reduced(numer, denom))
    }

    pub fn from_integer(numer: BigInt) -> Self {
        Self {
            numer,
            denom: BigInt::one(),
        }
    }

    // Callers guarantee a nonzero denominator.
    fn reduced(numer: BigInt, denom: BigInt) -> Self {
        let gcd = numer.gcd(&denom);
        let (mut numer, mut denom) = (numer / &gcd, denom / &gcd);
        if denom.is_negative() {
            numer = -numer;
            denom = -denom;
        }
        Self { numer, denom }
    }

    pub fn numer(&self) -> &BigInt {
        &self.numer
    }

    pub fn denom(&self) -> &BigInt {
        &self.denom
    }

    pub fn is_integer(&self) -> bool {
        self.denom.is_one()
    }

    pub fn is_zero(&self) -> bool {
        self.numer.is_zero()
    }

    /// Nearest float. Parts too large for `f64` are shifted down first and the
    /// power of two is applied to the quotient.
    pub fn to_f64(&self) -> f64 {
        const KEEP_BITS: u64 = 128;

        let numer_shift = self.numer.bits().saturating_sub(KEEP_BITS);
        let denom_shift = self.denom.bits().saturating_sub(KEEP_BITS);
        let numer = (self.numer.magnitude() >> numer_shift).to_f64().unwrap_or(f64::NAN);
        let denom = (self.denom.magnitude() >> denom_shift).to_f64().unwrap_or(f64::NAN);

        let scale = (numer_shift as i64 - denom_shift as i64).clamp(-4096, 4096) as i32;
        // Two steps so an intermediate power of two cannot overflow on its own.
        let value = numer / denom * 2f64.powi(scale / 2) * 2f64.powi(scale - scale / 2);
        if self.numer.is_negative() {
            -value
        } else {
            value
        }
    }

    fn add(&self, other: &Self) -> Self {
        Self::reduced(
            &self.numer * &other.denom + &other.numer * &self.denom,
            &self.denom * &other.denom,
        )
    }

    fn sub(&self, other: &Self) -> Self {
        Self::reduced(
            &self.numer * &other.denom - &other.numer * &self.denom,
            &self.denom * &other.denom,
        )
    }

    fn mul(&self, other: &Self) -> Self {
        Self::reduced(&self.numer * &other.numer, &self.denom * &other.denom)
    }

    fn div(&self, other: &Self) -> Result<Self, NumericErr> {
        Self::new(&self.numer * &other.denom, &self.denom * &other.numer)
    }

    fn neg(&self) -> Self {
        Self {
            numer: -&self.numer,
            denom: self.denom.clone(),
        }
    }

    fn cmp_exact(&self, other: &Self) -> Ordering {
        (&self.numer * &other.denom).cmp(&(&other.numer * &self.denom))
    }

    /// Parses decimal literal text such as `12`, `-1.25` or `.5` into an exact fraction.
    fn parse_decimal(text: &str) -> Option<Self> {
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return None;
        }

        let mut numer: BigInt = format!("{whole}{frac}").parse().ok()?;
        if negative {
            numer = -numer;
        }
        let denom = num_traits::pow(BigInt::from(10), frac.len());
        Some(Self::reduced(numer, denom))
    }
}

/// A calculator number: an exact fraction or an inexact float.
///
/// Arithmetic is infectious toward [`Number::Inexact`]: as soon as one operand
/// is inexact the result is too.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Exact(Rational),
    Inexact(f64),
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Exact(Rational::from_integer(value.into()))
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Number::Exact(Rational::from_integer(value))
    }
}

impl From<Rational> for Number {
    fn from(value: Rational) -> Self {
        Number::Exact(value)
    }
}

impl Number {
    pub fn zero() -> Self {
        Self::from(0)
    }

    pub fn e() -> Self {
        Number::Inexact(consts::E)
    }

    pub fn pi() -> Self {
        Number::Inexact(consts::PI)
    }

    pub fn from_bool(value: bool) -> Self {
        Self::from(i64::from(value))
    }

    /// Parses the text of a Number token: a decimal literal or one of the named constants.
    pub fn parse(text: &str) -> Result<Self, NumericErr> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(E_CHAR), None) => return Ok(Self::e()),
            (Some(PI_CHAR), None) => return Ok(Self::pi()),
            _ => {}
        }
        Rational::parse_decimal(text)
            .map(Number::Exact)
            .ok_or_else(|| NumericErr::Malformed(text.to_string()))
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Number::Exact(_))
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Number::Exact(r) => r.is_integer(),
            Number::Inexact(v) => v.is_finite() && v.fract() == 0.0,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Exact(r) => r.is_zero(),
            Number::Inexact(v) => *v == 0.0,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Exact(r) => r.to_f64(),
            Number::Inexact(v) => *v,
        }
    }

    /// The integer value, if this number is integral.
    pub fn to_integer(&self) -> Option<BigInt> {
        match self {
            Number::Exact(r) if r.is_integer() => Some(r.numer().clone()),
            Number::Inexact(v) if self.is_integer() => BigInt::from_f64(*v),
            _ => None,
        }
    }

    pub fn add(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Exact(a), Number::Exact(b)) => Number::Exact(a.add(b)),
            _ => Number::Inexact(self.to_f64() + other.to_f64()),
        }
    }

    pub fn sub(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Exact(a), Number::Exact(b)) => Number::Exact(a.sub(b)),
            _ => Number::Inexact(self.to_f64() - other.to_f64()),
        }
    }

    pub fn mul(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Exact(a), Number::Exact(b)) => Number::Exact(a.mul(b)),
            _ => Number::Inexact(self.to_f64() * other.to_f64()),
        }
    }

    pub fn div(&self, other: &Number) -> Result<Number, NumericErr> {
        if other.is_zero() {
            return Err(NumericErr::DivisionByZero);
        }
        match (self, other) {
            (Number::Exact(a), Number::Exact(b)) => a.div(b).map(Number::Exact),
            _ => Ok(Number::Inexact(self.to_f64() / other.to_f64())),
        }
    }

    pub fn neg(&self) -> Number {
        match self {
            Number::Exact(r) => Number::Exact(r.neg()),
            Number::Inexact(v) => Number::Inexact(-v),
        }
    }

    /// Always computed in floating point unless the `exact-powers` feature is on.
    pub fn pow(&self, exp: &Number) -> Result<Number, NumericErr> {
        if let Some(exact) = exact_pow(self, exp) {
            return exact;
        }
        finite(self.to_f64().powf(exp.to_f64()))
    }

    pub fn sqrt(&self) -> Result<Number, NumericErr> {
        finite(self.to_f64().sqrt())
    }

    pub fn square(&self) -> Number {
        self.mul(self)
    }

    pub fn factorial(&self) -> Result<Number, NumericErr> {
        let n = self.integer_operand("!")?;
        let n = bounded(&n, "!")?;
        self.like(falling_factorial(n, n), "!")
    }

    pub fn n_pr(&self, r: &Number) -> Result<Number, NumericErr> {
        let (n, k) = combinatorial_operands(self, r, "nPr")?;
        self.like_both(r, falling_factorial(n, k), "nPr")
    }

    pub fn n_cr(&self, r: &Number) -> Result<Number, NumericErr> {
        let (n, k) = combinatorial_operands(self, r, "nCr")?;
        let k = k.min(n - k);
        let result = falling_factorial(n, k) / falling_factorial(k, k);
        self.like_both(r, result, "nCr")
    }

    /// Numeric ordering. Two exact values compare exactly, anything else as floats.
    pub fn compare(&self, other: &Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Exact(a), Number::Exact(b)) => Some(a.cmp_exact(b)),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    pub fn num_eq(&self, other: &Number) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    fn integer_operand(&self, op: &'static str) -> Result<BigInt, NumericErr> {
        if !self.is_integer() {
            return Err(NumericErr::NotInteger(op));
        }
        self.to_integer().ok_or(NumericErr::Overflow(op))
    }

    fn like(&self, value: BigInt, op: &'static str) -> Result<Number, NumericErr> {
        match self {
            Number::Exact(_) => Ok(Number::from(value)),
            Number::Inexact(_) => value
                .to_f64()
                .filter(|v| v.is_finite())
                .map(Number::Inexact)
                .ok_or(NumericErr::Overflow(op)),
        }
    }

    fn like_both(
        &self,
        other: &Number,
        value: BigInt,
        op: &'static str,
    ) -> Result<Number, NumericErr> {
        if other.is_exact() {
            self.like(value, op)
        } else {
            other.like(value, op)
        }
    }
}

fn finite(value: f64) -> Result<Number, NumericErr> {
    if value.is_nan() {
        Err(NumericErr::NonReal)
    } else if value.is_infinite() {
        Err(NumericErr::Overflow("result"))
    } else {
        Ok(Number::Inexact(value))
    }
}

fn bounded(n: &BigInt, op: &'static str) -> Result<u32, NumericErr> {
    if n.is_negative() {
        return Err(NumericErr::Negative(op));
    }
    match n.to_u32() {
        Some(n) if n <= FACTORIAL_LIMIT => Ok(n),
        _ => Err(NumericErr::Overflow(op)),
    }
}

fn combinatorial_operands(
    n: &Number,
    r: &Number,
    op: &'static str,
) -> Result<(u32, u32), NumericErr> {
    let big_n = n.integer_operand(op)?;
    let big_r = r.integer_operand(op)?;
    if big_n.is_negative() || big_r.is_negative() || big_r > big_n {
        return Err(NumericErr::InvalidCombinatorial {
            op,
            n: big_n,
            r: big_r,
        });
    }
    Ok((bounded(&big_n, op)?, bounded(&big_r, op)?))
}

/// `n * (n - 1) * ... * (n - k + 1)`; with `k == n` this is `n!`.
fn falling_factorial(n: u32, k: u32) -> BigInt {
    ((n - k + 1)..=n).fold(BigInt::one(), |acc, i| acc * i)
}

#[cfg(feature = "exact-powers")]
fn exact_pow(base: &Number, exp: &Number) -> Option<Result<Number, NumericErr>> {
    const EXPONENT_LIMIT: i32 = 4096;

    let (Number::Exact(base), Number::Exact(exp)) = (base, exp) else {
        return None;
    };
    if !exp.is_integer() {
        return None;
    }
    let exp = exp.numer().to_i32().filter(|e| e.abs() <= EXPONENT_LIMIT)?;
    let power = exp.unsigned_abs() as usize;
    let numer = num_traits::pow(base.numer().clone(), power);
    let denom = num_traits::pow(base.denom().clone(), power);
    let result = if exp < 0 {
        Rational::new(denom, numer)
    } else {
        Rational::new(numer, denom)
    };
    Some(result.map(Number::Exact))
}

#[cfg(not(feature = "exact-powers"))]
fn exact_pow(_base: &Number, _exp: &Number) -> Option<Result<Number, NumericErr>> {
    None
}

fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value == 0.0 {
        // Avoid printing "-0".
        write!(f, "0")
    } else {
        write!(f, "{}", value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Exact(r) if r.is_integer() => write!(f, "{}", r.numer()),
            Number::Exact(r) => write_float(f, r.to_f64()),
            Number::Inexact(v) => write_float(f, *v),
        }
    }
}
