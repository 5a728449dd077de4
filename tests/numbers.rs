use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;
use tibasic::number::{Number, NumericErr, Rational};

fn rational(n: i64, d: i64) -> Rational {
    Rational::new(BigInt::from(n), BigInt::from(d)).unwrap()
}

#[test]
fn rationals_are_reduced() {
    for (n, d) in [(6, -4), (-10, 25), (0, -7), (12, 4), (-9, -3), (7, 1)] {
        let r = rational(n, d);
        assert!(r.numer().gcd(r.denom()).is_one(), "{n}/{d}");
        assert!(*r.denom() > BigInt::from(0), "{n}/{d}");
    }
    let r = rational(6, -4);
    assert_eq!((r.numer(), r.denom()), (&BigInt::from(-3), &BigInt::from(2)));
}

#[test]
fn zero_denominator_is_rejected() {
    assert_eq!(
        Rational::new(BigInt::from(1), BigInt::from(0)),
        Err(NumericErr::DivisionByZero)
    );
    assert_eq!(
        Number::Inexact(1.5).div(&Number::Inexact(0.0)),
        Err(NumericErr::DivisionByZero)
    );
}

#[test]
fn inexact_is_infectious() {
    let third = Number::from(rational(1, 3));
    let half = Number::Inexact(0.5);
    assert!(third.add(&third).is_exact());
    assert!(!third.add(&half).is_exact());
    assert!(!half.mul(&Number::from(2)).is_exact());
}

#[test]
fn parsing_literals() {
    assert_eq!(Number::parse("12").unwrap(), Number::from(12));
    assert_eq!(Number::parse("-1.25").unwrap(), Number::from(rational(-5, 4)));
    assert_eq!(Number::parse(".5").unwrap(), Number::from(rational(1, 2)));
    assert!(!Number::parse("e").unwrap().is_exact());
    assert!(matches!(Number::parse("1.x"), Err(NumericErr::Malformed(_))));
}

#[test]
fn integer_checks() {
    assert!(Number::from(4).is_integer());
    assert!(Number::Inexact(4.0).is_integer());
    assert!(!Number::Inexact(4.5).is_integer());
    assert!(!Number::from(rational(9, 2)).is_integer());
}

#[test]
fn exact_comparison() {
    let a = Number::from(rational(1, 3));
    let b = Number::from(rational(333_333, 1_000_000));
    assert!(!a.num_eq(&b));
    assert!(a.num_eq(&Number::from(rational(2, 6))));
    assert!(Number::from(2).num_eq(&Number::Inexact(2.0)));
}

#[test]
fn factorials_keep_exactness() {
    assert_eq!(Number::from(5).factorial().unwrap(), Number::from(120));
    assert_eq!(Number::Inexact(5.0).factorial().unwrap(), Number::Inexact(120.0));
    assert_eq!(
        Number::from(20).factorial().unwrap().to_string(),
        "2432902008176640000"
    );
    assert!(matches!(
        Number::from(rational(1, 2)).factorial(),
        Err(NumericErr::NotInteger(_))
    ));
}

#[test]
fn combinations() {
    assert_eq!(Number::from(5).n_cr(&Number::from(2)).unwrap(), Number::from(10));
    assert_eq!(Number::from(5).n_pr(&Number::from(0)).unwrap(), Number::from(1));
    assert_eq!(Number::from(6).n_cr(&Number::from(6)).unwrap(), Number::from(1));
    assert!(!Number::Inexact(5.0).n_cr(&Number::from(2)).unwrap().is_exact());
}

#[test]
fn powers_and_roots() {
    assert_eq!(Number::from(2).pow(&Number::from(10)).unwrap().to_string(), "1024");
    assert_eq!(Number::from(9).sqrt().unwrap(), Number::Inexact(3.0));
    assert_eq!(Number::from(-4).sqrt(), Err(NumericErr::NonReal));
}

#[cfg(feature = "exact-powers")]
#[test]
fn exact_integer_powers() {
    assert_eq!(
        Number::from(rational(2, 3)).pow(&Number::from(-2)).unwrap(),
        Number::from(rational(9, 4))
    );
}

#[test]
fn inexact_combinatorics_reject_infinite_results() {
    let n = Number::Inexact(171.0);
    assert_eq!(n.factorial(), Err(NumericErr::Overflow("!")));
    assert_eq!(
        Number::Inexact(1000.0).n_pr(&Number::from(500)),
        Err(NumericErr::Overflow("nPr"))
    );
    assert_eq!(Number::Inexact(5.0).factorial(), Ok(Number::Inexact(120.0)));
    assert!(Number::from(171).factorial().unwrap().is_exact());
}

#[test]
fn huge_fractions_convert_to_floats() {
    let big = Number::from(200).factorial().unwrap();
    let near_one = big.add(&Number::from(1)).div(&big).unwrap();
    assert!(near_one.is_exact());
    assert_eq!(near_one.to_f64(), 1.0);
    assert_eq!(near_one.to_string(), "1");
    assert_eq!(near_one.compare(&Number::pi()), Some(std::cmp::Ordering::Less));

    let tiny = Number::from(1).div(&big).unwrap().neg();
    assert!(tiny.to_f64() <= 0.0 && tiny.to_f64() > -1e-300);
    assert_eq!(big.to_f64(), f64::INFINITY);
}
