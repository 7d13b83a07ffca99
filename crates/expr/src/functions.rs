//! The fixed allow-list of functions and named constants
//!
//! Nothing outside these tables can be referenced from an expression.

use crate::error::{ExprError, ExprResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::{E, PI, TAU};

/// Named constants recognized by the parser
pub fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" | "PI" | "\u{03C0}" => Some(PI),
        "e" => Some(E),
        "tau" | "\u{03C4}" => Some(TAU),
        "phi" | "\u{03C6}" => Some((1.0 + 5f64.sqrt()) / 2.0),
        "inf" | "\u{221E}" => Some(f64::INFINITY),
        _ => None,
    }
}

/// Allowed functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Cot,
    Sec,
    Csc,
    Asin,
    Acos,
    Atan,
    Atan2,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Exp,
    Ln,
    Log,
    Log2,
    Log10,
    Sqrt,
    Cbrt,
    Abs,
    Floor,
    Ceil,
    Round,
    Sign,
    Min,
    Max,
    Pow,
    Mod,
    Deg,
    Rad,
    Factorial,
    Gamma,
}

/// Number of arguments a function accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    Between(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exactly(n) => count == n,
            Arity::Between(lo, hi) => count >= lo && count <= hi,
            Arity::AtLeast(n) => count >= n,
        }
    }

    pub fn describe(&self) -> String {
        match *self {
            Arity::Exactly(n) => n.to_string(),
            Arity::Between(lo, hi) => format!("{} to {}", lo, hi),
            Arity::AtLeast(n) => format!("at least {}", n),
        }
    }
}

impl Function {
    /// Look up a function by name
    pub fn from_name(name: &str) -> Option<Self> {
        let f = match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "cot" => Function::Cot,
            "sec" => Function::Sec,
            "csc" | "cosec" => Function::Csc,
            "asin" | "arcsin" => Function::Asin,
            "acos" | "arccos" => Function::Acos,
            "atan" | "arctan" => Function::Atan,
            "atan2" => Function::Atan2,
            "sinh" => Function::Sinh,
            "cosh" => Function::Cosh,
            "tanh" => Function::Tanh,
            "asinh" | "arsinh" => Function::Asinh,
            "acosh" | "arcosh" => Function::Acosh,
            "atanh" | "artanh" => Function::Atanh,
            "exp" => Function::Exp,
            "ln" => Function::Ln,
            "log" => Function::Log,
            "log2" => Function::Log2,
            "log10" | "lg" => Function::Log10,
            "sqrt" => Function::Sqrt,
            "cbrt" => Function::Cbrt,
            "abs" => Function::Abs,
            "floor" => Function::Floor,
            "ceil" => Function::Ceil,
            "round" => Function::Round,
            "sign" | "sgn" => Function::Sign,
            "min" => Function::Min,
            "max" => Function::Max,
            "pow" => Function::Pow,
            "mod" => Function::Mod,
            "deg" => Function::Deg,
            "rad" => Function::Rad,
            "factorial" | "fact" => Function::Factorial,
            "gamma" => Function::Gamma,
            _ => return None,
        };
        Some(f)
    }

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Cot => "cot",
            Function::Sec => "sec",
            Function::Csc => "csc",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Atan2 => "atan2",
            Function::Sinh => "sinh",
            Function::Cosh => "cosh",
            Function::Tanh => "tanh",
            Function::Asinh => "asinh",
            Function::Acosh => "acosh",
            Function::Atanh => "atanh",
            Function::Exp => "exp",
            Function::Ln => "ln",
            Function::Log => "log",
            Function::Log2 => "log2",
            Function::Log10 => "log10",
            Function::Sqrt => "sqrt",
            Function::Cbrt => "cbrt",
            Function::Abs => "abs",
            Function::Floor => "floor",
            Function::Ceil => "ceil",
            Function::Round => "round",
            Function::Sign => "sign",
            Function::Min => "min",
            Function::Max => "max",
            Function::Pow => "pow",
            Function::Mod => "mod",
            Function::Deg => "deg",
            Function::Rad => "rad",
            Function::Factorial => "factorial",
            Function::Gamma => "gamma",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Function::Atan2 | Function::Pow | Function::Mod => Arity::Exactly(2),
            Function::Log => Arity::Between(1, 2),
            Function::Min | Function::Max => Arity::AtLeast(1),
            _ => Arity::Exactly(1),
        }
    }

    /// Apply the function to already-evaluated arguments.
    ///
    /// The caller guarantees the argument count matches [`Function::arity`].
    pub fn apply(&self, args: &[f64]) -> ExprResult<f64> {
        let a = args.first().copied().unwrap_or(f64::NAN);
        let b = args.get(1).copied().unwrap_or(f64::NAN);

        let value = match self {
            Function::Sin => a.sin(),
            Function::Cos => a.cos(),
            Function::Tan => a.tan(),
            Function::Cot => reciprocal(a.tan())?,
            Function::Sec => reciprocal(a.cos())?,
            Function::Csc => reciprocal(a.sin())?,
            Function::Asin => {
                require(a.abs() <= 1.0, "asin")?;
                a.asin()
            }
            Function::Acos => {
                require(a.abs() <= 1.0, "acos")?;
                a.acos()
            }
            Function::Atan => a.atan(),
            Function::Atan2 => a.atan2(b),
            Function::Sinh => a.sinh(),
            Function::Cosh => a.cosh(),
            Function::Tanh => a.tanh(),
            Function::Asinh => a.asinh(),
            Function::Acosh => {
                require(a >= 1.0, "acosh")?;
                a.acosh()
            }
            Function::Atanh => {
                require(a.abs() < 1.0, "atanh")?;
                a.atanh()
            }
            Function::Exp => a.exp(),
            Function::Ln => {
                require(a > 0.0, "ln")?;
                a.ln()
            }
            Function::Log => {
                require(a > 0.0, "log")?;
                if args.len() == 2 {
                    require(b > 0.0 && b != 1.0, "log")?;
                    a.ln() / b.ln()
                } else {
                    a.log10()
                }
            }
            Function::Log2 => {
                require(a > 0.0, "log2")?;
                a.log2()
            }
            Function::Log10 => {
                require(a > 0.0, "log10")?;
                a.log10()
            }
            Function::Sqrt => {
                require(a >= 0.0, "sqrt")?;
                a.sqrt()
            }
            Function::Cbrt => a.cbrt(),
            Function::Abs => a.abs(),
            Function::Floor => a.floor(),
            Function::Ceil => a.ceil(),
            Function::Round => a.round(),
            Function::Sign => {
                if a == 0.0 {
                    0.0
                } else {
                    a.signum()
                }
            }
            Function::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            Function::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Function::Pow => power(a, b)?,
            Function::Mod => {
                if b == 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                a.rem_euclid(b)
            }
            Function::Deg => a.to_degrees(),
            Function::Rad => a.to_radians(),
            Function::Factorial => factorial(a)?,
            Function::Gamma => gamma(a)?,
        };

        finite(value)
    }
}

fn require(condition: bool, name: &'static str) -> ExprResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ExprError::Domain(name))
    }
}

fn reciprocal(value: f64) -> ExprResult<f64> {
    if value == 0.0 {
        Err(ExprError::DivisionByZero)
    } else {
        Ok(1.0 / value)
    }
}

/// Reject NaN and infinities
pub fn finite(value: f64) -> ExprResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ExprError::NonFinite)
    }
}

/// Exponentiation with explicit handling of the undefined cases
pub fn power(base: f64, exponent: f64) -> ExprResult<f64> {
    if base == 0.0 && exponent < 0.0 {
        return Err(ExprError::DivisionByZero);
    }
    if base < 0.0 && exponent.fract() != 0.0 {
        // Odd-denominator rational exponents such as 1/3 are not
        // recoverable from a float; negative bases only take integer powers.
        return Err(ExprError::Domain("pow"));
    }
    finite(base.powf(exponent))
}

/// Largest n for which n! fits in an f64
const MAX_FACTORIAL: f64 = 170.0;

/// Factorial of a non-negative integer
pub fn factorial(n: f64) -> ExprResult<f64> {
    if n < 0.0 || n.fract() != 0.0 {
        return Err(ExprError::Domain("factorial"));
    }
    if n > MAX_FACTORIAL {
        return Err(ExprError::NonFinite);
    }
    let mut result = 1.0;
    let mut k = 2.0;
    while k <= n {
        result *= k;
        k += 1.0;
    }
    Ok(result)
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Approximate gamma function (Lanczos, g = 7)
pub fn gamma(x: f64) -> ExprResult<f64> {
    if x <= 0.0 && x.fract() == 0.0 {
        return Err(ExprError::Domain("gamma"));
    }
    if x < 0.5 {
        // Reflection formula
        let s = (PI * x).sin();
        return finite(PI / (s * gamma(1.0 - x)?));
    }
    let x = x - 1.0;
    let mut sum = LANCZOS_COEFFICIENTS[0];
    for (i, c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    finite((2.0 * PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_aliases() {
        assert_eq!(Function::from_name("arcsin"), Some(Function::Asin));
        assert_eq!(Function::from_name("sgn"), Some(Function::Sign));
        assert_eq!(Function::from_name("eval"), None);
        assert_eq!(Function::from_name("exec"), None);
    }

    #[test]
    fn test_constants() {
        assert_eq!(constant("pi"), Some(PI));
        assert_eq!(constant("\u{03C0}"), Some(PI));
        assert_eq!(constant("e"), Some(E));
        assert_eq!(constant("x"), None);
    }

    #[test]
    fn test_domain_errors() {
        assert_eq!(Function::Sqrt.apply(&[-1.0]), Err(ExprError::Domain("sqrt")));
        assert_eq!(Function::Ln.apply(&[0.0]), Err(ExprError::Domain("ln")));
        assert_eq!(Function::Asin.apply(&[2.0]), Err(ExprError::Domain("asin")));
        assert_eq!(Function::Csc.apply(&[0.0]), Err(ExprError::DivisionByZero));
    }

    #[test]
    fn test_log_variants() {
        assert!((Function::Log.apply(&[1000.0]).unwrap() - 3.0).abs() < 1e-12);
        assert!((Function::Log.apply(&[8.0, 2.0]).unwrap() - 3.0).abs() < 1e-12);
        assert!((Function::Log2.apply(&[8.0]).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0.0), Ok(1.0));
        assert_eq!(factorial(5.0), Ok(120.0));
        assert!(factorial(-1.0).is_err());
        assert!(factorial(2.5).is_err());
        assert_eq!(factorial(171.0), Err(ExprError::NonFinite));
    }

    #[test]
    fn test_gamma_matches_factorial() {
        for n in 1..10 {
            let g = gamma(n as f64 + 1.0).unwrap();
            let f = factorial(n as f64).unwrap();
            assert!((g - f).abs() / f < 1e-10, "gamma({}) = {}", n + 1, g);
        }
        let half = gamma(0.5).unwrap();
        assert!((half - PI.sqrt()).abs() < 1e-10);
        assert!(gamma(-2.0).is_err());
    }

    #[test]
    fn test_power_edge_cases() {
        assert_eq!(power(0.0, -1.0), Err(ExprError::DivisionByZero));
        assert_eq!(power(-8.0, 0.5), Err(ExprError::Domain("pow")));
        assert_eq!(power(-2.0, 3.0), Ok(-8.0));
    }

    #[test]
    fn test_min_max_variadic() {
        assert_eq!(Function::Min.apply(&[3.0, 1.0, 2.0]), Ok(1.0));
        assert_eq!(Function::Max.apply(&[3.0, 1.0, 2.0]), Ok(3.0));
        assert!(Function::Max.arity().accepts(5));
        assert!(!Function::Sin.arity().accepts(2));
    }
}
