//! Tree-walking evaluator
//!
//! Evaluation visits the parsed tree directly; there is no textual
//! substitution step and no path to any host-level code execution.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{ExprError, ExprResult};
use crate::functions::{factorial, finite, power};
use serde::{Deserialize, Serialize};

/// Default maximum number of tree nodes visited per evaluation
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// Variable values for one evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: Vec<(String, f64)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings with a single variable
    pub fn single(name: &str, value: f64) -> Self {
        Self::new().with(name, value)
    }

    /// Add or replace a binding
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.set(name, value);
        self
    }

    /// Add or replace a binding in place
    pub fn set(&mut self, name: &str, value: f64) {
        match self.values.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| *value)
    }
}

/// Work limits applied to one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_steps: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Outcome of evaluating one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub value: f64,
    pub valid: bool,
}

impl Sample {
    pub fn valid(value: f64) -> Self {
        Self { value, valid: true }
    }

    pub fn invalid() -> Self {
        Self {
            value: f64::NAN,
            valid: false,
        }
    }
}

impl From<ExprResult<f64>> for Sample {
    fn from(result: ExprResult<f64>) -> Self {
        match result {
            Ok(value) if value.is_finite() => Sample::valid(value),
            _ => Sample::invalid(),
        }
    }
}

/// Evaluator state for a single evaluation
pub struct Evaluator<'a> {
    bindings: &'a Bindings,
    limits: Limits,
    steps: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(bindings: &'a Bindings, limits: Limits) -> Self {
        Self {
            bindings,
            limits,
            steps: 0,
        }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> ExprResult<f64> {
        self.steps += 1;
        if self.steps > self.limits.max_steps {
            return Err(ExprError::StepBudgetExceeded(self.limits.max_steps));
        }

        match expr {
            Expr::Number(value) => Ok(*value),
            Expr::Variable(name) => self
                .bindings
                .get(name)
                .ok_or_else(|| ExprError::UnboundVariable(name.clone())),
            Expr::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                match op {
                    UnaryOp::Neg => Ok(-value),
                    UnaryOp::Factorial => factorial(value),
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let a = self.evaluate(lhs)?;
                let b = self.evaluate(rhs)?;
                match op {
                    BinaryOp::Add => finite(a + b),
                    BinaryOp::Sub => finite(a - b),
                    BinaryOp::Mul => finite(a * b),
                    BinaryOp::Div => {
                        if b == 0.0 {
                            Err(ExprError::DivisionByZero)
                        } else {
                            finite(a / b)
                        }
                    }
                    BinaryOp::Pow => power(a, b),
                }
            }
            Expr::Call { function, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.evaluate(arg)?);
                }
                function.apply(&values)
            }
        }
    }
}
