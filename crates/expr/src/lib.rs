//! Expr - Sandboxed math expressions for plotted functions
//!
//! This crate provides:
//! - A tokenizer that normalizes implicit multiplication (`2x`, `(a)(b)`)
//! - A recursive-descent parser producing an [`Expr`] tree over a fixed
//!   allow-list of operators, constants and functions
//! - A tree-walking evaluator with nesting and step budgets
//!
//! Anything outside the allow-list is rejected while parsing; anything
//! that fails numerically (domain errors, division by zero, non-finite
//! results) is reported as an invalid [`Sample`] rather than a value.

pub mod ast;
pub mod error;
pub mod eval;
pub mod functions;
pub mod parser;
pub mod token;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use error::*;
pub use eval::{Bindings, Evaluator, Limits, Sample, DEFAULT_MAX_STEPS};
pub use functions::Function;
pub use parser::{parse, parse_with, ParseOptions, DEFAULT_MAX_DEPTH, DEFAULT_VARIABLES};

/// A compiled expression, ready to be evaluated many times
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Expr,
    limits: Limits,
}

impl Expression {
    /// Compile expression text with the default options
    pub fn compile(source: &str) -> ExprResult<Self> {
        Self::compile_with(source, ParseOptions::default(), Limits::default())
    }

    /// Compile expression text with explicit parse options and limits
    pub fn compile_with(source: &str, options: ParseOptions, limits: Limits) -> ExprResult<Self> {
        let root = parse_with(source, options)?;
        tracing::trace!(source, nodes = root.node_count(), "compiled expression");
        Ok(Self {
            source: source.to_string(),
            root,
            limits,
        })
    }

    /// Original source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parsed tree
    pub fn root(&self) -> &Expr {
        &self.root
    }

    /// Evaluate, reporting the failure reason
    pub fn eval(&self, bindings: &Bindings) -> ExprResult<f64> {
        Evaluator::new(bindings, self.limits).evaluate(&self.root)
    }

    /// Evaluate into a sample; every failure becomes `valid = false`
    pub fn sample(&self, bindings: &Bindings) -> Sample {
        Sample::from(self.eval(bindings))
    }
}

/// Compile and evaluate in one step.
///
/// Compilation failures (disallowed tokens, unknown identifiers,
/// unbalanced parentheses) and evaluation failures alike yield an invalid
/// sample.
pub fn evaluate(source: &str, bindings: &Bindings) -> Sample {
    match Expression::compile(source) {
        Ok(expression) => expression.sample(bindings),
        Err(err) => {
            tracing::debug!(source, error = %err, "expression rejected");
            Sample::invalid()
        }
    }
}
