//! Error types for the expr crate

use thiserror::Error;

/// Errors raised while compiling or evaluating an expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    /// A character outside the accepted alphabet
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    /// A token that does not fit the grammar at this point
    #[error("Unexpected token {found} at position {position}")]
    UnexpectedToken { found: String, position: usize },

    /// Input ended while more was expected
    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    /// Opening and closing parentheses do not match
    #[error("Unbalanced parentheses")]
    UnbalancedParens,

    /// Identifier that is neither an allowed variable, constant nor function
    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),

    /// Function called with the wrong number of arguments
    #[error("Function {name} expects {expected} argument(s), got {actual}")]
    Arity {
        name: String,
        expected: String,
        actual: usize,
    },

    /// Expression nests deeper than the configured limit
    #[error("Expression nesting exceeds depth {0}")]
    DepthExceeded(usize),

    /// Empty input
    #[error("Empty expression")]
    Empty,

    /// Variable referenced at evaluation time but not bound
    #[error("Unbound variable: {0}")]
    UnboundVariable(String),

    /// Division (or reciprocal power) by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Argument outside the function's mathematical domain
    #[error("Domain error in {0}")]
    Domain(&'static str),

    /// Result is NaN or infinite
    #[error("Non-finite result")]
    NonFinite,

    /// Evaluation visited more nodes than allowed
    #[error("Evaluation exceeded {0} steps")]
    StepBudgetExceeded(usize),
}

impl ExprError {
    /// Whether this error comes from evaluating a single sample rather
    /// than from compiling the expression
    pub fn is_sample_error(&self) -> bool {
        matches!(
            self,
            ExprError::UnboundVariable(_)
                | ExprError::DivisionByZero
                | ExprError::Domain(_)
                | ExprError::NonFinite
                | ExprError::StepBudgetExceeded(_)
        )
    }
}

/// Result type for expression operations
pub type ExprResult<T> = Result<T, ExprError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExprError::UnknownIdentifier("system".to_string());
        assert_eq!(err.to_string(), "Unknown identifier: system");
    }

    #[test]
    fn test_sample_error_classification() {
        assert!(ExprError::DivisionByZero.is_sample_error());
        assert!(ExprError::Domain("sqrt").is_sample_error());
        assert!(!ExprError::UnbalancedParens.is_sample_error());
        assert!(!ExprError::DepthExceeded(64).is_sample_error());
    }
}
