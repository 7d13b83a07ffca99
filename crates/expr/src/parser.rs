//! Recursive-descent parser
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! sum      := product (('+' | '-') product)*
//! product  := unary (('*' | '/') unary)*
//! unary    := ('-' | '+') unary | power
//! power    := postfix ('^' unary)?
//! postfix  := primary '!'*
//! primary  := number | constant | variable | function '(' args ')' | '(' sum ')'
//! ```
//!
//! Both the nesting encountered while descending and the depth of the
//! resulting tree are bounded, so hostile input cannot exhaust the stack
//! during parsing or during later evaluation.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{ExprError, ExprResult};
use crate::functions::{constant, Function};
use crate::token::{tokenize, Spanned, Token};

/// Default maximum nesting depth of an expression
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Variables accepted when the caller does not restrict them
pub const DEFAULT_VARIABLES: &[&str] = &["x", "y", "t", "\u{03B8}", "theta"];

/// Parser configuration
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Names that may appear as free variables
    pub variables: Vec<String>,
    /// Maximum nesting depth
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            variables: DEFAULT_VARIABLES.iter().map(|v| v.to_string()).collect(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Restrict the accepted variable names
    pub fn with_variables(mut self, variables: &[&str]) -> Self {
        self.variables = variables.iter().map(|v| v.to_string()).collect();
        self
    }

    /// Set the nesting limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// A parsed subtree and its depth
type Node = (Expr, usize);

/// Parser over a normalized token stream
pub struct Parser {
    tokens: Vec<Spanned>,
    position: usize,
    nesting: usize,
    options: ParseOptions,
}

impl Parser {
    /// Tokenize the input and prepare to parse it
    pub fn new(input: &str, options: ParseOptions) -> ExprResult<Self> {
        let tokens = tokenize(input)?;
        Ok(Self {
            tokens,
            position: 0,
            nesting: 0,
            options,
        })
    }

    /// Parse the complete input into an expression tree
    pub fn parse(&mut self) -> ExprResult<Expr> {
        if self.tokens.is_empty() {
            return Err(ExprError::Empty);
        }

        let (expr, _) = self.parse_sum()?;

        match self.tokens.get(self.position) {
            None => Ok(expr),
            Some(Spanned {
                token: Token::RParen,
                ..
            }) => Err(ExprError::UnbalancedParens),
            Some(spanned) => Err(ExprError::UnexpectedToken {
                found: spanned.token.describe(),
                position: spanned.position,
            }),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn unexpected(&self) -> ExprError {
        match self.tokens.get(self.position) {
            Some(spanned) => ExprError::UnexpectedToken {
                found: spanned.token.describe(),
                position: spanned.position,
            },
            None => ExprError::UnexpectedEnd,
        }
    }

    fn descend(&mut self) -> ExprResult<()> {
        self.nesting += 1;
        if self.nesting > self.options.max_depth {
            Err(ExprError::DepthExceeded(self.options.max_depth))
        } else {
            Ok(())
        }
    }

    fn ascend(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
    }

    fn check_depth(&self, depth: usize) -> ExprResult<()> {
        if depth > self.options.max_depth {
            Err(ExprError::DepthExceeded(self.options.max_depth))
        } else {
            Ok(())
        }
    }

    fn checked(&self, node: Node) -> ExprResult<Node> {
        self.check_depth(node.1)?;
        Ok(node)
    }

    fn parse_sum(&mut self) -> ExprResult<Node> {
        let (mut lhs, mut depth) = self.parse_product()?;

        loop {
            let op = match self.peek() {
                Some(Token::Op('+')) => BinaryOp::Add,
                Some(Token::Op('-')) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let (rhs, rhs_depth) = self.parse_product()?;
            depth = depth.max(rhs_depth) + 1;
            lhs = Expr::binary(op, lhs, rhs);
            self.check_depth(depth)?;
        }

        Ok((lhs, depth))
    }

    fn parse_product(&mut self) -> ExprResult<Node> {
        let (mut lhs, mut depth) = self.parse_unary()?;

        loop {
            let op = match self.peek() {
                Some(Token::Op('*')) => BinaryOp::Mul,
                Some(Token::Op('/')) => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let (rhs, rhs_depth) = self.parse_unary()?;
            depth = depth.max(rhs_depth) + 1;
            lhs = Expr::binary(op, lhs, rhs);
            self.check_depth(depth)?;
        }

        Ok((lhs, depth))
    }

    fn parse_unary(&mut self) -> ExprResult<Node> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.advance();
                self.descend()?;
                let (operand, depth) = self.parse_unary()?;
                self.ascend();
                self.checked((Expr::unary(UnaryOp::Neg, operand), depth + 1))
            }
            Some(Token::Op('+')) => {
                self.advance();
                self.descend()?;
                let node = self.parse_unary()?;
                self.ascend();
                Ok(node)
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> ExprResult<Node> {
        let (base, base_depth) = self.parse_postfix()?;

        if matches!(self.peek(), Some(Token::Op('^'))) {
            self.advance();
            self.descend()?;
            let (exponent, exp_depth) = self.parse_unary()?;
            self.ascend();
            let depth = base_depth.max(exp_depth) + 1;
            return self.checked((Expr::binary(BinaryOp::Pow, base, exponent), depth));
        }

        Ok((base, base_depth))
    }

    fn parse_postfix(&mut self) -> ExprResult<Node> {
        let (mut expr, mut depth) = self.parse_primary()?;
        while matches!(self.peek(), Some(Token::Bang)) {
            self.advance();
            expr = Expr::unary(UnaryOp::Factorial, expr);
            depth += 1;
            self.check_depth(depth)?;
        }
        Ok((expr, depth))
    }

    fn parse_primary(&mut self) -> ExprResult<Node> {
        let spanned = match self.advance() {
            Some(spanned) => spanned,
            None => return Err(ExprError::UnexpectedEnd),
        };

        match spanned.token {
            Token::Number(value) => Ok((Expr::Number(value), 1)),
            Token::Ident(name) => self.parse_identifier(name),
            Token::LParen => {
                self.descend()?;
                let (inner, depth) = self.parse_sum()?;
                self.ascend();
                match self.advance() {
                    Some(Spanned {
                        token: Token::RParen,
                        ..
                    }) => Ok((inner, depth)),
                    _ => Err(ExprError::UnbalancedParens),
                }
            }
            Token::RParen => Err(ExprError::UnbalancedParens),
            other => Err(ExprError::UnexpectedToken {
                found: other.describe(),
                position: spanned.position,
            }),
        }
    }

    fn parse_identifier(&mut self, name: String) -> ExprResult<Node> {
        if let Some(function) = Function::from_name(&name) {
            return self.parse_call(function);
        }
        if let Some(value) = constant(&name) {
            return Ok((Expr::Number(value), 1));
        }
        if self.options.variables.iter().any(|v| *v == name) {
            return Ok((Expr::Variable(name), 1));
        }
        Err(ExprError::UnknownIdentifier(name))
    }

    fn parse_call(&mut self, function: Function) -> ExprResult<Node> {
        match self.peek() {
            Some(Token::LParen) => {
                self.advance();
            }
            _ => return Err(self.unexpected()),
        }

        self.descend()?;
        let mut args = Vec::new();
        let mut depth = 0;

        if matches!(self.peek(), Some(Token::RParen)) {
            self.advance();
        } else {
            loop {
                let (arg, arg_depth) = self.parse_sum()?;
                depth = depth.max(arg_depth);
                args.push(arg);
                match self.advance() {
                    Some(Spanned {
                        token: Token::Comma,
                        ..
                    }) => continue,
                    Some(Spanned {
                        token: Token::RParen,
                        ..
                    }) => break,
                    Some(spanned) => {
                        return Err(ExprError::UnexpectedToken {
                            found: spanned.token.describe(),
                            position: spanned.position,
                        })
                    }
                    None => return Err(ExprError::UnbalancedParens),
                }
            }
        }
        self.ascend();

        let arity = function.arity();
        if !arity.accepts(args.len()) {
            return Err(ExprError::Arity {
                name: function.name().to_string(),
                expected: arity.describe(),
                actual: args.len(),
            });
        }

        self.checked((Expr::Call { function, args }, depth + 1))
    }
}

/// Parse expression text with default options
pub fn parse(input: &str) -> ExprResult<Expr> {
    Parser::new(input, ParseOptions::default())?.parse()
}

/// Parse expression text with explicit options
pub fn parse_with(input: &str, options: ParseOptions) -> ExprResult<Expr> {
    Parser::new(input, options)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse("42").unwrap(), Expr::Number(42.0));
    }

    #[test]
    fn test_precedence() {
        let expr = parse("1 + 2 * 3").unwrap();
        assert!(matches!(expr, Expr::Binary { op: BinaryOp::Add, .. }));
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse("2^3^2").unwrap();
        if let Expr::Binary { op, rhs, .. } = expr {
            assert_eq!(op, BinaryOp::Pow);
            assert!(matches!(*rhs, Expr::Binary { op: BinaryOp::Pow, .. }));
        } else {
            panic!("Expected Binary");
        }
    }

    #[test]
    fn test_negation_binds_looser_than_power() {
        let expr = parse("-x^2").unwrap();
        if let Expr::Unary { op, operand } = expr {
            assert_eq!(op, UnaryOp::Neg);
            assert!(matches!(*operand, Expr::Binary { op: BinaryOp::Pow, .. }));
        } else {
            panic!("Expected Unary");
        }
    }

    #[test]
    fn test_function_call() {
        let expr = parse("max(1, x, 3)").unwrap();
        if let Expr::Call { function, args } = expr {
            assert_eq!(function, Function::Max);
            assert_eq!(args.len(), 3);
        } else {
            panic!("Expected Call");
        }
    }

    #[test]
    fn test_constant_resolved() {
        assert_eq!(parse("pi").unwrap(), Expr::Number(std::f64::consts::PI));
    }

    #[test]
    fn test_postfix_factorial() {
        let expr = parse("3!").unwrap();
        assert!(matches!(expr, Expr::Unary { op: UnaryOp::Factorial, .. }));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(parse("(x + 1"), Err(ExprError::UnbalancedParens));
        assert_eq!(parse("x + 1)"), Err(ExprError::UnbalancedParens));
        assert_eq!(parse("sin(x"), Err(ExprError::UnbalancedParens));
    }

    #[test]
    fn test_unknown_identifier() {
        assert_eq!(
            parse("system(1)"),
            Err(ExprError::UnknownIdentifier("system".to_string()))
        );
        assert!(matches!(parse("while"), Err(ExprError::UnknownIdentifier(_))));
    }

    #[test]
    fn test_restricted_variables() {
        let options = ParseOptions::default().with_variables(&["t"]);
        assert!(parse_with("sin(t)", options.clone()).is_ok());
        assert_eq!(
            parse_with("sin(x)", options),
            Err(ExprError::UnknownIdentifier("x".to_string()))
        );
    }

    #[test]
    fn test_arity_checked() {
        assert!(matches!(parse("sin(1, 2)"), Err(ExprError::Arity { .. })));
        assert!(matches!(parse("atan2(1)"), Err(ExprError::Arity { .. })));
    }

    #[test]
    fn test_function_requires_parentheses() {
        assert!(parse("sin x").is_err());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse("   "), Err(ExprError::Empty));
        assert!(parse("()").is_err());
    }

    #[test]
    fn test_depth_limit_on_nesting() {
        let deep = format!("{}x{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(parse(&deep), Err(ExprError::DepthExceeded(DEFAULT_MAX_DEPTH)));
    }

    #[test]
    fn test_depth_limit_on_long_chains() {
        let chain = vec!["1"; 500].join("+");
        assert_eq!(parse(&chain), Err(ExprError::DepthExceeded(DEFAULT_MAX_DEPTH)));
    }

    #[test]
    fn test_moderate_chain_is_accepted() {
        let chain = vec!["x"; 20].join("+");
        assert!(parse(&chain).is_ok());
    }
}
