//! Tokenizer for the expression language
//!
//! Turns expression text into a flat token list and then normalizes
//! implicit multiplication (`2x`, `(a)(b)`, `3sin(x)`) into explicit `*`
//! tokens so the parser only ever sees the explicit grammar.

use crate::error::{ExprError, ExprResult};
use crate::functions::Function;

// =============================================================================
// Tokens
// =============================================================================

/// A lexical token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal
    Number(f64),
    /// Variable, constant or function name
    Ident(String),
    /// Binary or unary operator: one of `+ - * / ^`
    Op(char),
    /// Postfix factorial `!`
    Bang,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// Argument separator
    Comma,
}

impl Token {
    /// Short human-readable description used in error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Op(c) => format!("operator '{}'", c),
            Token::Bang => "'!'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
        }
    }
}

/// A token together with its character offset in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

// =============================================================================
// Tokenizer
// =============================================================================

struct Tokenizer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    position: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    fn next_token(&mut self) -> ExprResult<Option<Spanned>> {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }

        let position = self.position;
        let c = match self.chars.peek() {
            Some(&c) => c,
            None => return Ok(None),
        };

        let token = match c {
            '0'..='9' | '.' => self.read_number()?,
            '+' | '/' | '^' => {
                self.advance();
                Token::Op(c)
            }
            '-' | '\u{2212}' => {
                self.advance();
                Token::Op('-')
            }
            '*' | '\u{00D7}' | '\u{22C5}' => {
                self.advance();
                // `**` is accepted as a power operator
                if c == '*' && self.chars.peek() == Some(&'*') {
                    self.advance();
                    Token::Op('^')
                } else {
                    Token::Op('*')
                }
            }
            '\u{00F7}' => {
                self.advance();
                Token::Op('/')
            }
            '!' => {
                self.advance();
                Token::Bang
            }
            '(' => {
                self.advance();
                Token::LParen
            }
            ')' => {
                self.advance();
                Token::RParen
            }
            ',' => {
                self.advance();
                Token::Comma
            }
            c if c.is_alphabetic() => self.read_identifier(),
            _ => return Err(ExprError::UnexpectedChar { ch: c, position }),
        };

        Ok(Some(Spanned { token, position }))
    }

    fn read_number(&mut self) -> ExprResult<Token> {
        let start = self.position;
        let mut text = String::new();
        let mut has_dot = false;

        while let Some(&c) = self.chars.peek() {
            match c {
                '0'..='9' => {
                    text.push(c);
                    self.advance();
                }
                '.' if !has_dot => {
                    has_dot = true;
                    text.push(c);
                    self.advance();
                }
                _ => break,
            }
        }

        // Scientific notation only when `e` is followed by a digit (or a
        // signed digit); otherwise `2e` means `2 * e`.
        if matches!(self.chars.peek(), Some('e') | Some('E')) {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            let exponent_follows = match lookahead.next() {
                Some(d) if d.is_ascii_digit() => true,
                Some('+') | Some('-') => matches!(lookahead.next(), Some(d) if d.is_ascii_digit()),
                _ => false,
            };
            if exponent_follows {
                if let Some(e) = self.advance() {
                    text.push(e);
                }
                if let Some(&sign) = self.chars.peek() {
                    if sign == '+' || sign == '-' {
                        text.push(sign);
                        self.advance();
                    }
                }
                while let Some(&d) = self.chars.peek() {
                    if d.is_ascii_digit() {
                        text.push(d);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }

        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| ExprError::UnexpectedToken {
                found: text.clone(),
                position: start,
            })
    }

    fn read_identifier(&mut self) -> Token {
        let mut ident = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        Token::Ident(ident)
    }
}

/// Tokenize expression text, normalizing implicit multiplication
pub fn tokenize(input: &str) -> ExprResult<Vec<Spanned>> {
    let mut tokenizer = Tokenizer::new(input);
    let mut tokens = Vec::new();
    while let Some(token) = tokenizer.next_token()? {
        tokens.push(token);
    }
    Ok(insert_implicit_multiplication(tokens))
}

fn ends_operand(token: &Token) -> bool {
    match token {
        Token::Number(_) | Token::RParen | Token::Bang => true,
        Token::Ident(name) => Function::from_name(name).is_none(),
        _ => false,
    }
}

fn starts_operand(token: &Token) -> bool {
    matches!(token, Token::Number(_) | Token::Ident(_) | Token::LParen)
}

fn insert_implicit_multiplication(tokens: Vec<Spanned>) -> Vec<Spanned> {
    let mut out: Vec<Spanned> = Vec::with_capacity(tokens.len());
    for spanned in tokens {
        if let Some(prev) = out.last() {
            let both_numbers =
                matches!(prev.token, Token::Number(_)) && matches!(spanned.token, Token::Number(_));
            if ends_operand(&prev.token) && starts_operand(&spanned.token) && !both_numbers {
                out.push(Spanned {
                    token: Token::Op('*'),
                    position: spanned.position,
                });
            }
        }
        out.push(spanned);
    }
    out
}
