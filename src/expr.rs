use std::fmt;

/// Display marker for any evaluation failure. Computation errors never
/// escape as protocol errors; the UI shows this string instead.
pub const ERROR_MARKER: &str = "Error";

pub fn is_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/')
}

/// Token characters the keypad and keyboard may append. The lexer
/// additionally tolerates spaces inside a buffer.
pub fn is_token_char(c: char) -> bool {
    c.is_ascii_digit() || is_operator(c) || matches!(c, '.' | '(' | ')')
}

/// Appends one token under the operator-collision rules:
/// an operator on an empty buffer is rejected unless it is `-`, and an
/// operator after a trailing operator replaces it. Returns whether the
/// buffer changed.
pub fn append(buffer: &mut String, token: char) -> bool {
    if is_operator(token) {
        if buffer.is_empty() {
            if token != '-' {
                return false;
            }
            buffer.push(token);
            return true;
        }
        if buffer.chars().last().map(is_operator).unwrap_or(false) {
            buffer.pop();
            buffer.push(token);
            return true;
        }
    }
    buffer.push(token);
    true
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprError {
    InvalidCharacter(char),
    BadNumber(String),
    UnexpectedToken(String),
    UnexpectedEnd,
    UnbalancedParen,
    DivisionByZero,
    Overflow,
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprError::InvalidCharacter(c) => write!(f, "invalid character '{c}'"),
            ExprError::BadNumber(s) => write!(f, "bad number '{s}'"),
            ExprError::UnexpectedToken(t) => write!(f, "unexpected '{t}'"),
            ExprError::UnexpectedEnd => write!(f, "expression ends early"),
            ExprError::UnbalancedParen => write!(f, "unbalanced parenthesis"),
            ExprError::DivisionByZero => write!(f, "division by zero"),
            ExprError::Overflow => write!(f, "result is not finite"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn lex(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ExprError::BadNumber(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
            other => return Err(ExprError::InvalidCharacter(other)),
        }
    }
    Ok(tokens)
}

/// Recursive-descent parse-and-fold:
/// expr := term (('+'|'-') term)*
/// term := factor (('*'|'/') factor)*
/// factor := '-' factor | number | '(' expr ')'
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.peek();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expression(&mut self) -> Result<f64, ExprError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.bump();
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.bump();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.factor()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.bump();
                    value *= self.factor()?;
                }
                Some(Token::Slash) => {
                    self.bump();
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(ExprError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, ExprError> {
        match self.bump() {
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(Token::Number(v)) => Ok(v),
            Some(Token::LParen) => {
                let value = self.expression()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(ExprError::UnbalancedParen),
                }
            }
            Some(Token::Plus) => Err(ExprError::UnexpectedToken("+".to_string())),
            Some(Token::Star) => Err(ExprError::UnexpectedToken("*".to_string())),
            Some(Token::Slash) => Err(ExprError::UnexpectedToken("/".to_string())),
            Some(Token::RParen) => Err(ExprError::UnbalancedParen),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

/// Evaluates a buffer. An empty or whitespace-only buffer has no value
/// (`Ok(None)`) and displays as an empty string rather than an error.
pub fn evaluate(buffer: &str) -> Result<Option<f64>, ExprError> {
    let tokens = lex(buffer)?;
    if tokens.is_empty() {
        return Ok(None);
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
    };
    let value = parser.expression()?;
    // `expression` consumes every operator it can reach, so leftovers
    // are a stray closing paren or a fresh operand.
    if let Some(tok) = parser.peek() {
        return Err(match tok {
            Token::RParen => ExprError::UnbalancedParen,
            Token::Number(v) => ExprError::UnexpectedToken(format_value(v)),
            Token::LParen => ExprError::UnexpectedToken("(".to_string()),
            Token::Plus => ExprError::UnexpectedToken("+".to_string()),
            Token::Minus => ExprError::UnexpectedToken("-".to_string()),
            Token::Star => ExprError::UnexpectedToken("*".to_string()),
            Token::Slash => ExprError::UnexpectedToken("/".to_string()),
        });
    }
    if !value.is_finite() {
        return Err(ExprError::Overflow);
    }
    Ok(Some(value))
}

/// Shortest-roundtrip display; integral results print without a
/// fraction (`14`, not `14.0`).
pub fn format_value(value: f64) -> String {
    format!("{value}")
}

/// Session buffer for the on-screen calculator. After a failed
/// evaluation the display shows `Error` and the next appended token
/// starts a fresh buffer.
#[derive(Debug, Default)]
pub struct CalculatorState {
    buffer: String,
    error: bool,
}

impl CalculatorState {
    pub fn display(&self) -> String {
        if self.error {
            ERROR_MARKER.to_string()
        } else {
            self.buffer.clone()
        }
    }

    pub fn push(&mut self, token: char) -> bool {
        if self.error {
            self.buffer.clear();
            self.error = false;
        }
        append(&mut self.buffer, token)
    }

    pub fn backspace(&mut self) {
        if self.error {
            self.buffer.clear();
            self.error = false;
        } else {
            self.buffer.pop();
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.error = false;
    }

    /// On success the result becomes the new buffer so further tokens
    /// chain onto it.
    pub fn evaluate(&mut self) -> Result<(), ExprError> {
        match evaluate(&self.buffer) {
            Ok(Some(value)) => {
                self.buffer = format_value(value);
                self.error = false;
                Ok(())
            }
            Ok(None) => {
                self.buffer.clear();
                self.error = false;
                Ok(())
            }
            Err(e) => {
                self.buffer.clear();
                self.error = true;
                Err(e)
            }
        }
    }
}
