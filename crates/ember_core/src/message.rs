//! Protocol messages
//!
//! A message is a selector followed by a fixed-arity list of atoms. The text
//! form (`eval "1 + 1"`, `exec x = 5`) is what a host message box sends.

use crate::atom::Atom;
use crate::codec::decode;
use std::fmt;
use thiserror::Error;

/// Errors produced while parsing the text form of a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty message")]
    Empty,

    #[error("message must start with a selector, found '{found}'")]
    NumericSelector { found: String },

    #[error("unterminated quoted symbol starting at byte {offset}")]
    UnterminatedQuote { offset: usize },
}

/// One message addressed to an owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    selector: String,
    args: Vec<Atom>,
    // Argument text as typed, so numbers reach the interpreter unrounded.
    source: String,
}

impl Message {
    pub fn new(selector: impl Into<String>, args: Vec<Atom>) -> Self {
        let source = decode(&args);
        Self {
            selector: selector.into(),
            args,
            source,
        }
    }

    /// Parse the text form of a message.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut tokens = tokenize(line)?.into_iter();
        let selector = match tokens.next() {
            None => return Err(ParseError::Empty),
            Some(Token { atom: Atom::Symbol(selector), .. }) => selector,
            Some(Token { lexeme, .. }) => return Err(ParseError::NumericSelector { found: lexeme }),
        };

        let (args, lexemes): (Vec<Atom>, Vec<String>) =
            tokens.map(|token| (token.atom, token.lexeme)).unzip();
        Ok(Self {
            selector,
            args,
            source: lexemes.join(" "),
        })
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn args(&self) -> &[Atom] {
        &self.args
    }

    /// Arguments joined back into source text. Parsed messages keep each
    /// token exactly as it was written.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.selector)?;
        if !self.source.is_empty() {
            write!(f, " {}", self.source)?;
        }
        Ok(())
    }
}

struct Token {
    atom: Atom,
    lexeme: String,
}

fn tokenize(line: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' {
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            while let Some((_, c)) = chars.next() {
                match c {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some((_, escaped @ ('"' | '\\'))) => text.push(escaped),
                        Some((_, other)) => {
                            text.push('\\');
                            text.push(other);
                        }
                        None => text.push('\\'),
                    },
                    other => text.push(other),
                }
            }
            if !closed {
                return Err(ParseError::UnterminatedQuote { offset });
            }
            tokens.push(Token {
                atom: Atom::Symbol(text.clone()),
                lexeme: text,
            });
            continue;
        }

        let mut token = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            token.push(c);
            chars.next();
        }
        tokens.push(Token {
            atom: classify(&token),
            lexeme: token,
        });
    }

    Ok(tokens)
}

fn classify(token: &str) -> Atom {
    if looks_numeric(token) {
        if let Ok(value) = token.parse::<i64>() {
            return Atom::Int(value);
        }
        if let Ok(value) = token.parse::<f32>() {
            return Atom::Float(value);
        }
    }
    Atom::symbol(token)
}

// Rejects words like `inf` and `nan` that `f32::from_str` would accept.
fn looks_numeric(token: &str) -> bool {
    let digits = token.strip_prefix(['-', '+']).unwrap_or(token);
    let digits = digits.strip_prefix('.').unwrap_or(digits);
    digits.starts_with(|c: char| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selector_and_typed_atoms() {
        let message = Message::parse("list 1 -2.5 foo .5").unwrap();
        assert_eq!(message.selector(), "list");
        assert_eq!(
            message.args(),
            &[Atom::Int(1), Atom::Float(-2.5), Atom::symbol("foo"), Atom::Float(0.5)]
        );
    }

    #[test]
    fn quotes_group_a_single_symbol() {
        let message = Message::parse(r#"exec "x = \"a b\"""#).unwrap();
        assert_eq!(message.args(), &[Atom::symbol(r#"x = "a b""#)]);
    }

    #[test]
    fn words_that_float_parsing_accepts_stay_symbols() {
        let message = Message::parse("eval inf nan 1e3x").unwrap();
        assert_eq!(
            message.args(),
            &[Atom::symbol("inf"), Atom::symbol("nan"), Atom::symbol("1e3x")]
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(Message::parse("   "), Err(ParseError::Empty));
        assert_eq!(
            Message::parse("42 eval"),
            Err(ParseError::NumericSelector { found: "42".into() })
        );
        assert_eq!(
            Message::parse(r#"eval "open"#),
            Err(ParseError::UnterminatedQuote { offset: 5 })
        );
    }

    #[test]
    fn source_keeps_numbers_as_written() {
        let message = Message::parse("exec x = 3.14159265358979").unwrap();
        assert_eq!(message.args()[2], Atom::Float(3.141_592_7));
        assert_eq!(message.source(), "x = 3.14159265358979");

        let message = Message::parse("eval 1e40").unwrap();
        assert_eq!(message.args(), &[Atom::Float(f32::INFINITY)]);
        assert_eq!(message.source(), "1e40");

        let message = Message::parse(r#"eval "a  b" 007"#).unwrap();
        assert_eq!(message.source(), "a  b 007");
    }

    #[test]
    fn built_messages_render_their_atoms() {
        let message = Message::new("exec", vec![Atom::symbol("y"), Atom::symbol("="), Atom::Float(0.5)]);
        assert_eq!(message.source(), "y = 0.5");
        assert_eq!(message.to_string(), "exec y = 0.5");
    }

    #[test]
    fn display_round_trips_unquoted_messages() {
        let message = Message::parse("exec x = 5").unwrap();
        assert_eq!(message.to_string(), "exec x = 5");
    }
}
