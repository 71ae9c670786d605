//! Command template parser
//!
//! Parses saved command strings into literal runs and variable slots.
//!
//! Supported syntax:
//! - `%(name)` - Variable placeholder, name matches `[A-Za-z_-]+`
//! - `%%` - Escaped literal percent sign
//!
//! Anything else is literal text, including a lone `%`, an empty `%()` and an
//! unterminated `%(`.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

/// Errors produced while parsing or rendering a template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Invalid variable name '{var_name}' in command '{template}'. Only a-zA-Z_- allowed")]
    InvalidVariableName { var_name: String, template: String },

    #[error("No value given for variable '{name}'")]
    MissingVariable { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Literal,
    Variable,
}

/// One piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Literal text, or the identifier for a variable
    pub text: String,
}

impl Token {
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Literal,
            text: text.into(),
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Variable,
            text: name.into(),
        }
    }

    pub fn is_variable(&self) -> bool {
        self.kind == TokenKind::Variable
    }
}

/// Parse a template string into its token sequence
///
/// # Examples
///
/// ```
/// use spellbook::template::{parse_template, Token};
///
/// let tokens = parse_template("git log %(branch)").unwrap();
/// assert_eq!(tokens, vec![Token::literal("git log "), Token::variable("branch")]);
/// ```
pub fn parse_template(template: &str) -> Result<Vec<Token>, TemplateError> {
    let bytes = template.as_bytes();
    let mut tokens = Vec::new();
    let mut literal = String::new();

    // `start` marks the first byte not yet copied into `literal`
    let mut start = 0;
    let mut pos = 0;

    loop {
        let Some(off) = template[pos..].find('%') else {
            literal.push_str(&template[start..]);
            break;
        };
        pos += off;

        // Trailing lone '%'
        if pos + 1 == template.len() {
            literal.push_str(&template[start..]);
            break;
        }

        match bytes[pos + 1] {
            b'%' => {
                // keep one '%', drop the second
                literal.push_str(&template[start..=pos]);
                pos += 2;
                start = pos;
            }
            b'(' => match template[pos..].find(')') {
                None => {
                    literal.push_str(&template[start..]);
                    break;
                }
                // '%()' stays literal
                Some(2) => pos += 2,
                Some(close) => {
                    literal.push_str(&template[start..pos]);
                    flush_literal(&mut literal, &mut tokens);

                    let ident = &template[pos + 2..pos + close];
                    if !is_valid_identifier(ident) {
                        return Err(TemplateError::InvalidVariableName {
                            var_name: ident.to_string(),
                            template: template.to_string(),
                        });
                    }
                    tokens.push(Token::variable(ident));

                    pos += close + 1;
                    start = pos;
                }
            },
            _ => {
                // '%' followed by any other char is literal; step over both
                let next_len = template[pos + 1..]
                    .chars()
                    .next()
                    .map(char::len_utf8)
                    .unwrap_or(1);
                pos += 1 + next_len;
            }
        }
    }

    flush_literal(&mut literal, &mut tokens);
    Ok(tokens)
}

fn flush_literal(literal: &mut String, tokens: &mut Vec<Token>) {
    if !literal.is_empty() {
        tokens.push(Token::literal(std::mem::take(literal)));
    }
}

fn is_valid_identifier(ident: &str) -> bool {
    !ident.is_empty()
        && ident
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == '_' || c == '-')
}

/// Distinct variable names in order of first appearance
pub fn variables(tokens: &[Token]) -> Vec<&str> {
    let mut seen = HashSet::new();
    tokens
        .iter()
        .filter(|t| t.is_variable())
        .map(|t| t.text.as_str())
        .filter(|name| seen.insert(*name))
        .collect()
}

/// Substitute variable values into a token sequence
pub fn render(tokens: &[Token], values: &HashMap<String, String>) -> Result<String, TemplateError> {
    let mut out = String::new();
    for token in tokens {
        match token.kind {
            TokenKind::Literal => out.push_str(&token.text),
            TokenKind::Variable => {
                let value =
                    values
                        .get(&token.text)
                        .ok_or_else(|| TemplateError::MissingVariable {
                            name: token.text.clone(),
                        })?;
                out.push_str(value);
            }
        }
    }
    Ok(out)
}
