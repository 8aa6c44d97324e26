//! Command pattern compilation
//!
//! Turns a command phrase into an anchored, case-insensitive regex:
//!
//! | Token     | Regex             | Meaning                                  |
//! |-----------|-------------------|------------------------------------------|
//! | `*`       | `(.+)`            | Greedy capture, spaces included          |
//! | `(word)`  | `\s*(?:word)?\s*` | Optional literal word                    |
//! | `:name`   | `([^\s]+)`        | Required single-word parameter           |
//! | `:name?`  | `(?:\s+([^\s]+))?` | Optional single-word parameter          |
//!
//! Everything else is escaped and matched literally.

use std::iter::Peekable;
use std::str::Chars;

use regex::Regex;

use super::types::CommandPattern;
use crate::{Error, Result};

/// Executable matcher for one command pattern
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
}

impl CompiledPattern {
    /// Compile a command pattern
    ///
    /// Custom regexes pass through untouched.
    ///
    /// # Errors
    ///
    /// Returns `Error::Pattern` if a phrase has unbalanced or empty
    /// optional groups
    pub fn compile(pattern: &CommandPattern) -> Result<Self> {
        match pattern {
            CommandPattern::Regex(regex) => Ok(Self {
                regex: regex.clone(),
            }),
            CommandPattern::Phrase(phrase) => {
                let source = phrase_to_regex(phrase)?;
                let regex = Regex::new(&source)
                    .map_err(|e| Error::pattern(phrase, e.to_string()))?;
                tracing::trace!(phrase, regex = %source, "compiled command phrase");
                Ok(Self { regex })
            }
        }
    }

    /// Test the input and return captured parameters
    ///
    /// Groups that did not participate in the match yield an empty string.
    #[must_use]
    pub fn captures(&self, input: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(input)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }

    /// Check if the input matches
    #[must_use]
    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    /// Underlying regex
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Translate a command phrase into regex source
fn phrase_to_regex(phrase: &str) -> Result<String> {
    const PREFIX: &str = "(?i)^";

    let mut out = String::from(PREFIX);
    let mut literal = String::new();
    let mut chars = phrase.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                flush_literal(&mut out, &mut literal);
                out.push_str("(.+)");
            }
            '(' => {
                let word = take_optional_word(phrase, &mut chars)?;
                trim_literal_end(&mut literal);
                flush_literal(&mut out, &mut literal);
                out.push_str(r"\s*(?:");
                out.push_str(&regex::escape(&word));
                out.push_str(r")?\s*");
                while chars.next_if(|c| c.is_whitespace()).is_some() {}
            }
            ')' => return Err(Error::pattern(phrase, "unbalanced ')'")),
            ':' if chars.peek().copied().is_some_and(is_param_char) => {
                while chars.next_if(|c| is_param_char(*c)).is_some() {}
                if chars.next_if_eq(&'?').is_some() {
                    trim_literal_end(&mut literal);
                    flush_literal(&mut out, &mut literal);
                    if out == PREFIX {
                        // Leading parameter owns the whitespace after it
                        out.push_str(r"(?:([^\s]+)\s+)?");
                        while chars.next_if(|c| c.is_whitespace()).is_some() {}
                    } else {
                        out.push_str(r"(?:\s+([^\s]+))?");
                    }
                } else {
                    flush_literal(&mut out, &mut literal);
                    out.push_str(r"([^\s]+)");
                }
            }
            _ => literal.push(c),
        }
    }

    flush_literal(&mut out, &mut literal);
    out.push('$');
    Ok(out)
}

/// Consume `word)` after an opening parenthesis
fn take_optional_word(phrase: &str, chars: &mut Peekable<Chars<'_>>) -> Result<String> {
    let mut word = String::new();
    loop {
        match chars.next() {
            Some(')') => break,
            Some('(') => return Err(Error::pattern(phrase, "nested '(' in optional word")),
            Some(c) => word.push(c),
            None => return Err(Error::pattern(phrase, "unbalanced '('")),
        }
    }

    let word = word.trim();
    if word.is_empty() {
        return Err(Error::pattern(phrase, "empty optional word '()'"));
    }
    Ok(word.to_string())
}

fn flush_literal(out: &mut String, literal: &mut String) {
    if !literal.is_empty() {
        out.push_str(&regex::escape(literal));
        literal.clear();
    }
}

fn trim_literal_end(literal: &mut String) {
    let len = literal.trim_end().len();
    literal.truncate(len);
}

const fn is_param_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
