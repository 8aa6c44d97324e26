//! Command pattern and match result types

use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::error::BoxError;
use crate::transcript::ResetHandle;

/// A single command pattern
///
/// Phrases are compiled with the command token syntax (`*`, `(optional)`,
/// `:named`, `:named?`). Regexes are used exactly as given.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Phrase with optional wildcard tokens
    Phrase(String),
    /// Precompiled custom matcher
    Regex(Regex),
}

impl CommandPattern {
    /// Source text of the pattern
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Phrase(phrase) => phrase,
            Self::Regex(regex) => regex.as_str(),
        }
    }

    /// Check if this is a custom regex matcher
    #[must_use]
    pub const fn is_regex(&self) -> bool {
        matches!(self, Self::Regex(_))
    }
}

impl fmt::Display for CommandPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for CommandPattern {
    fn eq(&self, other: &Self) -> bool {
        self.is_regex() == other.is_regex() && self.as_str() == other.as_str()
    }
}

impl From<&str> for CommandPattern {
    fn from(phrase: &str) -> Self {
        Self::Phrase(phrase.to_string())
    }
}

impl From<String> for CommandPattern {
    fn from(phrase: String) -> Self {
        Self::Phrase(phrase)
    }
}

impl From<Regex> for CommandPattern {
    fn from(regex: Regex) -> Self {
        Self::Regex(regex)
    }
}

/// One pattern or an ordered list of alternative subcommands
#[derive(Debug, Clone)]
pub enum CommandSpec {
    /// A single pattern
    One(CommandPattern),
    /// Alternatives tried in order
    Many(Vec<CommandPattern>),
}

impl CommandSpec {
    /// Normalize into the ordered subcommand list
    #[must_use]
    pub fn into_subcommands(self) -> Vec<CommandPattern> {
        match self {
            Self::One(pattern) => vec![pattern],
            Self::Many(patterns) => patterns,
        }
    }
}

impl From<CommandPattern> for CommandSpec {
    fn from(pattern: CommandPattern) -> Self {
        Self::One(pattern)
    }
}

impl From<&str> for CommandSpec {
    fn from(phrase: &str) -> Self {
        Self::One(phrase.into())
    }
}

impl From<String> for CommandSpec {
    fn from(phrase: String) -> Self {
        Self::One(phrase.into())
    }
}

impl From<Regex> for CommandSpec {
    fn from(regex: Regex) -> Self {
        Self::One(regex.into())
    }
}

impl<T: Into<CommandPattern>> From<Vec<T>> for CommandSpec {
    fn from(patterns: Vec<T>) -> Self {
        Self::Many(patterns.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<CommandPattern>, const N: usize> From<[T; N]> for CommandSpec {
    fn from(patterns: [T; N]) -> Self {
        Self::Many(patterns.into_iter().map(Into::into).collect())
    }
}

/// Result of a successful subcommand test
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandMatch {
    /// Pattern matched the whole input
    Exact {
        /// Captured parameters in textual order
        parameters: Vec<String>,
    },
    /// Similarity reached the command's threshold
    Fuzzy {
        /// Command text with special characters removed
        command_without_specials: String,
        /// Input the command was compared against
        input: String,
        /// Similarity score (0.0 - 1.0)
        similarity: f64,
    },
}

impl CommandMatch {
    /// Captured parameters (empty for fuzzy matches)
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        match self {
            Self::Exact { parameters } => parameters,
            Self::Fuzzy { .. } => &[],
        }
    }

    /// Similarity score, if this is a fuzzy match
    #[must_use]
    pub const fn similarity(&self) -> Option<f64> {
        match self {
            Self::Exact { .. } => None,
            Self::Fuzzy { similarity, .. } => Some(*similarity),
        }
    }

    /// Check if this is a fuzzy match
    #[must_use]
    pub const fn is_fuzzy(&self) -> bool {
        matches!(self, Self::Fuzzy { .. })
    }
}

/// Context shared with every callback invocation
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    /// Subcommand that produced the match
    pub command: &'a CommandPattern,
    /// Reset capability for the owning transcript
    pub reset: &'a ResetHandle,
}

impl MatchContext<'_> {
    /// Clear the transcript and reset the engine's pending text
    pub fn reset_transcript(&self) {
        self.reset.reset_transcript();
    }
}

/// Value returned by command callbacks
pub type CallbackResult = std::result::Result<(), BoxError>;

/// Callback invoked once per kept match
pub type CommandCallback =
    Box<dyn FnMut(&CommandMatch, &MatchContext<'_>) -> CallbackResult + Send>;
