//! Voice command registration and matching
//!
//! A command is one or more patterns plus a callback. On every transcript
//! update the [`CommandMatcher`] tests each command's subcommands, either
//! against the compiled pattern or by fuzzy similarity, and invokes the
//! callback for every match it keeps.

mod fuzzy;
mod matcher;
mod pattern;
mod types;

pub use fuzzy::{similarity, strip_specials};
pub use matcher::CommandMatcher;
pub use pattern::CompiledPattern;
pub use types::{
    CallbackResult, CommandCallback, CommandMatch, CommandPattern, CommandSpec, MatchContext,
};

use std::fmt;

/// Default minimum similarity for fuzzy commands
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

/// Command registration
pub struct Command {
    patterns: Vec<CommandPattern>,
    callback: CommandCallback,
    match_interim: bool,
    fuzzy: bool,
    fuzzy_threshold: f64,
    best_match_only: bool,
}

impl Command {
    /// Create a command with exact matching on final transcripts
    ///
    /// # Arguments
    ///
    /// * `spec` - A pattern or an ordered list of alternative subcommands;
    ///   an empty list registers a command that never fires
    /// * `callback` - Invoked once per kept match
    #[must_use]
    pub fn new<S, F>(spec: S, callback: F) -> Self
    where
        S: Into<CommandSpec>,
        F: FnMut(&CommandMatch, &MatchContext<'_>) -> CallbackResult + Send + 'static,
    {
        Self {
            patterns: spec.into().into_subcommands(),
            callback: Box::new(callback),
            match_interim: false,
            fuzzy: false,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            best_match_only: false,
        }
    }

    /// Match interim text when no final text arrived this cycle
    #[must_use]
    pub const fn with_match_interim(mut self, match_interim: bool) -> Self {
        self.match_interim = match_interim;
        self
    }

    /// Use fuzzy similarity instead of exact pattern matching
    #[must_use]
    pub const fn with_fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    /// Set the minimum fuzzy similarity (0.0 - 1.0)
    #[must_use]
    pub const fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    /// Keep only the highest scoring fuzzy match
    #[must_use]
    pub const fn with_best_match_only(mut self, best_match_only: bool) -> Self {
        self.best_match_only = best_match_only;
        self
    }

    /// Subcommands in match order
    #[must_use]
    pub fn patterns(&self) -> &[CommandPattern] {
        &self.patterns
    }

    /// Check if interim text is matched
    #[must_use]
    pub const fn matches_interim(&self) -> bool {
        self.match_interim
    }

    /// Check if fuzzy matching is used
    #[must_use]
    pub const fn is_fuzzy(&self) -> bool {
        self.fuzzy
    }

    /// Minimum fuzzy similarity
    #[must_use]
    pub const fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    /// Check if only the best fuzzy match is kept
    #[must_use]
    pub const fn is_best_match_only(&self) -> bool {
        self.best_match_only
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("patterns", &self.patterns)
            .field("match_interim", &self.match_interim)
            .field("fuzzy", &self.fuzzy)
            .field("fuzzy_threshold", &self.fuzzy_threshold)
            .field("best_match_only", &self.best_match_only)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::transcript::{ResetHandle, TranscriptStore};

    type Calls = Arc<Mutex<Vec<(String, CommandMatch)>>>;

    fn recording(spec: impl Into<CommandSpec>, calls: &Calls) -> Command {
        let calls = Arc::clone(calls);
        Command::new(spec, move |m, ctx| {
            calls.lock().unwrap().push((ctx.command.to_string(), m.clone()));
            Ok(())
        })
    }

    fn matcher(commands: Vec<Command>) -> CommandMatcher {
        CommandMatcher::new(commands, ResetHandle::new(TranscriptStore::new())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let command = Command::new("hello", |_, _| Ok(()));

        assert_eq!(command.patterns(), &[CommandPattern::from("hello")]);
        assert!(!command.matches_interim());
        assert!(!command.is_fuzzy());
        assert!(!command.is_best_match_only());
        assert!((command.fuzzy_threshold() - DEFAULT_FUZZY_THRESHOLD).abs() < f64::EPSILON);
    }

    #[test]
    fn test_interim_selection() {
        let calls = Calls::default();
        let mut m = matcher(vec![
            recording("stop", &calls).with_match_interim(true),
            recording("go", &calls),
        ]);

        m.match_commands(" stop ", "").unwrap();
        m.match_commands("go", "").unwrap();
        assert_eq!(calls.lock().unwrap().len(), 1);

        // Final text wins over interim even for interim commands
        m.match_commands("stop", "go").unwrap();
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].0, "go");
    }

    #[test]
    fn test_best_match_tie_keeps_first_subcommand() {
        let calls = Calls::default();
        let mut m = matcher(vec![
            recording(["turn on the light", "turn on, the light"], &calls)
                .with_fuzzy(true)
                .with_best_match_only(true),
        ]);

        m.match_commands("", "turn on the light").unwrap();
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "turn on the light");
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let command = Command::new("hi", |_, _| Ok(()))
            .with_fuzzy(true)
            .with_fuzzy_threshold(1.5);
        let err = CommandMatcher::new(vec![command], ResetHandle::new(TranscriptStore::new()))
            .unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_threshold_ignored_for_exact_commands() {
        let calls = Calls::default();
        let mut m = matcher(vec![recording("hi", &calls).with_fuzzy_threshold(1.5)]);

        m.match_commands("", "hi").unwrap();
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_command_list_never_fires() {
        let calls = Calls::default();
        let mut m = matcher(vec![
            recording(Vec::<String>::new(), &calls),
            recording("hello", &calls),
        ]);

        m.match_commands("", "hello").unwrap();
        m.match_commands("", "").unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_blank_final_does_not_fall_back_to_interim() {
        let calls = Calls::default();
        let mut m = matcher(vec![recording("pause", &calls).with_match_interim(true)]);

        m.match_commands("pause", "  ").unwrap();
        assert!(calls.lock().unwrap().is_empty());

        m.match_commands("pause", "").unwrap();
        assert_eq!(calls.lock().unwrap().len(), 1);
    }
}
