//! Transcript command matcher

use std::fmt;

use super::fuzzy;
use super::pattern::CompiledPattern;
use super::types::{CommandMatch, CommandPattern, MatchContext};
use super::Command;
use crate::transcript::ResetHandle;
use crate::{Error, Result};

/// How a subcommand is tested
enum SubcommandTest {
    Exact(CompiledPattern),
    Fuzzy { cleaned: String },
}

impl SubcommandTest {
    fn prepare(pattern: &CommandPattern, is_fuzzy: bool) -> Result<Self> {
        if is_fuzzy {
            Ok(Self::Fuzzy {
                cleaned: fuzzy::strip_specials(pattern.as_str()),
            })
        } else {
            CompiledPattern::compile(pattern).map(Self::Exact)
        }
    }

    fn run(&self, input: &str, threshold: f64) -> Option<CommandMatch> {
        match self {
            Self::Exact(compiled) => compiled
                .captures(input)
                .map(|parameters| CommandMatch::Exact { parameters }),
            Self::Fuzzy { cleaned } => {
                fuzzy::score(cleaned, input, threshold).map(|similarity| CommandMatch::Fuzzy {
                    command_without_specials: cleaned.clone(),
                    input: input.to_string(),
                    similarity,
                })
            }
        }
    }
}

/// Registered command with its prepared subcommand tests
struct Registration {
    command: Command,
    tests: Vec<SubcommandTest>,
}

impl Registration {
    fn prepare(command: Command) -> Result<Self> {
        let threshold = command.fuzzy_threshold;
        if command.fuzzy && !(0.0..=1.0).contains(&threshold) {
            return Err(Error::Config(format!(
                "fuzzy threshold must be between 0 and 1, got {threshold}"
            )));
        }

        let tests = command
            .patterns
            .iter()
            .map(|pattern| SubcommandTest::prepare(pattern, command.fuzzy))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { command, tests })
    }

    /// Pick the input this command matches against
    fn select_input<'a>(&self, interim: &'a str, finalized: &'a str) -> &'a str {
        if finalized.is_empty() && self.command.match_interim {
            interim.trim()
        } else {
            finalized.trim()
        }
    }

    /// Test every subcommand and apply best-match reduction
    ///
    /// Returns `(subcommand index, match)` pairs in subcommand order.
    fn matches(&self, input: &str) -> Vec<(usize, CommandMatch)> {
        let threshold = self.command.fuzzy_threshold;
        let mut results: Vec<(usize, CommandMatch)> = self
            .tests
            .iter()
            .enumerate()
            .filter_map(|(i, test)| test.run(input, threshold).map(|m| (i, m)))
            .collect();

        if self.command.fuzzy && self.command.best_match_only && results.len() >= 2 {
            // Earliest subcommand wins ties
            let mut best = 0;
            for (i, (_, result)) in results.iter().enumerate().skip(1) {
                if result.similarity() > results[best].1.similarity() {
                    best = i;
                }
            }
            results = vec![results.swap_remove(best)];
        }

        results
    }
}

/// Matches transcript updates against registered commands
///
/// Commands are tested in registration order on every update. Each kept
/// match invokes the command's callback synchronously.
pub struct CommandMatcher {
    registrations: Vec<Registration>,
    reset: ResetHandle,
}

impl CommandMatcher {
    /// Register commands
    ///
    /// Phrases are compiled up front so malformed patterns fail here
    /// rather than at match time.
    ///
    /// # Errors
    ///
    /// Returns error if a pattern is malformed or a fuzzy command's
    /// threshold is outside 0..=1
    pub fn new(commands: Vec<Command>, reset: ResetHandle) -> Result<Self> {
        let registrations = prepare_all(commands)?;
        tracing::info!(count = registrations.len(), "registered voice commands");
        Ok(Self {
            registrations,
            reset,
        })
    }

    /// Replace every registered command
    ///
    /// The existing commands stay in place if any new command fails to
    /// register.
    ///
    /// # Errors
    ///
    /// Returns error under the same conditions as [`CommandMatcher::new`]
    pub fn replace_commands(&mut self, commands: Vec<Command>) -> Result<()> {
        self.registrations = prepare_all(commands)?;
        tracing::info!(count = self.registrations.len(), "replaced voice commands");
        Ok(())
    }

    /// Run one matching pass for a transcript update
    ///
    /// `finalized` is empty unless a phrase was just confirmed.
    ///
    /// # Errors
    ///
    /// Returns the first callback failure; commands after it are not run
    pub fn match_commands(&mut self, interim: &str, finalized: &str) -> Result<()> {
        let Self {
            registrations,
            reset,
        } = self;
        let reset = &*reset;

        tracing::trace!(interim, finalized, "matching commands");

        for registration in registrations.iter_mut() {
            let input = registration.select_input(interim, finalized);
            let results = registration.matches(input);

            for (index, result) in results {
                let pattern = &registration.command.patterns[index];
                tracing::debug!(
                    command = %pattern,
                    input,
                    fuzzy = result.is_fuzzy(),
                    "voice command matched"
                );

                let context = MatchContext {
                    command: pattern,
                    reset,
                };
                (registration.command.callback)(&result, &context).map_err(|source| {
                    Error::Callback {
                        command: pattern.to_string(),
                        source,
                    }
                })?;
            }
        }

        Ok(())
    }

    /// Number of registered commands
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Check if no commands are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Subcommands of every registered command, in registration order
    pub fn patterns(&self) -> impl Iterator<Item = &[CommandPattern]> {
        self.registrations.iter().map(|r| r.command.patterns.as_slice())
    }

    /// Reset handle shared with callbacks
    #[must_use]
    pub const fn reset_handle(&self) -> &ResetHandle {
        &self.reset
    }
}

impl fmt::Debug for CommandMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandMatcher")
            .field("commands", &self.registrations.len())
            .finish_non_exhaustive()
    }
}

fn prepare_all(commands: Vec<Command>) -> Result<Vec<Registration>> {
    commands.into_iter().map(Registration::prepare).collect()
}
