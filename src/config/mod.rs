//! Configuration management for speech commands

pub mod file;

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::commands::{
    CallbackResult, Command, CommandMatch, CommandPattern, DEFAULT_FUZZY_THRESHOLD, MatchContext,
};
use crate::recognition::{DEFAULT_LANGUAGE, ListenOptions, SubscriptionOptions};
use crate::{Error, Result};

use file::{CommandFileConfig, CommandsConfigFile};

/// Speech command configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// File the configuration was read from, if any
    pub source: Option<PathBuf>,

    /// Listening session options
    pub listen: ListenOptions,

    /// Subscription options
    pub subscription: SubscriptionOptions,

    /// Voice commands in registration order
    pub commands: Vec<CommandConfig>,
}

/// Resolved voice command entry
#[derive(Debug, Clone, PartialEq)]
pub struct CommandConfig {
    /// Action name reported when the command fires
    pub action: String,

    /// Pattern sources in match order
    pub patterns: Vec<String>,

    /// Patterns are raw regular expressions
    pub regex: bool,

    /// Match interim text when no final text is available
    pub match_interim: bool,

    /// Use fuzzy similarity matching
    pub fuzzy: bool,

    /// Minimum fuzzy similarity
    pub fuzzy_threshold: f64,

    /// Keep only the best fuzzy match
    pub best_match_only: bool,
}

impl CommandConfig {
    /// Build command patterns
    ///
    /// # Errors
    ///
    /// Returns error if a regex pattern is invalid
    pub fn patterns(&self) -> Result<Vec<CommandPattern>> {
        self.patterns
            .iter()
            .map(|source| {
                if self.regex {
                    Regex::new(source)
                        .map(CommandPattern::Regex)
                        .map_err(|e| Error::pattern(source, e.to_string()))
                } else {
                    Ok(CommandPattern::Phrase(source.clone()))
                }
            })
            .collect()
    }

    /// Build a command registration with a callback
    ///
    /// # Errors
    ///
    /// Returns error if a regex pattern is invalid
    pub fn to_command<F>(&self, callback: F) -> Result<Command>
    where
        F: FnMut(&CommandMatch, &MatchContext<'_>) -> CallbackResult + Send + 'static,
    {
        Ok(Command::new(self.patterns()?, callback)
            .with_match_interim(self.match_interim)
            .with_fuzzy(self.fuzzy)
            .with_fuzzy_threshold(self.fuzzy_threshold)
            .with_best_match_only(self.best_match_only))
    }

    fn from_file(entry: CommandFileConfig, default_threshold: f64) -> Result<Self> {
        let patterns = entry.command.into_vec();
        let Some(first) = patterns.first() else {
            return Err(Error::Config("command entry has no patterns".to_string()));
        };

        Ok(Self {
            action: entry.action.unwrap_or_else(|| first.clone()),
            regex: entry.regex,
            match_interim: entry.match_interim,
            fuzzy: entry.fuzzy,
            fuzzy_threshold: entry.fuzzy_threshold.unwrap_or(default_threshold),
            best_match_only: entry.best_match_only,
            patterns,
        })
    }
}

impl Config {
    /// Load configuration (env > toml > default)
    ///
    /// An explicit path (argument or `SPEECH_COMMANDS_FILE`) must exist and
    /// parse. Without one, the default command file is used if present.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit file can't be loaded or an entry is invalid
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("SPEECH_COMMANDS_FILE").ok().map(PathBuf::from));

        let (fc, source) = match explicit {
            Some(path) => (file::read_config_file(&path)?, Some(path)),
            None => (
                file::load_config_file(),
                file::config_file_path().filter(|p| p.exists()),
            ),
        };

        Self::from_file(fc, source)
    }

    /// Resolve a parsed command file
    ///
    /// # Errors
    ///
    /// Returns error if an entry has no patterns or an env override is invalid
    pub fn from_file(fc: CommandsConfigFile, source: Option<PathBuf>) -> Result<Self> {
        // Listen options (env > toml > default)
        let listen = ListenOptions {
            continuous: std::env::var("SPEECH_COMMANDS_CONTINUOUS")
                .ok()
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .or(fc.listen.continuous)
                .unwrap_or(false),
            language: std::env::var("SPEECH_COMMANDS_LANGUAGE")
                .ok()
                .or(fc.listen.language)
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        };

        let subscription = SubscriptionOptions {
            transcribing: fc.subscription.transcribing.unwrap_or(true),
            clear_transcript_on_listen: fc.subscription.clear_transcript_on_listen.unwrap_or(true),
        };

        let default_threshold = match std::env::var("SPEECH_COMMANDS_FUZZY_THRESHOLD") {
            Ok(v) => v.parse::<f64>().map_err(|e| {
                Error::Config(format!("invalid SPEECH_COMMANDS_FUZZY_THRESHOLD '{v}': {e}"))
            })?,
            Err(_) => DEFAULT_FUZZY_THRESHOLD,
        };

        let commands = fc
            .commands
            .into_iter()
            .map(|entry| CommandConfig::from_file(entry, default_threshold))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            source,
            listen,
            subscription,
            commands,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        Config::from_file(toml::from_str(toml).unwrap(), None).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse("");

        assert!(config.commands.is_empty());
        assert!(config.subscription.transcribing);
        assert!(config.subscription.clear_transcript_on_listen);
    }

    #[test]
    fn test_action_defaults_to_first_pattern() {
        let config = parse(
            r#"
            [[commands]]
            command = ["hello", "hi"]
            fuzzy = true
            "#,
        );

        let command = &config.commands[0];
        assert_eq!(command.action, "hello");
        assert_eq!(command.patterns, vec!["hello", "hi"]);
        assert!(command.fuzzy);
    }

    #[test]
    fn test_empty_pattern_list_rejected() {
        let fc: CommandsConfigFile = toml::from_str("[[commands]]\ncommand = []\n").unwrap();
        assert!(matches!(Config::from_file(fc, None), Err(Error::Config(_))));
    }

    #[test]
    fn test_regex_patterns() {
        let config = parse(
            r#"
            [[commands]]
            command = '^call (\d+)$'
            regex = true
            "#,
        );

        let patterns = config.commands[0].patterns().unwrap();
        assert!(patterns[0].is_regex());
    }

    #[test]
    fn test_invalid_regex_pattern() {
        let config = parse(
            r#"
            [[commands]]
            command = "call (unclosed"
            regex = true
            "#,
        );

        let err = config.commands[0].to_command(|_, _| Ok(())).unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("commands.toml");
        std::fs::write(&path, "[[commands]]\ncommand = \"stop\"\naction = \"halt\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
        assert_eq!(config.commands[0].action, "halt");
    }
}
