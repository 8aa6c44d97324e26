//! TOML command file loading
//!
//! Supports `~/.config/speech-commands/commands.toml` as the default
//! command file. All fields are optional; the file is a partial overlay on
//! top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML command file schema
#[derive(Debug, Default, Deserialize)]
pub struct CommandsConfigFile {
    /// Listening session options
    #[serde(default)]
    pub listen: ListenFileConfig,

    /// Subscription options
    #[serde(default)]
    pub subscription: SubscriptionFileConfig,

    /// Voice commands in registration order
    #[serde(default)]
    pub commands: Vec<CommandFileConfig>,
}

/// Listening session configuration
#[derive(Debug, Default, Deserialize)]
pub struct ListenFileConfig {
    /// Keep listening across phrases
    pub continuous: Option<bool>,

    /// Recognition language (e.g. "en-US")
    pub language: Option<String>,
}

/// Subscription configuration
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionFileConfig {
    /// Record transcript updates
    pub transcribing: Option<bool>,

    /// Clear the transcript when listening starts
    pub clear_transcript_on_listen: Option<bool>,
}

/// A single pattern or a list of alternatives
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Flatten into a list
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}

/// Voice command entry
#[derive(Debug, Clone, Deserialize)]
pub struct CommandFileConfig {
    /// Pattern or list of alternative patterns
    pub command: OneOrMany,

    /// Action name reported when the command fires
    #[serde(default)]
    pub action: Option<String>,

    /// Treat patterns as raw regular expressions
    #[serde(default)]
    pub regex: bool,

    /// Match interim text when no final text is available
    #[serde(default)]
    pub match_interim: bool,

    /// Use fuzzy similarity matching
    #[serde(default)]
    pub fuzzy: bool,

    /// Minimum fuzzy similarity (0.0 - 1.0)
    #[serde(default)]
    pub fuzzy_threshold: Option<f64>,

    /// Keep only the best fuzzy match
    #[serde(default)]
    pub best_match_only: bool,
}

/// Load the command file from the standard path
///
/// Returns `CommandsConfigFile::default()` if the file doesn't exist or can't be parsed.
#[must_use]
pub fn load_config_file() -> CommandsConfigFile {
    let Some(path) = config_file_path() else {
        return CommandsConfigFile::default();
    };

    if !path.exists() {
        return CommandsConfigFile::default();
    }

    match read_config_file(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load command file, using defaults"
            );
            CommandsConfigFile::default()
        }
    }
}

/// Read and parse a command file
///
/// # Errors
///
/// Returns error if the file can't be read or parsed
pub fn read_config_file(path: &Path) -> Result<CommandsConfigFile> {
    let content = std::fs::read_to_string(path)?;
    let config: CommandsConfigFile = toml::from_str(&content)?;
    tracing::info!(
        path = %path.display(),
        commands = config.commands.len(),
        "loaded command file"
    );
    Ok(config)
}

/// Return the command file path: `~/.config/speech-commands/commands.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.config_dir()
            .join("speech-commands")
            .join("commands.toml")
    })
}
