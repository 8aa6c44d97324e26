//! Speech Commands - voice command matching over live transcripts
//!
//! This library sits between a speech recognition engine and application
//! callbacks:
//! - Command patterns with `*`, `(optional)` and `:named` tokens
//! - Fuzzy matching with Sørensen-Dice similarity and best-match reduction
//! - Transcript state shared with observers
//! - A recognition manager that feeds engine events to subscriptions
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │               Recognition Engine                     │
//! │     interim text  │  final text  │  listening        │
//! └────────────────────┬────────────────────────────────┘
//!                      │ RecognitionEvent
//! ┌────────────────────▼────────────────────────────────┐
//! │              Recognition Manager                     │
//! │   Subscriptions  │  Listening state  │  Resets      │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                Command Matcher                       │
//! │   Pattern compiler  │  Fuzzy scoring  │  Callbacks  │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod recognition;
pub mod transcript;

pub use commands::{
    CallbackResult, Command, CommandMatch, CommandMatcher, CommandPattern, CommandSpec,
    CompiledPattern, MatchContext,
};
pub use config::{CommandConfig, Config};
pub use error::{Error, Result};
pub use recognition::{
    ListenOptions, RecognitionEngine, RecognitionEvent, RecognitionManager, ReplayEngine,
    Subscription, SubscriptionOptions, TranscriptUpdate,
};
pub use transcript::{ResetHandle, Transcript, TranscriptStore};
