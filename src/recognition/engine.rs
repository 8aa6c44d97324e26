//! Recognition engine interface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::Result;

/// Default recognition language
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Options for a listening session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenOptions {
    /// Keep listening after a phrase is finalized
    #[serde(default)]
    pub continuous: bool,
    /// BCP 47 language tag
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for ListenOptions {
    fn default() -> Self {
        Self {
            continuous: false,
            language: default_language(),
        }
    }
}

/// A transcript update from the engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptUpdate {
    /// Latest unconfirmed text
    #[serde(default)]
    pub interim: String,
    /// Newly confirmed text, empty unless a phrase just finalized
    #[serde(default, rename = "final")]
    pub finalized: String,
}

impl TranscriptUpdate {
    /// Interim-only update
    #[must_use]
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            interim: text.into(),
            finalized: String::new(),
        }
    }

    /// Update confirming a phrase
    #[must_use]
    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            interim: String::new(),
            finalized: text.into(),
        }
    }
}

/// Events emitted by a recognition engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// New interim text or a finalized phrase
    TranscriptChanged(TranscriptUpdate),
    /// Engine started or stopped capturing
    ListeningChanged(bool),
    /// Microphone became available or was denied
    MicrophoneAvailabilityChanged(bool),
    /// Session finished; no more events until the next start
    Ended,
}

/// Sender half handed to engines on start
pub type EventSender = mpsc::UnboundedSender<RecognitionEvent>;

/// Speech recognition engine
///
/// Implementations own audio capture and decoding. They report progress by
/// sending [`RecognitionEvent`]s in order on the sender given to `start`.
#[async_trait]
pub trait RecognitionEngine: Send {
    /// Engine name for logging
    fn name(&self) -> &'static str;

    /// Whether the engine can keep listening across phrases
    fn supports_continuous(&self) -> bool {
        true
    }

    /// Start a listening session
    async fn start(&mut self, options: &ListenOptions, events: EventSender) -> Result<()>;

    /// Stop listening, finalizing pending text
    async fn stop(&mut self) -> Result<()>;

    /// Stop listening, discarding pending text
    async fn abort(&mut self) -> Result<()>;

    /// Discard pending text without ending the session
    ///
    /// Default implementation is a no-op for engines without buffered text
    async fn reset_transcript(&mut self) -> Result<()> {
        Ok(())
    }
}
