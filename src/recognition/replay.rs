//! Replay engine
//!
//! Plays back recorded transcript updates as if they came from a live
//! recognizer. Input is line based:
//!
//! ```text
//! # comment
//! {"interim": "turn on"}
//! {"interim": "", "final": "turn on the lights"}
//! set volume 7
//! ```
//!
//! JSON lines are parsed as [`TranscriptUpdate`]s; any other non-blank line
//! is a finalized phrase.

use std::io::BufRead;

use async_trait::async_trait;

use super::engine::{
    EventSender, ListenOptions, RecognitionEngine, RecognitionEvent, TranscriptUpdate,
};
use crate::{Error, Result};

/// Engine that replays a recorded transcript
#[derive(Debug, Default)]
pub struct ReplayEngine {
    updates: Vec<TranscriptUpdate>,
    sessions: usize,
    resets: usize,
}

impl ReplayEngine {
    /// Create an engine from updates
    #[must_use]
    pub const fn new(updates: Vec<TranscriptUpdate>) -> Self {
        Self {
            updates,
            sessions: 0,
            resets: 0,
        }
    }

    /// Parse updates from a line-based recording
    ///
    /// # Errors
    ///
    /// Returns error if reading fails or a JSON line is malformed
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut updates = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('{') {
                let update: TranscriptUpdate = serde_json::from_str(line).map_err(|e| {
                    Error::Engine(format!("invalid transcript on line {}: {e}", index + 1))
                })?;
                updates.push(update);
            } else {
                updates.push(TranscriptUpdate::finalized(line));
            }
        }

        tracing::debug!(count = updates.len(), "loaded transcript recording");
        Ok(Self::new(updates))
    }

    /// Recorded updates
    #[must_use]
    pub fn updates(&self) -> &[TranscriptUpdate] {
        &self.updates
    }

    /// Number of sessions started
    #[must_use]
    pub const fn sessions(&self) -> usize {
        self.sessions
    }

    /// Number of transcript resets requested
    #[must_use]
    pub const fn resets(&self) -> usize {
        self.resets
    }
}

#[async_trait]
impl RecognitionEngine for ReplayEngine {
    fn name(&self) -> &'static str {
        "replay"
    }

    async fn start(&mut self, options: &ListenOptions, events: EventSender) -> Result<()> {
        self.sessions += 1;
        tracing::debug!(
            language = %options.language,
            updates = self.updates.len(),
            "replaying transcript"
        );

        for update in &self.updates {
            events
                .send(RecognitionEvent::TranscriptChanged(update.clone()))
                .map_err(|_| Error::Engine("event receiver dropped".to_string()))?;
        }
        events
            .send(RecognitionEvent::Ended)
            .map_err(|_| Error::Engine("event receiver dropped".to_string()))?;
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    async fn abort(&mut self) -> Result<()> {
        Ok(())
    }

    async fn reset_transcript(&mut self) -> Result<()> {
        self.resets += 1;
        Ok(())
    }
}
