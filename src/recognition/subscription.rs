//! Per-consumer transcript and command state

use serde::Deserialize;

use crate::commands::{Command, CommandMatcher};
use crate::transcript::{ResetHandle, Transcript, TranscriptStore};
use crate::Result;

/// Subscription options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SubscriptionOptions {
    /// Record updates into the transcript
    #[serde(default = "default_true")]
    pub transcribing: bool,
    /// Clear the transcript whenever listening starts
    #[serde(default = "default_true")]
    pub clear_transcript_on_listen: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SubscriptionOptions {
    fn default() -> Self {
        Self {
            transcribing: true,
            clear_transcript_on_listen: true,
        }
    }
}

/// Receives recognition events from a manager
pub trait RecognitionSubscriber: Send {
    /// Interim text changed or a phrase was finalized
    ///
    /// # Errors
    ///
    /// Returns error if a command callback fails
    fn on_transcript_change(&mut self, interim: &str, finalized: &str) -> Result<()>;

    /// Listening started or stopped
    fn on_listening_change(&mut self, _listening: bool) {}

    /// Microphone became available or was denied
    fn on_microphone_availability_change(&mut self, _available: bool) {}

    /// A new listening session is starting
    fn on_clear_transcript(&mut self) {}

    /// Take a pending request to reset the engine's transcript
    fn take_reset_request(&mut self) -> bool {
        false
    }
}

/// A consumer's transcript and registered commands
///
/// Transcript updates are recorded (when transcribing) before commands are
/// matched, so callbacks observe the transcript including the update that
/// triggered them.
#[derive(Debug)]
pub struct Subscription {
    options: SubscriptionOptions,
    transcript: TranscriptStore,
    matcher: CommandMatcher,
    listening: bool,
    microphone_available: bool,
}

impl Subscription {
    /// Create a subscription with its commands
    ///
    /// # Errors
    ///
    /// Returns error if any command fails to register
    pub fn new(commands: Vec<Command>, options: SubscriptionOptions) -> Result<Self> {
        let transcript = TranscriptStore::new();
        let matcher = CommandMatcher::new(commands, ResetHandle::new(transcript.clone()))?;
        Ok(Self {
            options,
            transcript,
            matcher,
            listening: false,
            microphone_available: true,
        })
    }

    /// Replace the registered commands
    ///
    /// # Errors
    ///
    /// Returns error if any command fails to register
    pub fn set_commands(&mut self, commands: Vec<Command>) -> Result<()> {
        self.matcher.replace_commands(commands)
    }

    /// Turn transcript recording on or off
    pub const fn set_transcribing(&mut self, transcribing: bool) {
        self.options.transcribing = transcribing;
    }

    /// Choose whether starting to listen clears the transcript
    pub const fn set_clear_transcript_on_listen(&mut self, clear: bool) {
        self.options.clear_transcript_on_listen = clear;
    }

    /// Current options
    #[must_use]
    pub const fn options(&self) -> SubscriptionOptions {
        self.options
    }

    /// Shared transcript store
    #[must_use]
    pub fn transcript_store(&self) -> TranscriptStore {
        self.transcript.clone()
    }

    /// Current transcript
    #[must_use]
    pub fn transcript(&self) -> Transcript {
        self.transcript.snapshot()
    }

    /// Reset capability shared with command callbacks
    #[must_use]
    pub fn reset_handle(&self) -> ResetHandle {
        self.matcher.reset_handle().clone()
    }

    /// Clear the transcript and request an engine reset
    pub fn reset_transcript(&self) {
        self.matcher.reset_handle().reset_transcript();
    }

    /// Clear the transcript without touching the engine
    pub fn clear_transcript(&self) {
        self.transcript.clear();
    }

    /// Last known listening state
    #[must_use]
    pub const fn is_listening(&self) -> bool {
        self.listening
    }

    /// Last known microphone availability
    #[must_use]
    pub const fn is_microphone_available(&self) -> bool {
        self.microphone_available
    }

    /// Registered commands
    #[must_use]
    pub const fn matcher(&self) -> &CommandMatcher {
        &self.matcher
    }
}

impl RecognitionSubscriber for Subscription {
    fn on_transcript_change(&mut self, interim: &str, finalized: &str) -> Result<()> {
        if self.options.transcribing {
            self.transcript.apply_update(interim, finalized);
        }
        self.matcher.match_commands(interim, finalized)
    }

    fn on_listening_change(&mut self, listening: bool) {
        self.listening = listening;
    }

    fn on_microphone_availability_change(&mut self, available: bool) {
        self.microphone_available = available;
    }

    fn on_clear_transcript(&mut self) {
        if self.options.clear_transcript_on_listen {
            tracing::debug!("clearing transcript for new session");
            self.transcript.clear();
        }
    }

    fn take_reset_request(&mut self) -> bool {
        self.matcher.reset_handle().take_request()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcribing_records_updates() {
        let mut sub = Subscription::new(vec![], SubscriptionOptions::default()).unwrap();

        sub.on_transcript_change("hel", "").unwrap();
        sub.on_transcript_change("", "hello").unwrap();

        let transcript = sub.transcript();
        assert_eq!(transcript.interim, "");
        assert_eq!(transcript.finalized, vec!["hello"]);
    }

    #[test]
    fn test_not_transcribing_still_matches() {
        let mut sub = Subscription::new(
            vec![Command::new("hello", |_, _| Err("boom".into()))],
            SubscriptionOptions::default(),
        )
        .unwrap();
        sub.set_transcribing(false);

        let err = sub.on_transcript_change("", "hello").unwrap_err();
        assert!(matches!(err, crate::Error::Callback { .. }));
        assert!(sub.transcript().is_empty());
    }

    #[test]
    fn test_clear_on_listen_option() {
        let mut sub = Subscription::new(vec![], SubscriptionOptions::default()).unwrap();
        sub.on_transcript_change("", "one").unwrap();

        sub.set_clear_transcript_on_listen(false);
        sub.on_clear_transcript();
        assert_eq!(sub.transcript().final_text(), "one");

        sub.set_clear_transcript_on_listen(true);
        sub.on_clear_transcript();
        assert!(sub.transcript().is_empty());
    }

    #[test]
    fn test_reset_request_is_taken_once() {
        let mut sub = Subscription::new(vec![], SubscriptionOptions::default()).unwrap();
        sub.on_transcript_change("", "one").unwrap();

        sub.reset_transcript();
        assert!(sub.transcript().is_empty());
        assert!(sub.take_reset_request());
        assert!(!sub.take_reset_request());
    }
}
