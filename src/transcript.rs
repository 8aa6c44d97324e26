//! Transcript state
//!
//! Holds the latest interim fragment and the history of finalized
//! fragments. Updates are published through a `watch` channel so any
//! number of observers can follow the transcript.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::sync::watch;

/// Transcript snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    /// Latest unconfirmed fragment
    pub interim: String,
    /// Confirmed fragments in arrival order
    #[serde(rename = "final")]
    pub finalized: Vec<String>,
}

impl Transcript {
    /// Finalized fragments joined with spaces
    #[must_use]
    pub fn final_text(&self) -> String {
        self.finalized.join(" ")
    }

    /// Finalized text followed by the interim fragment
    #[must_use]
    pub fn full_text(&self) -> String {
        let mut text = self.final_text();
        if !self.interim.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&self.interim);
        }
        text
    }

    /// Check if nothing has been transcribed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interim.is_empty() && self.finalized.is_empty()
    }
}

/// Observable transcript store
#[derive(Clone)]
pub struct TranscriptStore {
    tx: Arc<watch::Sender<Transcript>>,
}

impl TranscriptStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Transcript::default());
        Self { tx: Arc::new(tx) }
    }

    /// Replace the interim fragment and append a non-empty final fragment
    pub fn apply_update(&self, interim: &str, finalized: &str) {
        self.tx.send_modify(|transcript| {
            interim.clone_into(&mut transcript.interim);
            if !finalized.is_empty() {
                transcript.finalized.push(finalized.to_string());
            }
        });
    }

    /// Clear both interim and final text
    pub fn clear(&self) {
        self.tx.send_replace(Transcript::default());
    }

    /// Current transcript
    #[must_use]
    pub fn snapshot(&self) -> Transcript {
        self.tx.borrow().clone()
    }

    /// Follow transcript changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Transcript> {
        self.tx.subscribe()
    }
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TranscriptStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptStore")
            .field("transcript", &*self.tx.borrow())
            .finish()
    }
}

/// Reset capability handed to command callbacks
///
/// Resetting clears the transcript immediately and leaves a request for
/// the recognition manager to discard the engine's pending text.
#[derive(Debug, Clone)]
pub struct ResetHandle {
    store: TranscriptStore,
    requested: Arc<AtomicBool>,
}

impl ResetHandle {
    /// Create a reset handle for a transcript store
    #[must_use]
    pub fn new(store: TranscriptStore) -> Self {
        Self {
            store,
            requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Clear the transcript and request an engine reset
    pub fn reset_transcript(&self) {
        tracing::debug!("transcript reset requested");
        self.store.clear();
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Take a pending engine reset request
    #[must_use]
    pub fn take_request(&self) -> bool {
        self.requested.swap(false, Ordering::SeqCst)
    }

    /// Transcript this handle resets
    #[must_use]
    pub const fn store(&self) -> &TranscriptStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_update() {
        let store = TranscriptStore::new();

        store.apply_update("hello", "");
        assert_eq!(store.snapshot().interim, "hello");
        assert!(store.snapshot().finalized.is_empty());

        store.apply_update("", "hello world");
        store.apply_update("how", "");
        let transcript = store.snapshot();
        assert_eq!(transcript.finalized, vec!["hello world"]);
        assert_eq!(transcript.full_text(), "hello world how");
    }

    #[test]
    fn test_clear() {
        let store = TranscriptStore::new();
        store.apply_update("a", "b");

        store.clear();
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_observers_see_updates() {
        let store = TranscriptStore::new();
        let mut rx = store.subscribe();

        store.apply_update("", "lights on");
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().final_text(), "lights on");
    }

    #[test]
    fn test_reset_handle() {
        let store = TranscriptStore::new();
        let reset = ResetHandle::new(store.clone());
        store.apply_update("x", "y");

        assert!(!reset.take_request());
        reset.reset_transcript();
        assert!(store.snapshot().is_empty());
        assert!(reset.take_request());
        assert!(!reset.take_request());
    }
}
