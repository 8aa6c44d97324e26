//! Recognition manager
//!
//! Owns the engine, fans its events out to subscriptions, and publishes
//! listening state. Events are handled strictly in arrival order: each
//! dispatch (including every command callback it triggers) completes
//! before the next event is received.

use std::collections::BTreeMap;
use std::fmt;

use tokio::sync::{mpsc, watch};

use super::engine::{ListenOptions, RecognitionEngine, RecognitionEvent};
use super::subscription::RecognitionSubscriber;
use crate::{Error, Result};

/// Identifier returned by [`RecognitionManager::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Drives a recognition engine and its subscribers
pub struct RecognitionManager {
    engine: Box<dyn RecognitionEngine>,
    subscribers: BTreeMap<SubscriptionId, Box<dyn RecognitionSubscriber>>,
    next_id: u64,
    listening: watch::Sender<bool>,
    microphone_available: bool,
    options: Option<ListenOptions>,
    events_tx: mpsc::UnboundedSender<RecognitionEvent>,
    events_rx: mpsc::UnboundedReceiver<RecognitionEvent>,
}

impl RecognitionManager {
    /// Create a manager for an engine
    #[must_use]
    pub fn new(engine: Box<dyn RecognitionEngine>) -> Self {
        let (listening, _) = watch::channel(false);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            engine,
            subscribers: BTreeMap::new(),
            next_id: 0,
            listening,
            microphone_available: true,
            options: None,
            events_tx,
            events_rx,
        }
    }

    /// Register a subscriber
    ///
    /// Subscribers receive events in subscription order.
    pub fn subscribe(&mut self, subscriber: Box<dyn RecognitionSubscriber>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.insert(id, subscriber);
        tracing::debug!(id = id.0, "subscriber added");
        id
    }

    /// Remove a subscriber
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Option<Box<dyn RecognitionSubscriber>> {
        let removed = self.subscribers.remove(&id);
        if removed.is_some() {
            tracing::debug!(id = id.0, "subscriber removed");
        }
        removed
    }

    /// Number of subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Start listening
    ///
    /// Does nothing if already listening with the same options. A session
    /// with different options is stopped and restarted.
    ///
    /// # Errors
    ///
    /// Returns error if the engine fails to start or stop
    pub async fn start_listening(&mut self, mut options: ListenOptions) -> Result<()> {
        if options.continuous && !self.engine.supports_continuous() {
            tracing::warn!(
                engine = self.engine.name(),
                "engine does not support continuous listening, falling back to single phrase"
            );
            options.continuous = false;
        }

        if self.is_listening() {
            if self.options.as_ref() == Some(&options) {
                return Ok(());
            }
            tracing::info!(?options, "listen options changed, restarting");
            self.engine.stop().await?;
            self.set_listening(false);
        }

        for subscriber in self.subscribers.values_mut() {
            subscriber.on_clear_transcript();
        }

        match self.engine.start(&options, self.events_tx.clone()).await {
            Ok(()) => {}
            Err(Error::MicrophoneUnavailable) => {
                self.set_microphone_available(false);
                return Err(Error::MicrophoneUnavailable);
            }
            Err(e) => return Err(e),
        }

        tracing::info!(
            engine = self.engine.name(),
            continuous = options.continuous,
            language = %options.language,
            "listening started"
        );
        self.options = Some(options);
        self.set_listening(true);
        Ok(())
    }

    /// Stop listening, finalizing pending text
    ///
    /// # Errors
    ///
    /// Returns error if the engine fails to stop
    pub async fn stop_listening(&mut self) -> Result<()> {
        self.engine.stop().await?;
        tracing::info!("listening stopped");
        self.set_listening(false);
        Ok(())
    }

    /// Stop listening, discarding pending text
    ///
    /// # Errors
    ///
    /// Returns error if the engine fails to abort
    pub async fn abort_listening(&mut self) -> Result<()> {
        self.engine.abort().await?;
        tracing::info!("listening aborted");
        self.set_listening(false);
        Ok(())
    }

    /// Discard the engine's pending transcript
    ///
    /// # Errors
    ///
    /// Returns error if the engine fails to reset
    pub async fn reset_transcript(&mut self) -> Result<()> {
        tracing::debug!(engine = self.engine.name(), "resetting engine transcript");
        self.engine.reset_transcript().await
    }

    /// Handle one engine event
    ///
    /// # Errors
    ///
    /// Returns the first subscriber failure, or an engine reset failure
    pub async fn dispatch(&mut self, event: RecognitionEvent) -> Result<()> {
        let outcome = match event {
            RecognitionEvent::TranscriptChanged(update) => self
                .subscribers
                .values_mut()
                .try_for_each(|s| s.on_transcript_change(&update.interim, &update.finalized)),
            RecognitionEvent::ListeningChanged(listening) => {
                self.set_listening(listening);
                Ok(())
            }
            RecognitionEvent::MicrophoneAvailabilityChanged(available) => {
                self.set_microphone_available(available);
                Ok(())
            }
            RecognitionEvent::Ended => {
                self.set_listening(false);
                Ok(())
            }
        };

        // Resets requested before a failing callback still reach the engine
        let mut reset_requested = false;
        for subscriber in self.subscribers.values_mut() {
            reset_requested |= subscriber.take_reset_request();
        }
        if reset_requested {
            self.reset_transcript().await?;
        }

        outcome
    }

    /// Dispatch events until the engine ends the session
    ///
    /// # Errors
    ///
    /// Returns the first dispatch failure
    pub async fn run(&mut self) -> Result<()> {
        while let Some(event) = self.events_rx.recv().await {
            let ended = event == RecognitionEvent::Ended;
            self.dispatch(event).await?;
            if ended {
                break;
            }
        }
        Ok(())
    }

    /// Dispatch every queued event without waiting for more
    ///
    /// Returns the number of events handled.
    ///
    /// # Errors
    ///
    /// Returns the first dispatch failure
    pub async fn drain(&mut self) -> Result<usize> {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.dispatch(event).await?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Follow listening state
    #[must_use]
    pub fn listening(&self) -> watch::Receiver<bool> {
        self.listening.subscribe()
    }

    /// Check if currently listening
    #[must_use]
    pub fn is_listening(&self) -> bool {
        *self.listening.borrow()
    }

    /// Check if the microphone is available
    #[must_use]
    pub const fn is_microphone_available(&self) -> bool {
        self.microphone_available
    }

    /// Options of the current or last session
    #[must_use]
    pub const fn options(&self) -> Option<&ListenOptions> {
        self.options.as_ref()
    }

    fn set_listening(&mut self, listening: bool) {
        let changed = self.listening.send_if_modified(|current| {
            let changed = *current != listening;
            *current = listening;
            changed
        });
        if changed {
            tracing::debug!(listening, "listening state changed");
            for subscriber in self.subscribers.values_mut() {
                subscriber.on_listening_change(listening);
            }
        }
    }

    fn set_microphone_available(&mut self, available: bool) {
        self.microphone_available = available;
        if !available {
            tracing::warn!("microphone unavailable");
            self.set_listening(false);
        }
        for subscriber in self.subscribers.values_mut() {
            subscriber.on_microphone_availability_change(available);
        }
    }
}

impl fmt::Debug for RecognitionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognitionManager")
            .field("engine", &self.engine.name())
            .field("subscribers", &self.subscribers.len())
            .field("listening", &self.is_listening())
            .field("microphone_available", &self.microphone_available)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
