//! Speech recognition integration
//!
//! Connects a [`RecognitionEngine`] to command subscriptions. The engine
//! does the listening; the [`RecognitionManager`] forwards its transcript
//! updates to every [`Subscription`], which records the transcript and
//! runs its commands.

mod engine;
mod manager;
mod replay;
mod subscription;

pub use engine::{
    DEFAULT_LANGUAGE, EventSender, ListenOptions, RecognitionEngine, RecognitionEvent,
    TranscriptUpdate,
};
pub use manager::{RecognitionManager, SubscriptionId};
pub use replay::ReplayEngine;
pub use subscription::{RecognitionSubscriber, Subscription, SubscriptionOptions};
