//! Shared test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use speech_commands::recognition::EventSender;
use speech_commands::{
    Command, CommandMatch, CommandMatcher, CommandSpec, Error, ListenOptions, RecognitionEngine,
    RecognitionEvent, ResetHandle, Result, TranscriptStore, TranscriptUpdate,
};

/// A recorded callback invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Label of the command that fired
    pub label: String,
    /// Subcommand that matched
    pub subcommand: String,
    /// Match passed to the callback
    pub result: CommandMatch,
}

/// Shared log of callback invocations
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a command that records every invocation under `label`
    #[must_use]
    pub fn command(&self, label: &str, spec: impl Into<CommandSpec>) -> Command {
        let calls = Arc::clone(&self.calls);
        let label = label.to_string();
        Command::new(spec, move |result, ctx| {
            calls.lock().unwrap().push(Call {
                label: label.clone(),
                subcommand: ctx.command.to_string(),
                result: result.clone(),
            });
            Ok(())
        })
    }

    /// Recorded invocations
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Labels of recorded invocations, in order
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.label).collect()
    }

    /// Forget recorded invocations
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

/// Create a matcher over a fresh transcript
#[must_use]
pub fn matcher(commands: Vec<Command>) -> CommandMatcher {
    CommandMatcher::new(commands, ResetHandle::new(TranscriptStore::new()))
        .expect("failed to register commands")
}

/// Engine calls observed by a [`ScriptedEngine`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineLog {
    /// Options of every start call
    pub starts: Vec<ListenOptions>,
    /// Number of stop calls
    pub stops: usize,
    /// Number of abort calls
    pub aborts: usize,
    /// Number of transcript resets
    pub resets: usize,
}

/// Engine that emits a fixed script of events on every start
#[derive(Debug, Clone, Default)]
pub struct ScriptedEngine {
    script: Vec<RecognitionEvent>,
    continuous: bool,
    microphone_denied: bool,
    log: Arc<Mutex<EngineLog>>,
}

impl ScriptedEngine {
    /// Create an engine that sends `script` when started
    #[must_use]
    pub fn new(script: Vec<RecognitionEvent>) -> Self {
        Self {
            script,
            continuous: true,
            ..Self::default()
        }
    }

    /// Report no support for continuous listening
    #[must_use]
    pub const fn without_continuous(mut self) -> Self {
        self.continuous = false;
        self
    }

    /// Fail every start with an unavailable microphone
    #[must_use]
    pub const fn with_microphone_denied(mut self) -> Self {
        self.microphone_denied = true;
        self
    }

    /// Shared call log
    #[must_use]
    pub fn log(&self) -> Arc<Mutex<EngineLog>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl RecognitionEngine for ScriptedEngine {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn supports_continuous(&self) -> bool {
        self.continuous
    }

    async fn start(&mut self, options: &ListenOptions, events: EventSender) -> Result<()> {
        if self.microphone_denied {
            return Err(Error::MicrophoneUnavailable);
        }
        self.log.lock().unwrap().starts.push(options.clone());
        for event in &self.script {
            events
                .send(event.clone())
                .map_err(|e| Error::Engine(e.to_string()))?;
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.log.lock().unwrap().stops += 1;
        Ok(())
    }

    async fn abort(&mut self) -> Result<()> {
        self.log.lock().unwrap().aborts += 1;
        Ok(())
    }

    async fn reset_transcript(&mut self) -> Result<()> {
        self.log.lock().unwrap().resets += 1;
        Ok(())
    }
}

/// Transcript event with interim text
#[must_use]
pub fn interim(text: &str) -> RecognitionEvent {
    RecognitionEvent::TranscriptChanged(TranscriptUpdate::interim(text))
}

/// Transcript event confirming a phrase
#[must_use]
pub fn finalized(text: &str) -> RecognitionEvent {
    RecognitionEvent::TranscriptChanged(TranscriptUpdate::finalized(text))
}
