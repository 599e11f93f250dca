use crate::engine_trait::Transcriber;
use async_trait::async_trait;
use speechmetry_core::{AudioChunk, TranscriptEvent, TranscriptionError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Replays a fixed sequence of interim/final events, one per fed audio
/// chunk. The only in-tree engine: real speech-to-text lives behind this
/// trait as a plugin, while the scripted engine drives tests and wiring.
pub struct ScriptedTranscriber {
    script: Mutex<VecDeque<(String, bool)>>,
    event_sender: Mutex<Option<mpsc::UnboundedSender<TranscriptEvent>>>,
    feed_count: AtomicUsize,
}

impl ScriptedTranscriber {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            event_sender: Mutex::new(None),
            feed_count: AtomicUsize::new(0),
        }
    }

    pub fn with_script(events: impl IntoIterator<Item = (String, bool)>) -> Self {
        let engine = Self::new();
        *engine.script.lock().unwrap() = events.into_iter().collect();
        engine
    }

    pub fn feed_count(&self) -> usize {
        self.feed_count.load(Ordering::Relaxed)
    }
}

impl Default for ScriptedTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), TranscriptionError> {
        let Some(events) = config.get("events") else {
            return Ok(());
        };
        let events = events.as_array().ok_or_else(|| {
            TranscriptionError::InitializationFailed("'events' must be an array".to_string())
        })?;

        let mut script = VecDeque::with_capacity(events.len());
        for event in events {
            let text = event
                .get("text")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    TranscriptionError::InitializationFailed(
                        "scripted event missing 'text'".to_string(),
                    )
                })?;
            let is_final = event.get("final").and_then(|v| v.as_bool()).unwrap_or(true);
            script.push_back((text.to_string(), is_final));
        }
        *self.script.lock().unwrap() = script;
        Ok(())
    }

    async fn feed_audio(&self, chunk: AudioChunk) -> Result<(), TranscriptionError> {
        let count = self.feed_count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!("scripted engine fed chunk #{count}, {} samples", chunk.samples.len());

        let next = self.script.lock().unwrap().pop_front();
        if let Some((text, is_final)) = next {
            let event = TranscriptEvent {
                text,
                is_final,
                // Stamped with the session offset by whoever receives it.
                offset_secs: 0.0,
            };
            if let Ok(sender) = self.event_sender.lock() {
                if let Some(tx) = sender.as_ref() {
                    let _ = tx.send(event);
                }
            }
        }
        Ok(())
    }

    fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<TranscriptEvent>) {
        *self.event_sender.lock().unwrap() = Some(sender);
    }

    async fn shutdown(&self) -> Result<(), TranscriptionError> {
        Ok(())
    }
}
