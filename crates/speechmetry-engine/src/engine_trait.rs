use async_trait::async_trait;
use speechmetry_core::{AudioChunk, TranscriptEvent, TranscriptionError};
use tokio::sync::mpsc;

/// A streaming transcription engine.
///
/// Engines receive raw audio through [`feed_audio`](Self::feed_audio) and
/// emit interim/final [`TranscriptEvent`]s on the configured sender, in
/// order. Availability is decided once at session start: a session either
/// has an engine for its whole lifetime or runs in fallback mode.
#[async_trait]
pub trait Transcriber: Send + Sync {
    fn name(&self) -> &str;
    async fn initialize(&mut self, config: toml::Value) -> Result<(), TranscriptionError>;
    async fn feed_audio(&self, chunk: AudioChunk) -> Result<(), TranscriptionError>;
    fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<TranscriptEvent>);
    async fn shutdown(&self) -> Result<(), TranscriptionError>;
}
