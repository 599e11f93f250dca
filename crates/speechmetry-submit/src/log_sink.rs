use crate::payload::SubmissionPayload;
use crate::sink_trait::SubmissionSink;
use async_trait::async_trait;
use speechmetry_core::SubmitError;

/// Writes the payload to the structured log instead of posting it anywhere.
/// The default sink when no submission target is configured.
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn initialize(&mut self, _config: toml::Value) -> Result<(), SubmitError> {
        Ok(())
    }

    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError> {
        tracing::info!(
            mode = payload.transcription_mode,
            wpm = payload.wpm,
            pause_ratio = payload.pause_ratio,
            completion_ratio = payload.completion_ratio,
            restart_count = payload.restart_count,
            "session features: {}",
            payload.to_json()?
        );
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        true
    }

    async fn shutdown(&self) -> Result<(), SubmitError> {
        Ok(())
    }
}
