use crate::payload::SubmissionPayload;
use async_trait::async_trait;
use speechmetry_core::SubmitError;

/// A sink that receives a completed session's feature payload and forwards
/// it somewhere.
///
/// Implementations are registered via [`SinkRegistry`](crate::SinkRegistry)
/// and receive one [`SubmissionPayload`] per completed session.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Returns the sink's plugin name (e.g. `"file"`, `"log"`).
    fn name(&self) -> &str;
    /// One-time initialisation with sink-specific TOML configuration.
    async fn initialize(&mut self, config: toml::Value) -> Result<(), SubmitError>;
    /// Deliver a completed session's payload.
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError>;
    /// Returns `true` if the sink is currently able to accept payloads.
    fn is_healthy(&self) -> bool;
    /// Gracefully shut down the sink, releasing resources.
    async fn shutdown(&self) -> Result<(), SubmitError>;
}
