pub mod engine_trait;
pub mod reconciler;
pub mod registry;
pub mod scripted;

pub use engine_trait::Transcriber;
pub use reconciler::TranscriptReconciler;
pub use registry::TranscriberRegistry;
pub use scripted::ScriptedTranscriber;
