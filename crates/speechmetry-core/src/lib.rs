pub mod config;
pub mod error;
pub mod types;

pub use config::{AnalysisConfig, AppConfig, BUILTIN_PASSAGES};
pub use error::{AudioError, ConfigError, SessionError, SubmitError, TranscriptionError};
pub use types::{
    AudioChunk, FeatureVector, Passage, PauseStats, RecordedAudio, SessionPhase,
    TranscriptEvent, TranscriptionMode,
};
