use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("no passages configured")]
    NoPassages,
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("microphone access denied: {0}")]
    PermissionDenied(String),

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("failed to enumerate devices: {0}")]
    DeviceEnumeration(String),

    #[error("failed to build stream: {0}")]
    StreamBuild(String),

    #[error("stream error: {0}")]
    StreamError(String),
}

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("engine initialization failed: {0}")]
    InitializationFailed(String),

    #[error("engine not found: {0}")]
    EngineNotFound(String),

    /// The engine refused access mid-session. Fatal: the session moves to
    /// its error phase, same as a microphone permission failure.
    #[error("transcription access denied: {0}")]
    AccessDenied(String),

    /// A transient engine fault. Tolerated: the session stops feeding the
    /// engine but keeps the transcript accumulated so far.
    #[error("engine runtime fault: {0}")]
    Runtime(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("illegal transition: {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error(transparent)]
    Transcription(#[from] TranscriptionError),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("sink initialization failed: {0}")]
    InitializationFailed(String),

    #[error("failed to submit features: {0}")]
    SendFailed(String),

    #[error("sink not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message() {
        let err = SessionError::InvalidTransition {
            action: "stop",
            phase: "idle",
        };
        assert_eq!(err.to_string(), "illegal transition: stop while idle");
    }

    #[test]
    fn test_audio_error_converts_into_session_error() {
        let err: SessionError = AudioError::PermissionDenied("user declined".into()).into();
        assert!(err.to_string().contains("microphone access denied"));
    }

    #[test]
    fn test_access_denied_distinct_from_runtime() {
        let fatal = TranscriptionError::AccessDenied("not-allowed".into());
        let transient = TranscriptionError::Runtime("network".into());
        assert!(fatal.to_string().contains("access denied"));
        assert!(transient.to_string().contains("runtime fault"));
    }
}
