use serde::Serialize;

#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// One result event from a streaming transcription engine.
///
/// `text` is the cumulative text for the current utterance chunk. Final
/// events are confirmed; interim events are provisional and may be revised
/// by a later event.
#[derive(Debug, Clone)]
pub struct TranscriptEvent {
    pub text: String,
    pub is_final: bool,
    /// Seconds since session start at which the event arrived.
    pub offset_secs: f64,
}

/// The reference text the patient reads aloud. Selected once per session,
/// read-only thereafter.
#[derive(Debug, Clone)]
pub struct Passage {
    text: String,
}

impl Passage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Silent/total frame counters accumulated by the silence detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseStats {
    pub silent_frames: u64,
    pub total_frames: u64,
}

impl PauseStats {
    pub fn record(&mut self, silent: bool) {
        self.total_frames += 1;
        if silent {
            self.silent_frames += 1;
        }
    }

    /// Fraction of frames classified silent, clamped to [0, 1].
    /// `None` when no frames have been seen; callers substitute a
    /// documented default instead of dividing by zero.
    pub fn ratio(&self) -> Option<f64> {
        if self.total_frames == 0 {
            None
        } else {
            Some((self.silent_frames as f64 / self.total_frames as f64).clamp(0.0, 1.0))
        }
    }
}

/// Raw PCM captured during a session, kept only long enough to build the
/// optional submission payload.
#[derive(Debug, Clone)]
pub struct RecordedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Recording,
    Processing,
    Done,
    Error,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Recording => "recording",
            SessionPhase::Processing => "processing",
            SessionPhase::Done => "done",
            SessionPhase::Error => "error",
        }
    }
}

/// Chosen once at `start()` and fixed for the whole session; there is no
/// mid-session switching between transcription and fallback derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptionMode {
    Full,
    Fallback,
}

/// The final numeric summary of one recording session.
///
/// The optional fields are present only when a transcription engine was
/// available: in fallback mode they are undefined, not zero, so the
/// consumer can tell "not measured" from "measured as zero".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub wpm: u32,
    pub pause_ratio: f64,
    pub speed_deviation: u32,
    pub completion_ratio: f64,
    pub restart_count: u32,
    pub speech_start_delay: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_accuracy: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filler_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_count: Option<u32>,
}
