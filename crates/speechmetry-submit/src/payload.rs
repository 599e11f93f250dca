use base64::Engine as _;
use serde::Serialize;
use speechmetry_core::{FeatureVector, RecordedAudio, SubmitError, TranscriptionMode};

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// The wire object a sink delivers. `speed_deviation` is carried twice
/// under both field names because downstream consumers read either one.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionPayload {
    pub transcription_mode: &'static str,
    pub wpm: u32,
    pub pause_ratio: f64,
    pub speed_deviation: u32,
    pub speech_speed_variability: u32,
    pub completion_ratio: f64,
    pub restart_count: u32,
    pub speech_start_delay: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_accuracy: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filler_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_b64: Option<String>,
}

impl SubmissionPayload {
    pub fn from_features(
        features: &FeatureVector,
        mode: TranscriptionMode,
        audio: Option<&RecordedAudio>,
    ) -> Result<Self, SubmitError> {
        let audio_b64 = match audio {
            Some(audio) => Some(encode_wav_b64(audio)?),
            None => None,
        };
        Ok(Self {
            transcription_mode: match mode {
                TranscriptionMode::Full => "full",
                TranscriptionMode::Fallback => "fallback",
            },
            wpm: features.wpm,
            pause_ratio: round3(features.pause_ratio),
            speed_deviation: features.speed_deviation,
            speech_speed_variability: features.speed_deviation,
            completion_ratio: round3(features.completion_ratio),
            restart_count: features.restart_count,
            speech_start_delay: features.speech_start_delay,
            word_accuracy: features.word_accuracy,
            filler_count: features.filler_count,
            repetition_count: features.repetition_count,
            audio_b64,
        })
    }

    pub fn to_json(&self) -> Result<String, SubmitError> {
        serde_json::to_string(self).map_err(|e| SubmitError::SendFailed(e.to_string()))
    }
}

/// Mono 16-bit WAV, base64-encoded. Float samples are clamped before the
/// integer conversion so clipped capture cannot wrap around.
fn encode_wav_b64(audio: &RecordedAudio) -> Result<String, SubmitError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| SubmitError::SendFailed(e.to_string()))?;
        for &sample in &audio.samples {
            let clamped = sample.clamp(-1.0, 1.0);
            writer
                .write_sample((clamped * i16::MAX as f32) as i16)
                .map_err(|e| SubmitError::SendFailed(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| SubmitError::SendFailed(e.to_string()))?;
    }
    Ok(base64::engine::general_purpose::STANDARD.encode(cursor.into_inner()))
}
