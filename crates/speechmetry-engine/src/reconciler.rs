use speechmetry_core::TranscriptEvent;

/// Merges the engine's interim/final event stream into one append-only
/// final transcript plus a volatile interim tail.
///
/// Final text only grows, in arrival order. At most one interim chunk is
/// held at a time: each interim event replaces the previous one, and
/// interim text never reaches the final transcript since the engine may revise
/// or retract it. Events must be applied in arrival order; the engine
/// guarantees monotonic final-text growth per utterance, so no
/// deduplication is needed here.
#[derive(Debug, Default)]
pub struct TranscriptReconciler {
    final_transcript: String,
    interim: String,
    first_speech_offset: Option<f64>,
}

impl TranscriptReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &TranscriptEvent) {
        if self.first_speech_offset.is_none() && !event.text.trim().is_empty() {
            self.first_speech_offset = Some(event.offset_secs);
        }

        if event.is_final {
            self.final_transcript.push_str(&event.text);
            self.final_transcript.push(' ');
            self.interim.clear();
        } else {
            self.interim.clear();
            self.interim.push_str(&event.text);
        }
    }

    /// The confirmed transcript, for metric computation at stop time.
    pub fn final_transcript(&self) -> &str {
        self.final_transcript.trim_end()
    }

    /// The provisional tail, for live display only.
    pub fn interim_text(&self) -> &str {
        &self.interim
    }

    /// Confirmed word count, cheap enough for a live counter.
    pub fn word_count(&self) -> usize {
        self.final_transcript.split_whitespace().count()
    }

    /// Seconds from session start to the first non-empty event of either
    /// kind; `None` when no speech was ever observed.
    pub fn first_speech_offset(&self) -> Option<f64> {
        self.first_speech_offset
    }
}
