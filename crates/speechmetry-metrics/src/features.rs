use crate::rate::{segment_rates, speed_variability};
use crate::text::{count_fillers, count_repetitions, tokenize, word_accuracy};
use speechmetry_core::{AnalysisConfig, FeatureVector, Passage};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Feature derivation when a transcription engine was available.
///
/// Rates divide by the floored session duration so an accidental tap cannot
/// produce runaway values. The final pause ratio blends the acoustic
/// silence ratio with filler/repetition penalties, capped below 1.
pub fn assemble_full(
    transcript: &str,
    passage: &Passage,
    acoustic_ratio: Option<f64>,
    elapsed_secs: f64,
    start_delay: Option<f64>,
    restart_count: u32,
    cfg: &AnalysisConfig,
) -> FeatureVector {
    let total_secs = elapsed_secs.max(1.0);
    let effective_secs = elapsed_secs.max(cfg.min_session_secs);

    let transcribed = tokenize(transcript).len();
    let passage_words = tokenize(passage.text()).len();

    let wpm = (transcribed as f64 / effective_secs * 60.0).round() as u32;
    let accuracy = word_accuracy(transcript, passage.text());
    let completion_ratio = if passage_words == 0 {
        1.0
    } else {
        (transcribed as f64 / passage_words as f64).min(1.0)
    };

    let fillers = count_fillers(transcript);
    let repetitions = count_repetitions(transcript);
    let acoustic = acoustic_ratio.unwrap_or(cfg.default_pause_ratio);
    let disfluency_penalty =
        fillers as f64 * cfg.filler_penalty + repetitions as f64 * cfg.repetition_penalty;
    let pause_ratio = (acoustic + disfluency_penalty).min(cfg.pause_ratio_cap);

    let rates = segment_rates(transcript, total_secs);

    FeatureVector {
        wpm,
        pause_ratio,
        speed_deviation: speed_variability(&rates),
        completion_ratio,
        restart_count,
        speech_start_delay: round2(start_delay.unwrap_or(cfg.default_start_delay)),
        word_accuracy: Some(accuracy),
        filler_count: Some(fillers),
        repetition_count: Some(repetitions),
    }
}

/// Feature derivation when no transcription capability exists.
///
/// With only elapsed time and passage length to work from, the rate assumes
/// the passage was read in full, completion is estimated against the
/// average read duration, and the variability comes from three synthetic
/// samples around the single computed rate. Accuracy, fillers and
/// repetitions stay undefined rather than zero. The divergence from the
/// full-mode formulas is deliberate.
pub fn assemble_fallback(
    passage: &Passage,
    acoustic_ratio: Option<f64>,
    elapsed_secs: f64,
    restart_count: u32,
    cfg: &AnalysisConfig,
) -> FeatureVector {
    let effective_secs = elapsed_secs.max(cfg.min_session_secs);
    let passage_words = tokenize(passage.text()).len();

    let wpm = (passage_words as f64 / effective_secs * 60.0).round() as u32;
    let completion_ratio = (effective_secs / cfg.average_read_secs).min(1.0);
    let acoustic = acoustic_ratio.unwrap_or(cfg.default_pause_ratio);
    let synthetic = [wpm as f64, wpm as f64 * 0.9, wpm as f64 * 1.1];

    FeatureVector {
        wpm,
        pause_ratio: acoustic.min(cfg.pause_ratio_cap),
        speed_deviation: speed_variability(&synthetic),
        completion_ratio,
        restart_count,
        speech_start_delay: round2(cfg.default_start_delay),
        word_accuracy: None,
        filler_count: None,
        repetition_count: None,
    }
}
