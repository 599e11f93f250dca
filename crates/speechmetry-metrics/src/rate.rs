use crate::text::tokenize;

/// Per-segment speech rates without per-word timestamps.
///
/// The transcript is split into sentence-like chunks; `total_secs` is
/// allocated to each chunk in proportion to its word count (uniform
/// per-word duration). With fewer than two usable chunks the whole
/// transcript becomes a single segment.
pub fn segment_rates(transcript: &str, total_secs: f64) -> Vec<f64> {
    let chunks: Vec<&str> = transcript
        .split(['.', '!', '?', ',', ';'])
        .filter(|s| s.trim().len() > 3)
        .collect();

    let total_words = tokenize(transcript).len();
    if chunks.len() < 2 {
        return vec![(total_words as f64 / total_secs * 60.0).round()];
    }

    let secs_per_word = total_secs / (total_words.max(1) as f64);
    chunks
        .iter()
        .filter_map(|chunk| {
            let word_count = tokenize(chunk).len() as f64;
            let duration = word_count * secs_per_word;
            if duration > 0.0 {
                Some((word_count / duration * 60.0).round())
            } else {
                None
            }
        })
        .filter(|rate| *rate > 0.0)
        .collect()
}

/// Population standard deviation of per-segment rates, rounded to whole
/// words per minute. Fewer than two samples means no variability signal.
pub fn speed_variability(rates: &[f64]) -> u32 {
    if rates.len() < 2 {
        return 0;
    }
    let n = rates.len() as f64;
    let mean = rates.iter().sum::<f64>() / n;
    let variance = rates.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt().round() as u32
}
