use speechmetry_core::{AudioChunk, PauseStats};

/// RMS amplitude of a frame, scaled x100 so the silence threshold matches
/// the original byte-domain calibration (threshold 8 on a 0..100 scale).
pub fn rms_amplitude(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples.iter().map(|s| (*s as f64) * (*s as f64)).sum();
    (sum_squares / samples.len() as f64).sqrt() * 100.0
}

/// Classifies each audio frame as silence or speech and accumulates the
/// running pause ratio. Owned exclusively by one session, constructed
/// fresh at every `start()`, frozen by simply not feeding it after stop.
#[derive(Debug)]
pub struct SilenceDetector {
    threshold: f64,
    stats: PauseStats,
}

impl SilenceDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            stats: PauseStats::default(),
        }
    }

    /// Classify one frame. Returns `true` when the frame was silent.
    /// Empty frames carry no signal and are not counted.
    pub fn process(&mut self, chunk: &AudioChunk) -> bool {
        if chunk.samples.is_empty() {
            return false;
        }
        let silent = rms_amplitude(&chunk.samples) < self.threshold;
        self.stats.record(silent);
        silent
    }

    pub fn stats(&self) -> PauseStats {
        self.stats
    }

    /// Running pause ratio; `None` until the first frame arrives.
    pub fn ratio(&self) -> Option<f64> {
        self.stats.ratio()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(samples: Vec<f32>) -> AudioChunk {
        AudioChunk {
            samples,
            sample_rate: 48000,
            channels: 1,
        }
    }

    #[test]
    fn test_rms_of_silence_is_zero() {
        assert_eq!(rms_amplitude(&[0.0; 512]), 0.0);
    }

    #[test]
    fn test_rms_of_full_scale_signal() {
        // Constant +-1.0 square wave has RMS 1.0, scaled to 100.
        let samples: Vec<f32> = (0..512).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert!((rms_amplitude(&samples) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_rms_of_empty_frame() {
        assert_eq!(rms_amplitude(&[]), 0.0);
    }

    #[test]
    fn test_detector_counts_silent_frames() {
        let mut detector = SilenceDetector::new(8.0);
        assert!(detector.process(&chunk(vec![0.0; 480])));
        assert!(detector.process(&chunk(vec![0.01; 480])));
        let stats = detector.stats();
        assert_eq!(stats.total_frames, 2);
        assert_eq!(stats.silent_frames, 2);
        assert_eq!(detector.ratio(), Some(1.0));
    }

    #[test]
    fn test_detector_counts_speech_frames() {
        let mut detector = SilenceDetector::new(8.0);
        assert!(!detector.process(&chunk(vec![0.5; 480])));
        let stats = detector.stats();
        assert_eq!(stats.total_frames, 1);
        assert_eq!(stats.silent_frames, 0);
        assert_eq!(detector.ratio(), Some(0.0));
    }

    #[test]
    fn test_detector_mixed_frames_ratio() {
        let mut detector = SilenceDetector::new(8.0);
        for _ in 0..3 {
            detector.process(&chunk(vec![0.0; 480]));
        }
        detector.process(&chunk(vec![0.5; 480]));
        assert_eq!(detector.ratio(), Some(0.75));
    }

    #[test]
    fn test_detector_threshold_boundary() {
        let mut detector = SilenceDetector::new(8.0);
        // RMS exactly at the threshold counts as speech, just below as silence.
        assert!(!detector.process(&chunk(vec![0.08; 480])));
        assert!(detector.process(&chunk(vec![0.079; 480])));
    }

    #[test]
    fn test_detector_skips_empty_frames() {
        let mut detector = SilenceDetector::new(8.0);
        detector.process(&chunk(vec![]));
        assert_eq!(detector.stats().total_frames, 0);
        assert_eq!(detector.ratio(), None);
    }

    #[test]
    fn test_ratio_always_within_bounds() {
        let mut detector = SilenceDetector::new(8.0);
        for i in 0..100 {
            let level = if i % 3 == 0 { 0.0 } else { 0.9 };
            detector.process(&chunk(vec![level; 64]));
            let ratio = detector.ratio().unwrap();
            assert!((0.0..=1.0).contains(&ratio));
        }
    }
}
