use speechmetry_core::SessionPhase;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

struct HandleState {
    phase: AtomicU8,
    elapsed_secs: AtomicU64,
    pause_ratio_bits: AtomicU32,
    word_count: AtomicUsize,
    restart_count: AtomicU32,
}

/// Cloneable live view of a running session, safe to read from a UI loop
/// at any time without blocking frame processing.
#[derive(Clone)]
pub struct SessionHandle {
    state: Arc<HandleState>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self {
            state: Arc::new(HandleState {
                phase: AtomicU8::new(0),
                elapsed_secs: AtomicU64::new(0),
                pause_ratio_bits: AtomicU32::new(0f32.to_bits()),
                word_count: AtomicUsize::new(0),
                restart_count: AtomicU32::new(0),
            }),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state.phase.load(Ordering::Relaxed) {
            1 => SessionPhase::Recording,
            2 => SessionPhase::Processing,
            3 => SessionPhase::Done,
            4 => SessionPhase::Error,
            _ => SessionPhase::Idle,
        }
    }

    pub(crate) fn set_phase(&self, phase: SessionPhase) {
        let v = match phase {
            SessionPhase::Idle => 0,
            SessionPhase::Recording => 1,
            SessionPhase::Processing => 2,
            SessionPhase::Done => 3,
            SessionPhase::Error => 4,
        };
        self.state.phase.store(v, Ordering::Relaxed);
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.state.elapsed_secs.load(Ordering::Relaxed)
    }

    pub(crate) fn set_elapsed_secs(&self, secs: u64) {
        self.state.elapsed_secs.store(secs, Ordering::Relaxed);
    }

    /// Running acoustic pause ratio, before the disfluency blend.
    pub fn pause_ratio(&self) -> f32 {
        f32::from_bits(self.state.pause_ratio_bits.load(Ordering::Relaxed))
    }

    pub(crate) fn set_pause_ratio(&self, ratio: f32) {
        self.state
            .pause_ratio_bits
            .store(ratio.to_bits(), Ordering::Relaxed);
    }

    /// Confirmed transcribed words so far; stays 0 in fallback mode.
    pub fn word_count(&self) -> usize {
        self.state.word_count.load(Ordering::Relaxed)
    }

    pub(crate) fn set_word_count(&self, count: usize) {
        self.state.word_count.store(count, Ordering::Relaxed);
    }

    pub fn restart_count(&self) -> u32 {
        self.state.restart_count.load(Ordering::Relaxed)
    }

    pub(crate) fn set_restart_count(&self, count: u32) {
        self.state.restart_count.store(count, Ordering::Relaxed);
    }

    pub(crate) fn reset_counters(&self) {
        self.set_elapsed_secs(0);
        self.set_pause_ratio(0.0);
        self.set_word_count(0);
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_starts_idle() {
        let handle = SessionHandle::new();
        assert_eq!(handle.phase(), SessionPhase::Idle);
        assert_eq!(handle.elapsed_secs(), 0);
        assert_eq!(handle.word_count(), 0);
        assert_eq!(handle.restart_count(), 0);
    }

    #[test]
    fn test_handle_phase_round_trip() {
        let handle = SessionHandle::new();
        for phase in [
            SessionPhase::Recording,
            SessionPhase::Processing,
            SessionPhase::Done,
            SessionPhase::Error,
            SessionPhase::Idle,
        ] {
            handle.set_phase(phase);
            assert_eq!(handle.phase(), phase);
        }
    }

    #[test]
    fn test_handle_clone_shares_state() {
        let h1 = SessionHandle::new();
        let h2 = h1.clone();
        h1.set_phase(SessionPhase::Recording);
        h1.set_word_count(12);
        assert_eq!(h2.phase(), SessionPhase::Recording);
        assert_eq!(h2.word_count(), 12);
    }

    #[test]
    fn test_handle_pause_ratio_round_trip() {
        let handle = SessionHandle::new();
        handle.set_pause_ratio(0.42);
        assert!((handle.pause_ratio() - 0.42).abs() < 1e-6);
    }

    #[test]
    fn test_handle_reset_keeps_restart_count() {
        let handle = SessionHandle::new();
        handle.set_elapsed_secs(30);
        handle.set_word_count(40);
        handle.set_pause_ratio(0.3);
        handle.set_restart_count(2);
        handle.reset_counters();
        assert_eq!(handle.elapsed_secs(), 0);
        assert_eq!(handle.word_count(), 0);
        assert_eq!(handle.pause_ratio(), 0.0);
        assert_eq!(handle.restart_count(), 2);
    }
}
