use crate::analyzer::{self, AnalyzerCommand, AnalyzerWorker};
use crate::handle::SessionHandle;
use speechmetry_audio::{AudioSource, MicGuard, SilenceDetector};
use speechmetry_core::{
    AnalysisConfig, FeatureVector, Passage, RecordedAudio, SessionError, SessionPhase,
    TranscriptionError, TranscriptionMode,
};
use speechmetry_engine::Transcriber;
use speechmetry_metrics::{assemble_fallback, assemble_full};
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};

/// Transcription capability for a run, decided before the session starts.
/// A `Full` engine is already initialized by the caller; `Fallback` runs
/// the acoustic path alone and estimates the text features afterwards.
pub enum Mode {
    Full(Box<dyn Transcriber>),
    Fallback,
}

/// Everything a completed run produces.
#[derive(Debug)]
pub struct SessionOutcome {
    pub features: FeatureVector,
    pub audio: Option<RecordedAudio>,
}

/// One read-aloud session from microphone acquisition to feature vector.
///
/// The session owns the mic guard and the analyzer worker; dropping it
/// releases both. All transitions are explicit and illegal ones return
/// `SessionError::InvalidTransition` without touching the current state.
pub struct RecordingSession {
    passage: Passage,
    analysis: AnalysisConfig,
    sample_rate: u32,
    phase: SessionPhase,
    mode: TranscriptionMode,
    handle: SessionHandle,
    restart_count: u32,
    mic: Option<MicGuard>,
    worker: Option<AnalyzerWorker>,
    started_at: Option<Instant>,
    error_reason: Option<String>,
}

impl RecordingSession {
    pub fn new(passage: Passage, analysis: AnalysisConfig, sample_rate: u32) -> Self {
        Self {
            passage,
            analysis,
            sample_rate,
            phase: SessionPhase::Idle,
            mode: TranscriptionMode::Fallback,
            handle: SessionHandle::new(),
            restart_count: 0,
            mic: None,
            worker: None,
            started_at: None,
            error_reason: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn mode(&self) -> TranscriptionMode {
        self.mode
    }

    pub fn passage(&self) -> &Passage {
        &self.passage
    }

    pub fn restart_count(&self) -> u32 {
        self.restart_count
    }

    pub fn error_reason(&self) -> Option<&str> {
        self.error_reason.as_deref()
    }

    /// Cloneable live view for UIs and progress logging.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Begin capturing. Legal from `Idle`, `Done` and `Error`; a fresh run
    /// discards nothing from earlier completed runs except the restart
    /// counter, which persists until a run reaches `Done`.
    pub fn start(&mut self, source: &dyn AudioSource, mode: Mode) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Idle | SessionPhase::Done | SessionPhase::Error => {}
            _ => {
                return Err(SessionError::InvalidTransition {
                    action: "start",
                    phase: self.phase.as_str(),
                })
            }
        }

        let (audio_tx, audio_rx) = mpsc::unbounded_channel();
        let mic = match source.open(audio_tx) {
            Ok(mic) => mic,
            Err(e) => {
                tracing::error!("microphone unavailable: {e}");
                self.error_reason = Some(e.to_string());
                self.set_phase(SessionPhase::Error);
                return Err(e.into());
            }
        };

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let engine = match mode {
            Mode::Full(mut engine) => {
                engine.set_event_sender(event_tx);
                self.mode = TranscriptionMode::Full;
                Some(engine)
            }
            Mode::Fallback => {
                // No sender alive: the analyzer sees the event channel
                // close immediately and runs the acoustic path alone.
                drop(event_tx);
                self.mode = TranscriptionMode::Fallback;
                None
            }
        };

        self.handle.reset_counters();
        self.handle.set_restart_count(self.restart_count);
        self.worker = Some(analyzer::spawn(
            audio_rx,
            engine,
            event_rx,
            SilenceDetector::new(self.analysis.silence_threshold),
            self.handle.clone(),
            self.sample_rate,
        ));
        self.mic = Some(mic);
        self.started_at = Some(Instant::now());
        self.error_reason = None;
        self.set_phase(SessionPhase::Recording);
        tracing::info!(mode = ?self.mode, "recording session started");
        Ok(())
    }

    /// Finish the run: release the mic, drain the analyzer and assemble the
    /// feature vector. Legal only from `Recording`.
    pub async fn stop(&mut self) -> Result<SessionOutcome, SessionError> {
        if self.phase != SessionPhase::Recording {
            return Err(SessionError::InvalidTransition {
                action: "stop",
                phase: self.phase.as_str(),
            });
        }
        self.set_phase(SessionPhase::Processing);

        // The mic goes first so capture provably ends before any analysis.
        self.release_capture();
        let elapsed_secs = self
            .started_at
            .take()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);

        let Some(mut worker) = self.worker.take() else {
            self.error_reason = Some("analyzer missing".to_string());
            self.set_phase(SessionPhase::Error);
            return Err(TranscriptionError::Runtime("analyzer missing".to_string()).into());
        };

        // A denied engine invalidates the whole run; surface it instead of
        // reporting half-built features as real.
        if let Ok(reason) = worker.fatal_rx.try_recv() {
            self.error_reason = Some(reason.clone());
            self.set_phase(SessionPhase::Error);
            return Err(TranscriptionError::AccessDenied(reason).into());
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        if worker
            .cmd_tx
            .send(AnalyzerCommand::Stop { reply: reply_tx })
            .is_err()
        {
            self.error_reason = Some("analyzer terminated".to_string());
            self.set_phase(SessionPhase::Error);
            return Err(TranscriptionError::Runtime("analyzer terminated".to_string()).into());
        }
        let snapshot = match reply_rx.await {
            Ok(snapshot) => snapshot,
            Err(_) => {
                self.error_reason = Some("analyzer terminated".to_string());
                self.set_phase(SessionPhase::Error);
                return Err(TranscriptionError::Runtime("analyzer terminated".to_string()).into());
            }
        };
        let _ = worker.join.await;

        let acoustic_ratio = snapshot.pause_stats.ratio();
        let features = match self.mode {
            TranscriptionMode::Full => assemble_full(
                &snapshot.final_transcript,
                &self.passage,
                acoustic_ratio,
                elapsed_secs,
                snapshot.first_speech_offset,
                self.restart_count,
                &self.analysis,
            ),
            TranscriptionMode::Fallback => assemble_fallback(
                &self.passage,
                acoustic_ratio,
                elapsed_secs,
                self.restart_count,
                &self.analysis,
            ),
        };
        let audio = if snapshot.recorded.is_empty() {
            None
        } else {
            Some(RecordedAudio {
                samples: snapshot.recorded,
                sample_rate: snapshot.sample_rate,
            })
        };

        self.set_phase(SessionPhase::Done);
        tracing::info!(
            wpm = features.wpm,
            pause_ratio = features.pause_ratio,
            mode = ?self.mode,
            "session complete"
        );
        Ok(SessionOutcome { features, audio })
    }

    /// Abandon the current run and return to `Idle`. The partial transcript
    /// and pause stats are discarded; only the restart counter survives.
    pub async fn restart(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Recording {
            return Err(SessionError::InvalidTransition {
                action: "restart",
                phase: self.phase.as_str(),
            });
        }

        self.release_capture();
        if let Some(worker) = self.worker.take() {
            let (reply_tx, reply_rx) = oneshot::channel();
            if worker
                .cmd_tx
                .send(AnalyzerCommand::Stop { reply: reply_tx })
                .is_ok()
            {
                let _ = reply_rx.await;
            }
            let _ = worker.join.await;
        }
        self.started_at = None;
        self.restart_count += 1;
        self.handle.reset_counters();
        self.handle.set_restart_count(self.restart_count);
        self.set_phase(SessionPhase::Idle);
        tracing::info!(restart_count = self.restart_count, "session restarted");
        Ok(())
    }

    /// Poll for a fatal engine fault mid-run. On one, the session releases
    /// the mic and moves to `Error` so the caller can offer a fallback run.
    pub fn check_fault(&mut self) -> Option<String> {
        let reason = self.worker.as_mut()?.fatal_rx.try_recv().ok()?;
        tracing::error!("session failed: {reason}");
        self.release_capture();
        self.worker = None;
        self.error_reason = Some(reason.clone());
        self.set_phase(SessionPhase::Error);
        Some(reason)
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
        self.handle.set_phase(phase);
    }

    fn release_capture(&mut self) {
        if let Some(mut mic) = self.mic.take() {
            mic.release();
        }
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        // Dropping the worker closes its command channel; the analyzer
        // shuts the engine down and exits on its own.
        self.release_capture();
    }
}
