use speechmetry_audio::{AudioSource, MicGuard};
use speechmetry_core::{AnalysisConfig, AudioChunk, AudioError, Passage, SessionPhase};
use speechmetry_engine::{ScriptedTranscriber, Transcriber, TranscriberRegistry};
use speechmetry_session::{Mode, RecordingSession};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

struct FakeMic {
    tap: Mutex<Option<mpsc::UnboundedSender<AudioChunk>>>,
    released: Mutex<Option<Arc<AtomicBool>>>,
}

impl FakeMic {
    fn new() -> Self {
        Self {
            tap: Mutex::new(None),
            released: Mutex::new(None),
        }
    }

    fn feed(&self, count: usize, amplitude: f32) {
        let tap = self.tap.lock().unwrap().clone().expect("mic not opened");
        for _ in 0..count {
            tap.send(AudioChunk {
                samples: vec![amplitude; 480],
                sample_rate: 48000,
                channels: 1,
            })
            .unwrap();
        }
    }

    fn released(&self) -> bool {
        self.released
            .lock()
            .unwrap()
            .as_ref()
            .expect("mic not opened")
            .load(Ordering::SeqCst)
    }
}

impl AudioSource for FakeMic {
    fn open(&self, tap: mpsc::UnboundedSender<AudioChunk>) -> Result<MicGuard, AudioError> {
        let guard = MicGuard::detached();
        *self.released.lock().unwrap() = Some(guard.released_flag());
        *self.tap.lock().unwrap() = Some(tap);
        Ok(guard)
    }
}

async fn stop(session: &mut RecordingSession) -> speechmetry_session::SessionOutcome {
    tokio::time::timeout(Duration::from_secs(2), session.stop())
        .await
        .expect("stop timed out")
        .expect("stop failed")
}

#[tokio::test]
async fn test_full_pipeline_from_registry_to_features() {
    let registry = TranscriberRegistry::new();
    let mut engine = registry.create("scripted").unwrap();
    let config: toml::Value = toml::from_str(
        r#"
        events = [
            { text = "the quick brown", final = false },
            { text = "the quick brown fox", final = true },
        ]
        "#,
    )
    .unwrap();
    engine.initialize(config).await.unwrap();

    let mic = FakeMic::new();
    let mut session = RecordingSession::new(
        Passage::new("the quick brown fox"),
        AnalysisConfig::default(),
        48000,
    );
    session.start(&mic, Mode::Full(engine)).unwrap();
    mic.feed(2, 0.5);

    let outcome = stop(&mut session).await;
    assert_eq!(session.phase(), SessionPhase::Done);
    assert!(mic.released());
    assert_eq!(outcome.features.word_accuracy, Some(100));
    assert_eq!(outcome.features.completion_ratio, 1.0);
    assert_eq!(outcome.features.filler_count, Some(0));
    assert_eq!(outcome.features.repetition_count, Some(0));
}

#[tokio::test]
async fn test_fallback_pipeline_estimates_from_passage() {
    let mic = FakeMic::new();
    let mut session = RecordingSession::new(
        Passage::new("the quick brown fox jumps over the lazy dog"),
        AnalysisConfig::default(),
        48000,
    );
    session.start(&mic, Mode::Fallback).unwrap();
    mic.feed(4, 0.5);
    mic.feed(4, 0.0);

    let outcome = stop(&mut session).await;
    // Nine passage words over the five second floor.
    assert_eq!(outcome.features.wpm, 108);
    assert!(outcome.features.word_accuracy.is_none());
    assert!(outcome.features.filler_count.is_none());
    // Half the frames were silent; penalties do not apply without a
    // transcript, so the acoustic ratio passes through.
    assert!((outcome.features.pause_ratio - 0.5).abs() < 1e-6);
}

#[tokio::test]
async fn test_restart_then_complete_reports_attempts() {
    let mic = FakeMic::new();
    let mut session = RecordingSession::new(
        Passage::new("the quick brown fox"),
        AnalysisConfig::default(),
        48000,
    );

    session.start(&mic, Mode::Fallback).unwrap();
    mic.feed(3, 0.5);
    tokio::time::timeout(Duration::from_secs(2), session.restart())
        .await
        .expect("restart timed out")
        .unwrap();
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(mic.released());

    let engine = ScriptedTranscriber::with_script([("the quick brown fox".to_string(), true)]);
    session.start(&mic, Mode::Full(Box::new(engine))).unwrap();
    mic.feed(1, 0.5);

    let outcome = stop(&mut session).await;
    assert_eq!(outcome.features.restart_count, 1);
    assert_eq!(outcome.features.word_accuracy, Some(100));
}

#[tokio::test]
async fn test_done_session_can_run_again() {
    let mic = FakeMic::new();
    let mut session = RecordingSession::new(
        Passage::new("the quick brown fox"),
        AnalysisConfig::default(),
        48000,
    );

    session.start(&mic, Mode::Fallback).unwrap();
    mic.feed(1, 0.5);
    stop(&mut session).await;
    assert_eq!(session.phase(), SessionPhase::Done);

    session.start(&mic, Mode::Fallback).unwrap();
    assert_eq!(session.phase(), SessionPhase::Recording);
    let outcome = stop(&mut session).await;
    assert_eq!(session.phase(), SessionPhase::Done);
    assert!(outcome.audio.is_some());
}

#[tokio::test]
async fn test_handle_tracks_words_while_recording() {
    let mic = FakeMic::new();
    let mut session = RecordingSession::new(
        Passage::new("the quick brown fox"),
        AnalysisConfig::default(),
        48000,
    );
    let handle = session.handle();

    let engine = ScriptedTranscriber::with_script([("the quick brown".to_string(), true)]);
    session.start(&mic, Mode::Full(Box::new(engine))).unwrap();
    mic.feed(1, 0.5);

    // The analyzer applies the event asynchronously; poll the handle.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while handle.word_count() < 3 {
        assert!(tokio::time::Instant::now() < deadline, "word count never updated");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(handle.word_count(), 3);

    stop(&mut session).await;
}
