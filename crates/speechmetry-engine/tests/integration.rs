use speechmetry_core::AudioChunk;
use speechmetry_engine::{Transcriber, TranscriberRegistry, TranscriptReconciler};
use tokio::sync::mpsc;

fn chunk() -> AudioChunk {
    AudioChunk {
        samples: vec![0.0; 480],
        sample_rate: 48000,
        channels: 1,
    }
}

#[tokio::test]
async fn test_registry_engine_feeds_reconciler() {
    let registry = TranscriberRegistry::new();
    let mut engine = registry.create("scripted").unwrap();

    let config: toml::Value = toml::from_str(
        r#"
events = [
    { text = "the quick", final = false },
    { text = "the quick brown", final = true },
    { text = "fox jumps", final = true },
]
"#,
    )
    .unwrap();
    engine.initialize(config).await.unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    engine.set_event_sender(tx);

    for _ in 0..3 {
        engine.feed_audio(chunk()).await.unwrap();
    }
    engine.shutdown().await.unwrap();
    drop(engine);

    let mut reconciler = TranscriptReconciler::new();
    while let Some(mut event) = rx.recv().await {
        event.offset_secs = 1.0;
        reconciler.apply(&event);
    }

    assert_eq!(reconciler.final_transcript(), "the quick brown fox jumps");
    assert_eq!(reconciler.interim_text(), "");
    assert_eq!(reconciler.word_count(), 5);
    assert_eq!(reconciler.first_speech_offset(), Some(1.0));
}

#[tokio::test]
async fn test_unknown_engine_is_a_capability_gap_not_a_crash() {
    let registry = TranscriberRegistry::new();
    let result = registry.create("webspeech");
    assert!(result.is_err());
}
