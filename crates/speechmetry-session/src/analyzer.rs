use crate::handle::SessionHandle;
use speechmetry_audio::SilenceDetector;
use speechmetry_core::{AudioChunk, PauseStats, TranscriptEvent, TranscriptionError};
use speechmetry_engine::{Transcriber, TranscriptReconciler};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};

/// Upper bound on the retained audio payload (10 minutes at 48 kHz).
const MAX_RECORDED_SAMPLES: usize = 48_000 * 60 * 10;

/// Frozen producer state handed back when the analyzer stops.
#[derive(Debug)]
pub struct AnalysisSnapshot {
    pub pause_stats: PauseStats,
    pub final_transcript: String,
    pub first_speech_offset: Option<f64>,
    pub recorded: Vec<f32>,
    pub sample_rate: u32,
}

pub(crate) enum AnalyzerCommand {
    Stop {
        reply: oneshot::Sender<AnalysisSnapshot>,
    },
}

pub(crate) struct AnalyzerWorker {
    pub cmd_tx: mpsc::UnboundedSender<AnalyzerCommand>,
    pub fatal_rx: mpsc::UnboundedReceiver<String>,
    pub join: tokio::task::JoinHandle<()>,
}

/// Spawn the serialized analysis loop.
///
/// Audio ticks, transcript events and the wall-clock timer all land in one
/// `select!` so every handler runs atomically with respect to the others.
/// Per-event work stays short; the O(m*n) text metrics run only after stop,
/// outside this loop.
pub(crate) fn spawn(
    mut audio_rx: mpsc::UnboundedReceiver<AudioChunk>,
    engine: Option<Box<dyn Transcriber>>,
    mut event_rx: mpsc::UnboundedReceiver<TranscriptEvent>,
    mut detector: SilenceDetector,
    handle: SessionHandle,
    configured_sample_rate: u32,
) -> AnalyzerWorker {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<AnalyzerCommand>();
    let (fatal_tx, fatal_rx) = mpsc::unbounded_channel::<String>();

    let join = tokio::spawn(async move {
        let started = Instant::now();
        let mut reconciler = TranscriptReconciler::new();
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        let mut recorded: Vec<f32> = Vec::new();
        let mut sample_rate = configured_sample_rate;
        let mut engine_down = false;
        let mut audio_closed = false;
        let mut events_closed = false;

        loop {
            tokio::select! {
                biased;
                cmd = cmd_rx.recv() => {
                    // Everything that arrived before the stop still counts:
                    // drain queued audio, shut the engine down, then drain
                    // the events the engine emitted on the way out.
                    while let Ok(chunk) = audio_rx.try_recv() {
                        sample_rate = chunk.sample_rate;
                        detector.process(&chunk);
                        if let Some(ratio) = detector.ratio() {
                            handle.set_pause_ratio(ratio as f32);
                        }
                        if recorded.len() < MAX_RECORDED_SAMPLES {
                            recorded.extend_from_slice(&chunk.samples);
                        }
                        if let Some(ref engine) = engine {
                            if !engine_down {
                                match engine.feed_audio(chunk).await {
                                    Ok(()) => {}
                                    Err(TranscriptionError::AccessDenied(reason)) => {
                                        tracing::error!(
                                            "transcription access denied: {reason}"
                                        );
                                        let _ = fatal_tx.send(reason);
                                        engine_down = true;
                                    }
                                    Err(e) => {
                                        tracing::warn!("engine fault, transcript frozen: {e}");
                                        engine_down = true;
                                    }
                                }
                            }
                        }
                    }
                    if let Some(ref engine) = engine {
                        if let Err(e) = engine.shutdown().await {
                            tracing::warn!("engine shutdown failed: {e}");
                        }
                    }
                    while let Ok(mut event) = event_rx.try_recv() {
                        event.offset_secs = started.elapsed().as_secs_f64();
                        reconciler.apply(&event);
                        handle.set_word_count(reconciler.word_count());
                    }
                    match cmd {
                        Some(AnalyzerCommand::Stop { reply }) => {
                            let snapshot = AnalysisSnapshot {
                                pause_stats: detector.stats(),
                                final_transcript: reconciler.final_transcript().to_string(),
                                first_speech_offset: reconciler.first_speech_offset(),
                                recorded,
                                sample_rate,
                            };
                            let _ = reply.send(snapshot);
                        }
                        None => {
                            tracing::debug!("session dropped, analyzer shutting down");
                        }
                    }
                    break;
                }
                chunk = audio_rx.recv(), if !audio_closed => {
                    match chunk {
                        Some(chunk) => {
                            sample_rate = chunk.sample_rate;
                            detector.process(&chunk);
                            if let Some(ratio) = detector.ratio() {
                                handle.set_pause_ratio(ratio as f32);
                            }
                            if recorded.len() < MAX_RECORDED_SAMPLES {
                                recorded.extend_from_slice(&chunk.samples);
                            }
                            if let Some(ref engine) = engine {
                                if !engine_down {
                                    match engine.feed_audio(chunk).await {
                                        Ok(()) => {}
                                        Err(TranscriptionError::AccessDenied(reason)) => {
                                            tracing::error!(
                                                "transcription access denied: {reason}"
                                            );
                                            let _ = fatal_tx.send(reason);
                                            engine_down = true;
                                        }
                                        Err(e) => {
                                            // Transient fault: keep the transcript
                                            // accumulated so far, stop feeding.
                                            tracing::warn!("engine fault, transcript frozen: {e}");
                                            engine_down = true;
                                        }
                                    }
                                }
                            }
                        }
                        None => audio_closed = true,
                    }
                }
                event = event_rx.recv(), if !events_closed => {
                    match event {
                        Some(mut event) => {
                            event.offset_secs = started.elapsed().as_secs_f64();
                            reconciler.apply(&event);
                            handle.set_word_count(reconciler.word_count());
                        }
                        None => events_closed = true,
                    }
                }
                _ = ticker.tick() => {
                    handle.set_elapsed_secs(started.elapsed().as_secs());
                }
            }
        }
    });

    AnalyzerWorker {
        cmd_tx,
        fatal_rx,
        join,
    }
}
