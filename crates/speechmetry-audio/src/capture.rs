use crate::device::DeviceManager;
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use speechmetry_core::{AudioChunk, AudioError};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

// ── CaptureNode ───────────────────────────────────────────────

/// A live cpal input stream. Each hardware buffer becomes one [`AudioChunk`]
/// on the tap channel (1024 frames at 48 kHz is roughly a 21 ms sampling
/// window). Dropping the node closes the stream.
pub struct CaptureNode {
    _stream: Stream,
    status: Arc<AtomicU8>,
}

impl CaptureNode {
    pub fn new(
        device: &Device,
        sample_rate: u32,
        channels: u16,
        buffer_size: u32,
        tap: mpsc::UnboundedSender<AudioChunk>,
    ) -> Result<Self, AudioError> {
        let config = StreamConfig {
            channels,
            sample_rate: SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Fixed(buffer_size),
        };

        let status = Arc::new(AtomicU8::new(0));
        let status_flag = Arc::clone(&status);

        let err_callback = move |err: cpal::StreamError| {
            tracing::error!("capture stream error: {}", err);
            status_flag.store(1, Ordering::Relaxed);
        };

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let chunk = AudioChunk {
                        samples: data.to_vec(),
                        sample_rate,
                        channels,
                    };
                    // Receiver gone means the session already stopped.
                    let _ = tap.send(chunk);
                },
                err_callback,
                None,
            )
            .map_err(|e| match e {
                cpal::BuildStreamError::DeviceNotAvailable => AudioError::PermissionDenied(
                    "input device not available (permission revoked or device in use)".to_string(),
                ),
                other => AudioError::StreamBuild(other.to_string()),
            })?;

        stream
            .play()
            .map_err(|e| AudioError::StreamError(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            status,
        })
    }

    pub fn is_healthy(&self) -> bool {
        self.status.load(Ordering::Relaxed) == 0
    }
}

// ── MicGuard ──────────────────────────────────────────────────

/// Scoped ownership of the microphone. The stream is released exactly once,
/// on whichever exit path comes first: stop, restart, an error, or drop.
pub struct MicGuard {
    node: Option<CaptureNode>,
    released: Arc<AtomicBool>,
}

impl MicGuard {
    fn new(node: Option<CaptureNode>) -> Self {
        Self {
            node,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A guard with no hardware behind it, for sources that feed the tap
    /// from somewhere other than a cpal stream.
    pub fn detached() -> Self {
        Self::new(None)
    }

    /// Shared flag observers can use to verify the release happened.
    pub fn released_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }

    pub fn is_healthy(&self) -> bool {
        self.node.as_ref().map_or(true, CaptureNode::is_healthy)
    }

    /// Close the stream now. Idempotent.
    pub fn release(&mut self) {
        if self.node.take().is_some() {
            tracing::debug!("microphone stream released");
        }
        self.released.store(true, Ordering::Relaxed);
    }
}

impl Drop for MicGuard {
    fn drop(&mut self) {
        self.release();
    }
}

// ── AudioSource ───────────────────────────────────────────────

/// The microphone collaborator seam: either yields a live guard whose
/// stream feeds `tap`, or fails with a permission/hardware error. Both
/// outcomes are handled explicitly by the session.
pub trait AudioSource {
    fn open(&self, tap: mpsc::UnboundedSender<AudioChunk>) -> Result<MicGuard, AudioError>;
}

/// The cpal-backed microphone.
pub struct Microphone {
    device_name: String,
    sample_rate: u32,
    channels: u16,
    buffer_size: u32,
}

impl Microphone {
    pub fn new(device_name: &str, sample_rate: u32, channels: u16, buffer_size: u32) -> Self {
        Self {
            device_name: device_name.to_string(),
            sample_rate,
            channels,
            buffer_size,
        }
    }
}

impl AudioSource for Microphone {
    fn open(&self, tap: mpsc::UnboundedSender<AudioChunk>) -> Result<MicGuard, AudioError> {
        let manager = DeviceManager::new();
        let device = manager.get_input_device(&self.device_name)?;
        let node = CaptureNode::new(
            &device,
            self.sample_rate,
            self.channels,
            self.buffer_size,
            tap,
        )?;
        tracing::info!(device = %self.device_name, "microphone stream opened");
        Ok(MicGuard::new(Some(node)))
    }
}
