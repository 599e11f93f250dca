pub mod capture;
pub mod device;
pub mod silence;

pub use capture::{AudioSource, CaptureNode, MicGuard, Microphone};
pub use device::DeviceManager;
pub use silence::{rms_amplitude, SilenceDetector};
