mod analyzer;
pub mod handle;
pub mod session;

pub use analyzer::AnalysisSnapshot;
pub use handle::SessionHandle;
pub use session::{Mode, RecordingSession, SessionOutcome};
