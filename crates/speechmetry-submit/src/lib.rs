pub mod file_sink;
pub mod log_sink;
pub mod payload;
pub mod registry;
pub mod sink_trait;

pub use file_sink::FileSink;
pub use log_sink::LogSink;
pub use payload::SubmissionPayload;
pub use registry::SinkRegistry;
pub use sink_trait::SubmissionSink;
