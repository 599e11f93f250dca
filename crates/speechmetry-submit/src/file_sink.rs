use crate::payload::SubmissionPayload;
use crate::sink_trait::SubmissionSink;
use async_trait::async_trait;
use speechmetry_core::SubmitError;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Appends one JSON line per completed session.
pub struct FileSink {
    output_path: Mutex<Option<PathBuf>>,
    submit_count: AtomicUsize,
}

impl FileSink {
    pub fn new() -> Self {
        Self {
            output_path: Mutex::new(None),
            submit_count: AtomicUsize::new(0),
        }
    }

    pub fn submit_count(&self) -> usize {
        self.submit_count.load(Ordering::Relaxed)
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionSink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), SubmitError> {
        let path = config.get("path").and_then(|v| v.as_str()).ok_or_else(|| {
            SubmitError::InitializationFailed("missing 'path' in config".to_string())
        })?;
        *self.output_path.lock().unwrap() = Some(PathBuf::from(path));
        Ok(())
    }

    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError> {
        let guard = self.output_path.lock().unwrap();
        let path = guard
            .as_ref()
            .ok_or_else(|| SubmitError::SendFailed("not initialized".to_string()))?;

        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| SubmitError::SendFailed(e.to_string()))?;

        writeln!(file, "{}", payload.to_json()?)
            .map_err(|e| SubmitError::SendFailed(e.to_string()))?;

        self.submit_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        self.output_path.lock().unwrap().is_some()
    }

    async fn shutdown(&self) -> Result<(), SubmitError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speechmetry_core::{FeatureVector, TranscriptionMode};

    fn payload() -> SubmissionPayload {
        let fv = FeatureVector {
            wpm: 110,
            pause_ratio: 0.15,
            speed_deviation: 8,
            completion_ratio: 1.0,
            restart_count: 0,
            speech_start_delay: 0.8,
            word_accuracy: Some(100),
            filler_count: Some(0),
            repetition_count: Some(0),
        };
        SubmissionPayload::from_features(&fv, TranscriptionMode::Full, None).unwrap()
    }

    fn path_config(path: &std::path::Path) -> toml::Value {
        let mut t = toml::map::Map::new();
        t.insert(
            "path".to_string(),
            toml::Value::String(path.to_string_lossy().to_string()),
        );
        toml::Value::Table(t)
    }

    #[test]
    fn test_file_sink_name() {
        assert_eq!(FileSink::new().name(), "file");
    }

    #[test]
    fn test_file_sink_is_healthy_before_init() {
        assert!(!FileSink::new().is_healthy());
    }

    #[tokio::test]
    async fn test_file_sink_initialize_missing_path_fails() {
        let mut sink = FileSink::new();
        let result = sink.initialize(toml::Value::Table(Default::default())).await;
        match result {
            Err(SubmitError::InitializationFailed(msg)) => assert!(msg.contains("path")),
            _ => panic!("expected InitializationFailed"),
        }
    }

    #[tokio::test]
    async fn test_file_sink_submit_before_initialize_fails() {
        let sink = FileSink::new();
        match sink.submit(&payload()).await {
            Err(SubmitError::SendFailed(_)) => {}
            _ => panic!("expected SendFailed"),
        }
    }

    #[tokio::test]
    async fn test_file_sink_appends_json_lines() {
        let dir = std::env::temp_dir().join("speechmetry_file_sink_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sessions.jsonl");
        let _ = std::fs::remove_file(&path);

        let mut sink = FileSink::new();
        sink.initialize(path_config(&path)).await.unwrap();
        assert!(sink.is_healthy());

        sink.submit(&payload()).await.unwrap();
        sink.submit(&payload()).await.unwrap();
        assert_eq!(sink.submit_count(), 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(parsed["wpm"], 110);
            assert_eq!(parsed["speech_speed_variability"], 8);
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
