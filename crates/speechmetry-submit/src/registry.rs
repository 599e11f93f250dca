use crate::sink_trait::SubmissionSink;
use speechmetry_core::SubmitError;
use std::collections::HashMap;

pub struct SinkRegistry {
    factories: HashMap<String, fn() -> Box<dyn SubmissionSink>>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("file", || Box::new(crate::file_sink::FileSink::new()));
        registry.register("log", || Box::new(crate::log_sink::LogSink::new()));
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn SubmissionSink>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn SubmissionSink>, SubmitError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| SubmitError::NotFound(name.to_string()))
    }

    pub fn list_sinks(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}
