use crate::engine_trait::Transcriber;
use speechmetry_core::TranscriptionError;
use std::collections::HashMap;

pub struct TranscriberRegistry {
    factories: HashMap<String, fn() -> Box<dyn Transcriber>>,
}

impl TranscriberRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("scripted", || {
            Box::new(crate::scripted::ScriptedTranscriber::new())
        });
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn Transcriber>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn Transcriber>, TranscriptionError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| TranscriptionError::EngineNotFound(name.to_string()))
    }

    pub fn list_engines(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for TranscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}
