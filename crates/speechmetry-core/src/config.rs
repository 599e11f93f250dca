use crate::error::ConfigError;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// Reference passages shipped with the application. Custom passages from the
/// config file are appended to these, matching the original screening set.
pub const BUILTIN_PASSAGES: [&str; 6] = [
    "The sun rises slowly over the mountains each morning, casting golden light across the valley. Birds begin their song as the world awakens. The river flows steadily, carrying the day forward with quiet patience and grace.",
    "A gentle breeze moved through the tall grass near the old farmhouse. Children laughed as they chased butterflies across the meadow. The afternoon light was warm and golden, and everything felt peaceful and unhurried.",
    "The library was quiet except for the soft turning of pages. Dust floated in the beams of sunlight that came through the tall windows. She had been reading for hours and still did not want to stop.",
    "Every morning he walked the same path along the river. He noticed the small changes, a new bird, a fallen branch, the way the water moved after rain. These details gave his days a steady rhythm.",
    "The old clock on the wall ticked slowly through the evening. Outside, rain fell against the windows in steady waves. She wrapped a blanket around herself and watched the fire burn low in the hearth.",
    "Spring arrived quietly that year, with cool mornings and longer afternoons. The garden began to fill with color, yellow, white, and soft purple blooms. The air smelled of earth and something new beginning.",
];

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub passages: PassagesConfig,

    /// Absent section means no transcription capability: the whole session
    /// runs in fallback mode.
    #[serde(default)]
    pub transcription: Option<TranscriptionConfig>,

    #[serde(default)]
    pub submission: Option<SubmissionConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_buffer_size")]
    pub buffer_size: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CaptureConfig {
    #[serde(default = "default_device_name")]
    pub device_name: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
        }
    }
}

/// Every tunable of the feature derivation. The blended pause-ratio
/// coefficients are heuristics, not derived constants, so they live here
/// rather than in code.
#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// RMS amplitude (scaled x100) below which a frame counts as silence.
    #[serde(default = "default_silence_threshold")]
    pub silence_threshold: f64,

    /// Floor divisor for rate computations, guards against accidental taps.
    #[serde(default = "default_min_session_secs")]
    pub min_session_secs: f64,

    /// Pause ratio reported when no audio frames were ever classified.
    #[serde(default = "default_pause_ratio")]
    pub default_pause_ratio: f64,

    /// Start delay reported when no speech event was ever observed.
    #[serde(default = "default_start_delay")]
    pub default_start_delay: f64,

    /// Empirical average time to read a passage in full, used by the
    /// fallback completion estimate.
    #[serde(default = "default_average_read_secs")]
    pub average_read_secs: f64,

    #[serde(default = "default_filler_penalty")]
    pub filler_penalty: f64,

    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f64,

    #[serde(default = "default_pause_ratio_cap")]
    pub pause_ratio_cap: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            silence_threshold: default_silence_threshold(),
            min_session_secs: default_min_session_secs(),
            default_pause_ratio: default_pause_ratio(),
            default_start_delay: default_start_delay(),
            average_read_secs: default_average_read_secs(),
            filler_penalty: default_filler_penalty(),
            repetition_penalty: default_repetition_penalty(),
            pause_ratio_cap: default_pause_ratio_cap(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PassagesConfig {
    /// Include the built-in passage set. Custom entries are appended.
    #[serde(default = "default_true")]
    pub builtin: bool,

    #[serde(default)]
    pub extra: Vec<String>,

    /// Optional newline-separated passage file.
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for PassagesConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            extra: Vec::new(),
            file: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranscriptionConfig {
    pub engine: String,

    #[serde(default)]
    pub scripted: Option<toml::Value>,
}

impl TranscriptionConfig {
    /// Engine-specific configuration table for the named engine.
    pub fn engine_config(&self) -> toml::Value {
        match self.engine.as_str() {
            "scripted" => self
                .scripted
                .clone()
                .unwrap_or_else(|| toml::Value::Table(Default::default())),
            _ => toml::Value::Table(Default::default()),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubmissionConfig {
    pub sink: String,

    #[serde(flatten)]
    pub extra: toml::Value,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_buffer_size() -> u32 {
    1024
}

fn default_device_name() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_silence_threshold() -> f64 {
    8.0
}

fn default_min_session_secs() -> f64 {
    5.0
}

fn default_pause_ratio() -> f64 {
    0.15
}

fn default_start_delay() -> f64 {
    0.8
}

fn default_average_read_secs() -> f64 {
    35.0
}

fn default_filler_penalty() -> f64 {
    0.02
}

fn default_repetition_penalty() -> f64 {
    0.015
}

fn default_pause_ratio_cap() -> f64 {
    0.95
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();
    let mut result = input.to_string();
    let mut errors = Vec::new();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(val) => {
                result = result.replace(&cap[0], &val);
            }
            Err(_) => {
                errors.push(var_name.to_string());
            }
        }
    }

    if let Some(first_missing) = errors.into_iter().next() {
        return Err(ConfigError::EnvVarNotFound(first_missing));
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let interpolated = interpolate_env_vars(&content)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string (for testing).
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }

    /// The ordered pool of candidate passages: built-ins, then config
    /// extras, then the lines of the optional passage file.
    pub fn passage_pool(&self) -> Result<Vec<String>, ConfigError> {
        let mut pool = Vec::new();
        if self.passages.builtin {
            pool.extend(BUILTIN_PASSAGES.iter().map(|p| p.to_string()));
        }
        pool.extend(self.passages.extra.iter().cloned());
        if let Some(ref file) = self.passages.file {
            let content = std::fs::read_to_string(file)?;
            pool.extend(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(String::from),
            );
        }
        if pool.is_empty() {
            return Err(ConfigError::NoPassages);
        }
        Ok(pool)
    }
}
