pub mod features;
pub mod rate;
pub mod text;

pub use features::{assemble_fallback, assemble_full};
pub use rate::{segment_rates, speed_variability};
pub use text::{count_fillers, count_repetitions, lcs_len, tokenize, word_accuracy};
