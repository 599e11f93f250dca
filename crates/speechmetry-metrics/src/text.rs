//! Word-level text metrics over a finished transcript. Everything here is
//! pure and synchronous; the session runs these once at stop time.

/// Disfluency markers counted as word-finding failures.
const FILLER_WORDS: [&str; 8] = ["uh", "um", "er", "hmm", "ah", "like", "you know", "basically"];

fn normalize_word(word: &str) -> String {
    word.to_lowercase()
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '\''))
        .collect()
}

/// Split on whitespace, lowercase, strip everything outside `[a-z']`, drop
/// empty tokens. Idempotent: tokenizing a joined token list is a no-op.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(normalize_word)
        .filter(|w| !w.is_empty())
        .collect()
}

/// Longest common subsequence length over word tokens, classic O(m*n)
/// dynamic programming with a two-row table.
pub fn lcs_len(a: &[String], b: &[String]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for word_a in a {
        for (j, word_b) in b.iter().enumerate() {
            curr[j + 1] = if word_a == word_b {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// How much of the passage's word order the transcript reproduced, 0..=100.
/// Tolerant of insertions and omissions, sensitive to transpositions.
/// An empty passage scores 100: there was nothing to miss.
pub fn word_accuracy(transcript: &str, passage: &str) -> u32 {
    let transcript_words = tokenize(transcript);
    let passage_words = tokenize(passage);
    if passage_words.is_empty() {
        return 100;
    }
    let lcs = lcs_len(&transcript_words, &passage_words);
    ((lcs as f64 / passage_words.len() as f64) * 100.0).round() as u32
}

pub fn count_fillers(transcript: &str) -> u32 {
    tokenize(transcript)
        .iter()
        .filter(|w| FILLER_WORDS.contains(&w.as_str()))
        .count() as u32
}

/// Adjacent identical tokens longer than 2 characters. The length guard
/// keeps short function words ("a a") from being penalized.
pub fn count_repetitions(transcript: &str) -> u32 {
    let words = tokenize(transcript);
    words
        .windows(2)
        .filter(|pair| pair[0] == pair[1] && pair[0].len() > 2)
        .count() as u32
}
