//! Cost estimation strategies.
//!
//! Estimates feed admission control only; they are not billing ground
//! truth. Swap the strategy via the builder's `.estimator()` without
//! touching queue logic.

/// Deterministic token cost estimate for a piece of text.
pub trait CostEstimator: Send + Sync {
    fn estimate(&self, text: &str) -> u64;
}

/// Script-weighted estimate: logographic characters weigh more than Latin
/// words.
///
/// Each CJK unified ideograph in U+4E00..=U+9FA5 costs `cjk_weight`; each
/// maximal run of ASCII letters costs `word_weight`. Everything else
/// (digits, punctuation, whitespace) is free.
///
/// ```rust
/// # use hermod::{CostEstimator, ScriptWeightedEstimator};
/// let est = ScriptWeightedEstimator::default();
/// assert_eq!(est.estimate("你好"), 4);
/// assert_eq!(est.estimate("hello world"), 2);
/// assert_eq!(est.estimate("你好 world!"), 5);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ScriptWeightedEstimator {
    pub cjk_weight: u64,
    pub word_weight: u64,
}

impl Default for ScriptWeightedEstimator {
    fn default() -> Self {
        Self {
            cjk_weight: 2,
            word_weight: 1,
        }
    }
}

impl CostEstimator for ScriptWeightedEstimator {
    fn estimate(&self, text: &str) -> u64 {
        let mut cjk = 0u64;
        let mut words = 0u64;
        let mut in_word = false;
        for c in text.chars() {
            if ('\u{4e00}'..='\u{9fa5}').contains(&c) {
                cjk += 1;
            }
            let letter = c.is_ascii_alphabetic();
            if letter && !in_word {
                words += 1;
            }
            in_word = letter;
        }
        cjk * self.cjk_weight + words * self.word_weight
    }
}
