use crate::entity::RawWord;
use crate::error::DomainError;

/// Policy for counting a word as successfully aligned.
#[derive(Debug, Clone)]
pub struct ScoringPolicy {
    /// When set, recognized unknown-token words do not count as aligned.
    pub check_unknown_token: bool,
    pub unknown_token: String,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            check_unknown_token: true,
            unknown_token: "<unk>".to_string(),
        }
    }
}

/// Ratio of successfully aligned words over the whole sequence, in [0, 1].
///
/// Operates on the raw engine output: reconciliation resolves every word,
/// so only the engine's own success flags carry signal. An empty sequence
/// has no defined ratio and is an explicit error, never a silent zero.
pub fn alignment_accuracy(words: &[RawWord], policy: &ScoringPolicy) -> Result<f64, DomainError> {
    if words.is_empty() {
        return Err(DomainError::EmptyAlignment);
    }
    let aligned = words
        .iter()
        .filter(|word| {
            let unknown = policy.check_unknown_token
                && word.aligned_text.as_deref() == Some(policy.unknown_token.as_str());
            word.case.is_success() && !unknown
        })
        .count();
    Ok(aligned as f64 / words.len() as f64)
}
