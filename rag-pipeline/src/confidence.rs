//! Confidence score from token log-probabilities.

/// Mean token probability scaled to `[0, 100]`.
///
/// Returns `None` for an empty list or a non-finite result.
pub fn estimate(logprobs: &[f64]) -> Option<f64> {
    if logprobs.is_empty() {
        return None;
    }
    let sum: f64 = logprobs.iter().map(|lp| lp.exp()).sum();
    let score = 100.0 * sum / logprobs.len() as f64;
    score.is_finite().then(|| score.clamp(0.0, 100.0))
}
