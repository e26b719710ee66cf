use std::cmp::Ordering;

use crate::distribution::ProbabilityDistribution;

/// One of the most probable next tokens at a decode step, ready for display.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    /// Vocabulary id.
    pub index: u32,
    /// Display text resolved through the tokenizer.
    pub text: String,
    pub probability: f32,
}

/// Descending probability, then ascending index.
fn rank_order(probs: &[f32], a: usize, b: usize) -> Ordering {
    probs[b].total_cmp(&probs[a]).then(a.cmp(&b))
}

/// Indices of the `k` most probable entries, best first.
///
/// Ties are broken by ascending index so the ranking is fully deterministic.
/// `k` larger than the distribution is clamped to its length.
pub fn rank_indices(dist: &ProbabilityDistribution, k: usize) -> Vec<usize> {
    let probs = dist.as_slice();
    let k = k.min(probs.len());
    if k == 0 {
        return Vec::new();
    }

    let mut indices: Vec<usize> = (0..probs.len()).collect();
    if k < indices.len() {
        // Partition so the first k slots hold the winners, then order just those.
        indices.select_nth_unstable_by(k - 1, |&a, &b| rank_order(probs, a, b));
        indices.truncate(k);
    }
    indices.sort_unstable_by(|&a, &b| rank_order(probs, a, b));
    indices
}

/// Select the `k` most probable tokens and resolve their display text.
///
/// `resolve` is called exactly once per returned candidate, in rank order.
/// The first resolver error aborts the selection and is returned as is.
pub fn select_top_k<F, E>(
    dist: &ProbabilityDistribution,
    k: usize,
    mut resolve: F,
) -> Result<Vec<Candidate>, E>
where
    F: FnMut(u32) -> Result<String, E>,
{
    rank_indices(dist, k)
        .into_iter()
        .map(|i| {
            let index = i as u32;
            Ok(Candidate {
                index,
                text: resolve(index)?,
                probability: dist.as_slice()[i],
            })
        })
        .collect()
}
