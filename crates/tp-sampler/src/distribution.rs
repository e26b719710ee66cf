use crate::temperature::clamp_temperature;

/// A probability distribution over the vocabulary, one entry per token id.
///
/// Entries are non-negative and sum to one (within floating-point
/// tolerance). A distribution is built once per decode step and never
/// mutated afterwards, so only read access is exposed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityDistribution {
    probs: Vec<f32>,
}

impl ProbabilityDistribution {
    /// Returns the probabilities, indexed by token id.
    pub fn as_slice(&self) -> &[f32] {
        &self.probs
    }

    /// Number of entries (the vocabulary size).
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    /// Returns true if the distribution has no entries.
    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Probability of the given token id, if it is in range.
    pub fn get(&self, index: usize) -> Option<f32> {
        self.probs.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.probs.iter().copied()
    }

    /// Index of the most probable entry. Ties resolve to the lowest index.
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &p) in self.probs.iter().enumerate() {
            match best {
                Some((_, best_p)) if p <= best_p => {}
                _ => best = Some((i, p)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Sum of all entries. Close to 1.0 for any non-empty distribution.
    pub fn total(&self) -> f64 {
        self.probs.iter().map(|&p| p as f64).sum()
    }
}

impl AsRef<[f32]> for ProbabilityDistribution {
    fn as_ref(&self) -> &[f32] {
        &self.probs
    }
}

/// Turn raw scores into a probability distribution at the given temperature.
///
/// Scores are divided by the clamped temperature, shifted so the largest is
/// zero, exponentiated and normalized. The shift only guards against
/// overflow; it does not change the result.
///
/// Degenerate inputs never fail:
/// - an empty score vector gives an empty distribution;
/// - NaN scores are treated like `-inf` and get probability zero;
/// - if no score is above `-inf` the result is uniform;
/// - if any score is `+inf` (also after scaling by a tiny temperature),
///   those entries share the whole mass equally.
pub fn build_distribution(scores: &[f32], temperature: f32) -> ProbabilityDistribution {
    if scores.is_empty() {
        return ProbabilityDistribution { probs: Vec::new() };
    }

    let temp = clamp_temperature(temperature);
    let scaled: Vec<f32> = scores
        .iter()
        .map(|&s| if s.is_nan() { f32::NEG_INFINITY } else { s / temp })
        .collect();

    let max = scaled.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    if max == f32::NEG_INFINITY {
        return uniform(scores.len());
    }
    if max == f32::INFINITY {
        let winners: Vec<bool> = scaled.iter().map(|&s| s == f32::INFINITY).collect();
        return share_equally(&winners);
    }

    let exps: Vec<f64> = scaled.iter().map(|&s| ((s - max) as f64).exp()).collect();
    // The max entry contributes exp(0) = 1, so the sum is at least one.
    let sum: f64 = exps.iter().sum();
    let probs = exps.iter().map(|&e| (e / sum) as f32).collect();

    ProbabilityDistribution { probs }
}

fn uniform(len: usize) -> ProbabilityDistribution {
    ProbabilityDistribution {
        probs: vec![1.0 / len as f32; len],
    }
}

fn share_equally(winners: &[bool]) -> ProbabilityDistribution {
    let count = winners.iter().filter(|&&w| w).count();
    let share = 1.0 / count as f32;
    ProbabilityDistribution {
        probs: winners
            .iter()
            .map(|&w| if w { share } else { 0.0 })
            .collect(),
    }
}
