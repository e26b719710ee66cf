use crate::distribution::ProbabilityDistribution;
use crate::random::RandomSource;

/// Temperatures below this value decode greedily.
///
/// Greedy choice is an explicit branch, not a consequence of a very sharp
/// distribution: [`crate::MIN_TEMPERATURE`] keeps the distribution from ever
/// becoming exactly one-hot, so sampling alone would not be deterministic.
pub const GREEDY_THRESHOLD: f32 = 0.01;

/// Returns true if `temperature` selects greedy decoding.
pub fn is_greedy(temperature: f32) -> bool {
    // NaN fails the comparison and decodes greedily.
    !(temperature >= GREEDY_THRESHOLD)
}

/// Choose the next token id from a distribution.
///
/// Below [`GREEDY_THRESHOLD`] this returns the arg-max (lowest index among
/// ties) without consulting `rng`. Otherwise it draws once and returns the
/// first index whose running cumulative probability exceeds the draw. If
/// rounding leaves the total just under the draw, the last index with
/// non-zero probability is chosen, so masked tokens are never picked.
///
/// Returns `None` only for an empty distribution.
pub fn choose_next<R>(dist: &ProbabilityDistribution, temperature: f32, rng: &mut R) -> Option<usize>
where
    R: RandomSource + ?Sized,
{
    if dist.is_empty() {
        return None;
    }
    if is_greedy(temperature) {
        return dist.argmax();
    }

    let r = rng.draw();
    let mut cumulative = 0.0f32;
    for (i, p) in dist.iter().enumerate() {
        cumulative += p;
        if cumulative > r {
            return Some(i);
        }
    }

    dist.as_slice()
        .iter()
        .rposition(|&p| p > 0.0)
        .or(Some(dist.len() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::build_distribution;
    use crate::random::SeededRandom;

    const SCORES: [f32; 3] = [2.0, 1.0, 0.1];

    #[test]
    fn test_low_temperature_is_greedy() {
        let temperature = 0.0001;
        let dist = build_distribution(&SCORES, temperature);
        for draw in [0.0f32, 0.3, 0.999_999] {
            let mut source = || draw;
            assert_eq!(choose_next(&dist, temperature, &mut source), Some(0));
        }
    }

    #[test]
    fn test_greedy_never_draws() {
        let dist = build_distribution(&[0.1, 0.9], 1.0);
        let mut draws = 0;
        let mut source = || {
            draws += 1;
            0.0f32
        };
        assert_eq!(choose_next(&dist, 0.0, &mut source), Some(1));
        assert_eq!(choose_next(&dist, -2.0, &mut source), Some(1));
        assert_eq!(choose_next(&dist, f32::NAN, &mut source), Some(1));
        assert_eq!(draws, 0);
    }

    #[test]
    fn test_cumulative_walk() {
        let dist = build_distribution(&[0.0, 0.0, 0.0, 0.0], 1.0);
        // each entry holds 0.25
        let pick = |r: f32| choose_next(&dist, 1.0, &mut || r);
        assert_eq!(pick(0.0), Some(0));
        assert_eq!(pick(0.24), Some(0));
        assert_eq!(pick(0.26), Some(1));
        assert_eq!(pick(0.6), Some(2));
        assert_eq!(pick(0.9), Some(3));
    }

    /// Largest draw a `[0, 1)` source can produce.
    const TOP_DRAW: f32 = 0.999_999_94;

    #[test]
    fn test_rounding_falls_back_to_last_index() {
        let dist = build_distribution(&[0.0; 12], 1.0);
        // twelve f32 twelfths add up to just under the top draw
        assert!(dist.iter().sum::<f32>() <= TOP_DRAW);
        assert_eq!(choose_next(&dist, 1.0, &mut || TOP_DRAW), Some(11));
    }

    #[test]
    fn test_rounding_fallback_skips_masked_tail() {
        let mut scores = vec![0.0; 12];
        scores.push(f32::NEG_INFINITY);
        let dist = build_distribution(&scores, 1.0);
        assert_eq!(dist.get(12), Some(0.0));

        assert_eq!(choose_next(&dist, 1.0, &mut || TOP_DRAW), Some(11));
    }

    #[test]
    fn test_empty_distribution() {
        let dist = build_distribution(&[], 1.0);
        assert_eq!(choose_next(&dist, 1.0, &mut || 0.5f32), None);
    }

    #[test]
    fn test_sampling_fidelity() {
        let dist = build_distribution(&SCORES, 1.0);
        let mut rng = SeededRandom::new(1234);
        let mut counts = [0usize; 3];
        let n = 100_000;
        for _ in 0..n {
            let i = choose_next(&dist, 1.0, &mut rng).unwrap();
            counts[i] += 1;
        }
        for (i, &count) in counts.iter().enumerate() {
            let freq = count as f32 / n as f32;
            let p = dist.get(i).unwrap();
            assert!((freq - p).abs() < 0.01, "index {i}: {freq} vs {p}");
        }
    }
}
