use serde::Serialize;
use tp_sampler::Candidate;

/// One decode step as shown to the consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedToken {
    /// Zero-based position among the generated tokens.
    pub step: usize,
    pub token_id: u32,
    pub text: String,
    /// Probability the chosen token had in this step's distribution.
    pub probability: f32,
    /// The most probable tokens of this step, best first.
    pub top_candidates: Vec<Candidate>,
}
