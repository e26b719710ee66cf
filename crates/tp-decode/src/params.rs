/// Parameters controlling one decode session.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeParams {
    /// Stop after this many generated tokens.
    pub max_tokens: usize,
    /// Stored as given; zero and negative values are floored when scores are
    /// scaled and select greedy choice below `tp_sampler::GREEDY_THRESHOLD`.
    pub temperature: f32,
    /// Number of candidates reported with every generated token.
    pub top_k: usize,
    /// Seed for reproducible draws. `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            max_tokens: 32,
            temperature: 1.0,
            top_k: 5,
            seed: None,
        }
    }
}

impl DecodeParams {
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
