//! `tp-sampler` - Temperature-scaled token selection for temperature-playground.
//!
//! This crate provides the pure, synchronous half of decoding:
//! - `build_distribution`: scores + temperature -> probability distribution
//! - `select_top_k`: the most probable candidates for visualization
//! - `choose_next`: greedy or stochastic choice of the next token
//! - `RandomSource` and a seeded implementation for reproducible draws

pub mod chooser;
pub mod distribution;
pub mod random;
pub mod temperature;
pub mod top_k;

pub use chooser::{choose_next, is_greedy, GREEDY_THRESHOLD};
pub use distribution::{build_distribution, ProbabilityDistribution};
pub use random::{RandomSource, SeededRandom};
pub use temperature::{clamp_temperature, MIN_TEMPERATURE};
pub use top_k::{rank_indices, select_top_k, Candidate};
