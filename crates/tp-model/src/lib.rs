pub mod architecture;
pub mod bigram;
pub mod error;
pub mod tokenizer;
pub mod toy;

pub use architecture::ScoreModel;
pub use bigram::BigramModel;
pub use error::{ModelError, Result};
pub use tokenizer::{Tokenizer, Vocab};
pub use toy::{ToyModelConfig, DEFAULT_SCORE};
