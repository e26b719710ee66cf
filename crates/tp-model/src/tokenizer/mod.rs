pub mod vocab;

pub use vocab::Vocab;

/// Maps token ids back to display text.
///
/// The decoder resolves the text of every top-k candidate through this trait
/// and checks each chosen id against [`Tokenizer::eos_id`] to stop.
pub trait Tokenizer: Send + Sync {
    /// Display text of a single token.
    fn decode(&self, token_id: u32) -> crate::Result<String>;

    /// Returns the end-of-sequence token ID.
    fn eos_id(&self) -> u32;
}

impl<T: Tokenizer + ?Sized> Tokenizer for std::sync::Arc<T> {
    fn decode(&self, token_id: u32) -> crate::Result<String> {
        (**self).decode(token_id)
    }

    fn eos_id(&self) -> u32 {
        (**self).eos_id()
    }
}
