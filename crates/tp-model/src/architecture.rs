use std::sync::Arc;

use async_trait::async_trait;

/// Trait for models that score every vocabulary entry as the next token.
///
/// Implementations are opaque to the decoder: it hands over the whole
/// sequence consumed so far and gets back raw scores (logits) for the next
/// position. No incremental state is assumed, so each call may recompute
/// from scratch.
///
/// Calls take `&self`. A model shared between concurrently running decode
/// sessions must make its own calls safe, e.g. by serializing them behind
/// an internal lock.
#[async_trait]
pub trait ScoreModel: Send + Sync {
    /// Score the next position after `sequence`.
    ///
    /// Returns one score per vocabulary entry.
    async fn forward(&self, sequence: &[u32]) -> crate::Result<Vec<f32>>;

    /// Returns the vocabulary size (number of output scores).
    fn vocab_size(&self) -> usize;
}

#[async_trait]
impl<M: ScoreModel + ?Sized> ScoreModel for Arc<M> {
    async fn forward(&self, sequence: &[u32]) -> crate::Result<Vec<f32>> {
        (**self).forward(sequence).await
    }

    fn vocab_size(&self) -> usize {
        (**self).vocab_size()
    }
}
