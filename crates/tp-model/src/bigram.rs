use async_trait::async_trait;

use crate::architecture::ScoreModel;
use crate::error::{ModelError, Result};

/// A model whose next-token scores depend only on the previous token.
///
/// Scores come straight from a table: one row per previous token, plus a
/// `start` row for an empty sequence. Small enough to write by hand, which
/// makes it a good stand-in for a real network when watching how temperature
/// reshapes a distribution.
#[derive(Debug, Clone)]
pub struct BigramModel {
    start: Vec<f32>,
    transitions: Vec<Vec<f32>>,
}

impl BigramModel {
    /// Create a model from a start row and a square transition table.
    ///
    /// `transitions[prev][next]` is the score of `next` following `prev`.
    pub fn new(start: Vec<f32>, transitions: Vec<Vec<f32>>) -> Result<Self> {
        let vocab_size = start.len();
        if vocab_size == 0 {
            return Err(ModelError::InvalidConfig("empty score table".to_string()));
        }
        if transitions.len() != vocab_size {
            return Err(ModelError::InvalidConfig(format!(
                "expected {} transition rows, got {}",
                vocab_size,
                transitions.len()
            )));
        }
        if let Some((prev, row)) = transitions
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != vocab_size)
        {
            return Err(ModelError::InvalidConfig(format!(
                "transition row {} has {} scores, expected {}",
                prev,
                row.len(),
                vocab_size
            )));
        }

        Ok(Self { start, transitions })
    }

    /// Scores for the token following `sequence`.
    pub fn scores_after(&self, sequence: &[u32]) -> Result<&[f32]> {
        match sequence.last() {
            None => Ok(&self.start),
            Some(&prev) => self
                .transitions
                .get(prev as usize)
                .map(Vec::as_slice)
                .ok_or(ModelError::TokenOutOfRange {
                    id: prev,
                    vocab_size: self.start.len(),
                }),
        }
    }
}

#[async_trait]
impl ScoreModel for BigramModel {
    async fn forward(&self, sequence: &[u32]) -> Result<Vec<f32>> {
        self.scores_after(sequence).map(<[f32]>::to_vec)
    }

    fn vocab_size(&self) -> usize {
        self.start.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> BigramModel {
        BigramModel::new(
            vec![1.0, 0.0],
            vec![vec![0.5, 2.0], vec![3.0, -1.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_new_validates_shape() {
        assert!(BigramModel::new(Vec::new(), Vec::new()).is_err());
        assert!(BigramModel::new(vec![0.0, 0.0], vec![vec![0.0, 0.0]]).is_err());
        assert!(BigramModel::new(vec![0.0, 0.0], vec![vec![0.0, 0.0], vec![0.0]]).is_err());
    }

    #[tokio::test]
    async fn test_forward_uses_last_token() {
        let m = model();
        assert_eq!(m.vocab_size(), 2);
        assert_eq!(m.forward(&[]).await.unwrap(), vec![1.0, 0.0]);
        assert_eq!(m.forward(&[1, 0]).await.unwrap(), vec![0.5, 2.0]);
        assert_eq!(m.forward(&[0, 1]).await.unwrap(), vec![3.0, -1.0]);
    }

    #[tokio::test]
    async fn test_forward_unknown_token() {
        let err = model().forward(&[7]).await.unwrap_err();
        assert!(matches!(err, ModelError::TokenOutOfRange { id: 7, vocab_size: 2 }));
    }
}
