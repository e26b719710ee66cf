use std::sync::Arc;

use tp_model::{ScoreModel, Tokenizer};
use tp_sampler::{build_distribution, choose_next, select_top_k, RandomSource, SeededRandom};
use tracing::{debug, info, warn};

use crate::error::DecodeError;
use crate::session::{DecodeSession, DecodeState};
use crate::sink::TokenSink;
use crate::token::GeneratedToken;

/// Why a session completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The tokenizer's end-of-sequence token was chosen (and delivered).
    EndOfSequence,
    /// `max_tokens` tokens were generated.
    MaxTokens,
}

/// Terminal result of [`Decoder::run`].
#[derive(Debug)]
pub enum DecodeOutcome {
    Completed { generated: usize, reason: StopReason },
    Cancelled { generated: usize },
    Failed(DecodeError),
}

impl DecodeOutcome {
    /// The terminal session state this outcome corresponds to.
    pub fn state(&self) -> DecodeState {
        match self {
            DecodeOutcome::Completed { .. } => DecodeState::Completed,
            DecodeOutcome::Cancelled { .. } => DecodeState::Cancelled,
            DecodeOutcome::Failed(_) => DecodeState::Failed,
        }
    }
}

enum LoopExit {
    Finished(StopReason),
    Cancelled,
}

/// Drives autoregressive decoding one token at a time.
///
/// Every step asks the model for scores over the whole sequence so far,
/// turns them into a distribution at the session's temperature, ranks the
/// top candidates for display, picks the next token and hands the result to
/// a [`TokenSink`] before appending it.
///
/// The decoder itself holds no per-session state, so one decoder (and the
/// model behind it) can serve several sessions at once.
pub struct Decoder<M: ?Sized, T: ?Sized> {
    model: Arc<M>,
    tokenizer: Arc<T>,
}

impl<M: ?Sized, T: ?Sized> Clone for Decoder<M, T> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            tokenizer: self.tokenizer.clone(),
        }
    }
}

impl<M, T> Decoder<M, T>
where
    M: ScoreModel + ?Sized,
    T: Tokenizer + ?Sized,
{
    pub fn new(model: Arc<M>, tokenizer: Arc<T>) -> Self {
        Self { model, tokenizer }
    }

    pub fn model(&self) -> &Arc<M> {
        &self.model
    }

    pub fn tokenizer(&self) -> &Arc<T> {
        &self.tokenizer
    }

    /// Run a session to its end, drawing from a source seeded with
    /// `params.seed` (or from the operating system when unset).
    pub async fn run<S>(&self, session: &mut DecodeSession, sink: &mut S) -> DecodeOutcome
    where
        S: TokenSink + ?Sized,
    {
        let mut rng = match session.params().seed {
            Some(seed) => SeededRandom::new(seed),
            None => SeededRandom::from_entropy(),
        };
        self.run_with_rng(session, &mut rng, sink).await
    }

    /// Run a session to its end with an explicit random source.
    ///
    /// Given the same scores from the model and the same draws, the produced
    /// tokens are identical. The sink gets `on_complete` or `on_failure`
    /// exactly once, or nothing at all if the session is cancelled.
    pub async fn run_with_rng<R, S>(
        &self,
        session: &mut DecodeSession,
        rng: &mut R,
        sink: &mut S,
    ) -> DecodeOutcome
    where
        R: RandomSource + Send + ?Sized,
        S: TokenSink + ?Sized,
    {
        if session.state() != DecodeState::Idle {
            let error = DecodeError::SessionNotIdle(session.state());
            sink.on_failure(&error).await;
            return DecodeOutcome::Failed(error);
        }

        session.set_state(DecodeState::Running);
        debug!(
            "Decoding from {} prompt tokens at temperature {}",
            session.prompt_len(),
            session.params().temperature
        );

        let exit = self.decode(session, rng, sink).await;
        let generated = session.generated_count();

        match exit {
            Ok(LoopExit::Finished(reason)) => {
                session.set_state(DecodeState::Completed);
                info!("Generation complete after {} tokens ({:?})", generated, reason);
                sink.on_complete().await;
                DecodeOutcome::Completed { generated, reason }
            }
            Ok(LoopExit::Cancelled) => {
                session.set_state(DecodeState::Cancelled);
                debug!("Generation cancelled after {} tokens", generated);
                DecodeOutcome::Cancelled { generated }
            }
            Err(error) => {
                session.set_state(DecodeState::Failed);
                warn!("Generation failed after {} tokens: {}", generated, error);
                sink.on_failure(&error).await;
                DecodeOutcome::Failed(error)
            }
        }
    }

    async fn decode<R, S>(
        &self,
        session: &mut DecodeSession,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<LoopExit, DecodeError>
    where
        R: RandomSource + Send + ?Sized,
        S: TokenSink + ?Sized,
    {
        let temperature = session.params().temperature;
        let top_k = session.params().top_k;
        let max_tokens = session.params().max_tokens;
        let eos_id = self.tokenizer.eos_id();

        loop {
            if session.is_cancelled() {
                return Ok(LoopExit::Cancelled);
            }
            if session.generated_count() >= max_tokens {
                return Ok(LoopExit::Finished(StopReason::MaxTokens));
            }

            let scores = self
                .model
                .forward(session.sequence())
                .await
                .map_err(DecodeError::Model)?;

            // A call that was in flight when cancel arrived still finishes,
            // but its scores are dropped.
            if session.is_cancelled() {
                debug!("Discarding scores computed after cancellation");
                return Ok(LoopExit::Cancelled);
            }
            if scores.is_empty() {
                return Err(DecodeError::EmptyScores);
            }

            let dist = build_distribution(&scores, temperature);
            let top_candidates = select_top_k(&dist, top_k, |id| self.tokenizer.decode(id))
                .map_err(DecodeError::Tokenizer)?;
            let index = choose_next(&dist, temperature, rng).ok_or(DecodeError::EmptyScores)?;

            let token_id = index as u32;
            let text = match top_candidates.iter().find(|c| c.index == token_id) {
                Some(candidate) => candidate.text.clone(),
                None => self
                    .tokenizer
                    .decode(token_id)
                    .map_err(DecodeError::Tokenizer)?,
            };
            let token = GeneratedToken {
                step: session.generated_count(),
                token_id,
                text,
                probability: dist.get(index).unwrap_or(0.0),
                top_candidates,
            };
            debug!(
                "Step {}: chose {} {:?} (p = {:.4})",
                token.step, token.token_id, token.text, token.probability
            );

            sink.on_token(&token).await.map_err(DecodeError::Consumer)?;
            session.push(token_id);

            if token_id == eos_id {
                return Ok(LoopExit::Finished(StopReason::EndOfSequence));
            }
            if session.generated_count() >= max_tokens {
                return Ok(LoopExit::Finished(StopReason::MaxTokens));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationToken;
    use crate::params::DecodeParams;
    use crate::sink::{CollectSink, Terminal};
    use tp_model::ToyModelConfig;

    fn demo_decoder() -> Decoder<tp_model::BigramModel, tp_model::Vocab> {
        let (model, vocab) = ToyModelConfig::demo().build().unwrap();
        Decoder::new(Arc::new(model), Arc::new(vocab))
    }

    #[tokio::test]
    async fn test_greedy_demo_sentence() {
        let decoder = demo_decoder();
        let params = DecodeParams::default().with_temperature(0.0).with_top_k(3);
        let mut session = DecodeSession::new(Vec::new(), params, CancellationToken::never());
        let mut sink = CollectSink::new();

        let outcome = decoder.run(&mut session, &mut sink).await;

        assert!(matches!(
            outcome,
            DecodeOutcome::Completed { reason: StopReason::EndOfSequence, .. }
        ));
        assert_eq!(sink.text(), "The cat sat on the mat.<eos>");
        assert_eq!(sink.terminal(), Some(&Terminal::Completed));
        assert_eq!(session.state(), DecodeState::Completed);
        assert!(sink.tokens().iter().all(|t| t.top_candidates.len() == 3));
        assert_eq!(sink.tokens()[1].top_candidates[0].text, " cat");
    }

    #[tokio::test]
    async fn test_chosen_token_matches_candidate_probability() {
        let decoder = demo_decoder();
        let params = DecodeParams::default().with_temperature(1.5).with_seed(3);
        let mut session = DecodeSession::new(Vec::new(), params, CancellationToken::never());
        let mut sink = CollectSink::new();

        decoder.run(&mut session, &mut sink).await;

        for token in sink.tokens() {
            if let Some(c) = token.top_candidates.iter().find(|c| c.index == token.token_id) {
                assert_eq!(c.probability, token.probability);
                assert_eq!(c.text, token.text);
            }
        }
        assert_eq!(session.generated().len(), sink.tokens().len());
    }

    #[tokio::test]
    async fn test_same_seed_same_tokens() {
        let decoder = demo_decoder();
        let mut runs = Vec::new();
        for _ in 0..2 {
            let params = DecodeParams::default().with_temperature(2.0).with_seed(99);
            let mut session = DecodeSession::new(Vec::new(), params, CancellationToken::never());
            decoder.run(&mut session, &mut CollectSink::new()).await;
            runs.push(session.generated().to_vec());
        }
        assert_eq!(runs[0], runs[1]);
    }

    #[tokio::test]
    async fn test_zero_max_tokens_completes_immediately() {
        let decoder = demo_decoder();
        let params = DecodeParams::default().with_max_tokens(0);
        let mut session = DecodeSession::new(vec![1], params, CancellationToken::never());
        let mut sink = CollectSink::new();

        let outcome = decoder.run(&mut session, &mut sink).await;

        assert!(matches!(
            outcome,
            DecodeOutcome::Completed { generated: 0, reason: StopReason::MaxTokens }
        ));
        assert_eq!(sink.terminal(), Some(&Terminal::Completed));
    }

    #[tokio::test]
    async fn test_session_cannot_be_resumed() {
        let decoder = demo_decoder();
        let params = DecodeParams::default().with_max_tokens(2).with_seed(1);
        let mut session = DecodeSession::new(Vec::new(), params, CancellationToken::never());
        decoder.run(&mut session, &mut CollectSink::new()).await;
        let sequence = session.sequence().to_vec();

        let mut sink = CollectSink::new();
        let outcome = decoder.run(&mut session, &mut sink).await;

        assert!(matches!(
            outcome,
            DecodeOutcome::Failed(DecodeError::SessionNotIdle(DecodeState::Completed))
        ));
        assert_eq!(outcome.state(), DecodeState::Failed);
        assert!(sink.tokens().is_empty());
        assert_eq!(session.sequence(), sequence.as_slice());
        assert_eq!(session.state(), DecodeState::Completed);
    }
}
