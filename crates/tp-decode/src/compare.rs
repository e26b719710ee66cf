use tp_model::{ScoreModel, Tokenizer};

use crate::cancellation::CancellationToken;
use crate::engine::{DecodeOutcome, Decoder};
use crate::error::DecodeError;
use crate::params::DecodeParams;
use crate::session::DecodeSession;
use crate::sink::CollectSink;
use crate::token::GeneratedToken;

/// Result of one session in a temperature comparison.
#[derive(Debug)]
pub struct TemperatureRun {
    pub temperature: f32,
    pub tokens: Vec<GeneratedToken>,
    pub outcome: DecodeOutcome,
}

impl TemperatureRun {
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }
}

/// Decode the same prompt at several temperatures concurrently.
///
/// Every temperature gets its own session and task; the sessions share
/// nothing but the decoder's model and tokenizer. When `params.seed` is set,
/// run `i` uses `seed + i`, so a comparison is reproducible as a whole.
/// `cancel` stops all runs. Results come back in the order of `temperatures`.
pub async fn compare_temperatures<M, T>(
    decoder: &Decoder<M, T>,
    prompt: &[u32],
    params: &DecodeParams,
    temperatures: &[f32],
    cancel: CancellationToken,
) -> Vec<TemperatureRun>
where
    M: ScoreModel + ?Sized + 'static,
    T: Tokenizer + ?Sized + 'static,
{
    let handles: Vec<_> = temperatures
        .iter()
        .enumerate()
        .map(|(i, &temperature)| {
            let decoder = decoder.clone();
            let mut params = params.clone().with_temperature(temperature);
            params.seed = params.seed.map(|seed| seed.wrapping_add(i as u64));
            let mut session = DecodeSession::new(prompt.to_vec(), params, cancel.clone());

            tokio::spawn(async move {
                let mut sink = CollectSink::new();
                let outcome = decoder.run(&mut session, &mut sink).await;
                (sink.into_tokens(), outcome)
            })
        })
        .collect();

    let mut runs = Vec::with_capacity(handles.len());
    for (handle, &temperature) in handles.into_iter().zip(temperatures) {
        let run = match handle.await {
            Ok((tokens, outcome)) => TemperatureRun {
                temperature,
                tokens,
                outcome,
            },
            Err(e) => {
                tracing::warn!("Decode task at temperature {} aborted: {}", temperature, e);
                TemperatureRun {
                    temperature,
                    tokens: Vec::new(),
                    outcome: DecodeOutcome::Failed(DecodeError::TaskAborted(e.to_string())),
                }
            }
        };
        runs.push(run);
    }
    runs
}
