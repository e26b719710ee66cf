//! Temperature playground: decode a prompt with a toy model and print every
//! step's chosen token alongside its top candidates.

mod render;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tp_decode::{
    compare_temperatures, CancellationHandle, CancellationToken, ChannelSink, DecodeEvent,
    DecodeOutcome, DecodeParams, DecodeSession, Decoder,
};
use tp_model::{BigramModel, ToyModelConfig, Vocab};

#[derive(Parser)]
#[command(name = "tp-playground", about = "Watch temperature-controlled decoding step by step")]
struct Cli {
    /// Toy model JSON file. The built-in demo model is used when omitted
    #[arg(long)]
    model: Option<PathBuf>,

    /// Prompt text, encoded with the model's vocabulary
    #[arg(long, default_value = "")]
    prompt: String,

    /// Sampling temperature. Repeat to compare several temperatures side by side
    #[arg(short, long = "temperature", default_values_t = [1.0])]
    temperatures: Vec<f32>,

    /// Maximum number of tokens to generate
    #[arg(long, default_value = "32")]
    max_tokens: usize,

    /// Number of candidates shown per step
    #[arg(long, default_value = "5")]
    top_k: usize,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Print one JSON object per token instead of a table
    #[arg(long)]
    json: bool,

    /// Cancel generation after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.model {
        Some(path) => ToyModelConfig::load(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?,
        None => ToyModelConfig::demo(),
    };
    let (model, vocab) = config.build().context("Invalid toy model")?;
    let prompt = vocab
        .encode(&cli.prompt)
        .with_context(|| format!("Cannot encode prompt {:?}", cli.prompt))?;
    info!("Vocabulary of {} tokens, prompt is {} tokens", vocab.len(), prompt.len());

    let decoder = Decoder::new(Arc::new(model), Arc::new(vocab));
    let mut params = DecodeParams::default()
        .with_max_tokens(cli.max_tokens)
        .with_top_k(cli.top_k);
    params.seed = cli.seed;

    let (token, handle) = CancellationToken::new();
    spawn_cancellers(handle, cli.timeout_ms);

    match cli.temperatures.as_slice() {
        [temperature] => {
            let params = params.with_temperature(*temperature);
            run_single(&decoder, prompt, params, token, cli.json).await
        }
        temperatures => run_comparison(&decoder, &prompt, &params, temperatures, token, cli.json).await,
    }
}

fn spawn_cancellers(handle: CancellationHandle, timeout_ms: Option<u64>) {
    if let Some(ms) = timeout_ms {
        let handle = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            info!("Timeout of {} ms reached, cancelling", ms);
            handle.cancel();
        });
    }
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling");
            handle.cancel();
        }
    });
}

async fn run_single(
    decoder: &Decoder<BigramModel, Vocab>,
    prompt: Vec<u32>,
    params: DecodeParams,
    cancel: CancellationToken,
    json: bool,
) -> anyhow::Result<()> {
    let temperature = params.temperature;
    let mut session = DecodeSession::new(prompt, params, cancel);
    let (mut sink, mut rx) = ChannelSink::bounded(1);

    let worker = decoder.clone();
    let task = tokio::spawn(async move { worker.run(&mut session, &mut sink).await });

    if !json {
        println!("{}", render::header(temperature));
    }
    while let Some(event) = rx.recv().await {
        match event {
            DecodeEvent::Token(token) if json => println!("{}", serde_json::to_string(&token)?),
            DecodeEvent::Token(token) => println!("{}", render::step_line(&token)),
            DecodeEvent::Completed | DecodeEvent::Failed(_) => {}
        }
    }

    let outcome = task.await.context("Decode task panicked")?;
    finish(&outcome, json)
}

async fn run_comparison(
    decoder: &Decoder<BigramModel, Vocab>,
    prompt: &[u32],
    params: &DecodeParams,
    temperatures: &[f32],
    cancel: CancellationToken,
    json: bool,
) -> anyhow::Result<()> {
    let runs = compare_temperatures(decoder, prompt, params, temperatures, cancel).await;

    let mut failures = 0;
    for run in &runs {
        if json {
            for token in &run.tokens {
                let line = serde_json::json!({ "temperature": run.temperature, "token": token });
                println!("{}", line);
            }
        } else {
            println!("{}", render::header(run.temperature));
            for token in &run.tokens {
                println!("{}", render::step_line(token));
            }
            println!("{}", render::outcome_line(&run.outcome));
            println!("   {:?}", run.text());
        }
        if let DecodeOutcome::Failed(error) = &run.outcome {
            warn!("Run at temperature {} failed: {}", run.temperature, error);
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{} of {} runs failed", failures, runs.len());
    }
    Ok(())
}

fn finish(outcome: &DecodeOutcome, json: bool) -> anyhow::Result<()> {
    if !json {
        println!("{}", render::outcome_line(outcome));
    }
    match outcome {
        DecodeOutcome::Failed(error) => bail!("Generation failed: {}", error),
        _ => Ok(()),
    }
}
