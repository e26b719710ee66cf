use thiserror::Error;
use tp_model::ModelError;

use crate::session::DecodeState;
use crate::sink::SinkError;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("model failed: {0}")]
    Model(#[source] ModelError),
    #[error("tokenizer failed: {0}")]
    Tokenizer(#[source] ModelError),
    #[error("consumer failed: {0}")]
    Consumer(#[source] SinkError),
    #[error("model returned an empty score vector")]
    EmptyScores,
    #[error("session already {0:?}, sessions cannot be resumed")]
    SessionNotIdle(DecodeState),
    #[error("decode task aborted: {0}")]
    TaskAborted(String),
}

