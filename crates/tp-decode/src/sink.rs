use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::error::DecodeError;
use crate::token::GeneratedToken;

/// Error a consumer may return from [`TokenSink::on_token`].
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Consumer of a decode session.
///
/// Receives every generated token in order, then at most one terminal
/// notification: `on_complete` or `on_failure`. A cancelled session ends
/// without either, since whoever cancelled it already knows.
///
/// The decoder awaits `on_token` before starting the next step, so a slow
/// consumer throttles generation.
#[async_trait]
pub trait TokenSink: Send {
    /// Deliver one token. An error terminates the session as failed.
    async fn on_token(&mut self, token: &GeneratedToken) -> Result<(), SinkError>;

    async fn on_complete(&mut self) {}

    async fn on_failure(&mut self, _error: &DecodeError) {}
}

/// How a session ended, as seen by a [`CollectSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum Terminal {
    Completed,
    Failed(String),
}

/// Keeps every delivered token and the terminal notification in memory.
#[derive(Debug, Default)]
pub struct CollectSink {
    tokens: Vec<GeneratedToken>,
    terminal: Option<Terminal>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[GeneratedToken] {
        &self.tokens
    }

    /// `None` until a terminal notification arrives, and forever after a
    /// cancellation.
    pub fn terminal(&self) -> Option<&Terminal> {
        self.terminal.as_ref()
    }

    /// Concatenated display text of all delivered tokens.
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    pub fn into_tokens(self) -> Vec<GeneratedToken> {
        self.tokens
    }
}

#[async_trait]
impl TokenSink for CollectSink {
    async fn on_token(&mut self, token: &GeneratedToken) -> Result<(), SinkError> {
        self.tokens.push(token.clone());
        Ok(())
    }

    async fn on_complete(&mut self) {
        self.terminal = Some(Terminal::Completed);
    }

    async fn on_failure(&mut self, error: &DecodeError) {
        self.terminal = Some(Terminal::Failed(error.to_string()));
    }
}

/// Everything a [`ChannelSink`] forwards.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeEvent {
    Token(GeneratedToken),
    Completed,
    Failed(String),
}

#[derive(Error, Debug)]
#[error("token receiver dropped")]
pub struct ReceiverDropped;

/// Forwards tokens over a bounded channel.
///
/// Each token send waits for free capacity, so the decoder runs at most
/// `capacity` tokens ahead of the receiver. Dropping the receiver fails the
/// session on its next token.
pub struct ChannelSink {
    tx: mpsc::Sender<DecodeEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiving end. A capacity of zero is raised to one.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<DecodeEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl TokenSink for ChannelSink {
    async fn on_token(&mut self, token: &GeneratedToken) -> Result<(), SinkError> {
        self.tx
            .send(DecodeEvent::Token(token.clone()))
            .await
            .map_err(|_| Box::new(ReceiverDropped) as SinkError)
    }

    async fn on_complete(&mut self) {
        if self.tx.send(DecodeEvent::Completed).await.is_err() {
            tracing::debug!("Completion not delivered, receiver dropped");
        }
    }

    async fn on_failure(&mut self, error: &DecodeError) {
        if self.tx.send(DecodeEvent::Failed(error.to_string())).await.is_err() {
            tracing::debug!("Failure not delivered, receiver dropped: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(step: usize) -> GeneratedToken {
        GeneratedToken {
            step,
            token_id: step as u32,
            text: format!("t{step}"),
            probability: 1.0,
            top_candidates: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_collect_sink_records_everything() {
        let mut sink = CollectSink::new();
        sink.on_token(&token(0)).await.unwrap();
        sink.on_token(&token(1)).await.unwrap();
        assert_eq!(sink.terminal(), None);

        sink.on_complete().await;
        assert_eq!(sink.text(), "t0t1");
        assert_eq!(sink.terminal(), Some(&Terminal::Completed));
    }

    #[tokio::test]
    async fn test_channel_sink_forwards_in_order() {
        let (mut sink, mut rx) = ChannelSink::bounded(4);
        sink.on_token(&token(0)).await.unwrap();
        sink.on_token(&token(1)).await.unwrap();
        sink.on_complete().await;

        assert_eq!(rx.recv().await, Some(DecodeEvent::Token(token(0))));
        assert_eq!(rx.recv().await, Some(DecodeEvent::Token(token(1))));
        assert_eq!(rx.recv().await, Some(DecodeEvent::Completed));
    }

    #[tokio::test]
    async fn test_channel_sink_fails_without_receiver() {
        let (mut sink, rx) = ChannelSink::bounded(1);
        drop(rx);
        let err = sink.on_token(&token(0)).await.unwrap_err();
        assert_eq!(err.to_string(), "token receiver dropped");
        // terminal notifications are best effort
        sink.on_complete().await;
    }
}
