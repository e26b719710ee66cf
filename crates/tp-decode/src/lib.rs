//! `tp-decode` - Step-by-step autoregressive decoding for temperature-playground.
//!
//! This crate provides:
//! - A [`Decoder`] that runs one [`DecodeSession`] token by token, reporting
//!   every step (chosen token plus its top candidates) to a [`TokenSink`]
//! - Cooperative cancellation via [`CancellationToken`] / [`CancellationHandle`]
//! - [`compare_temperatures`] for running the same prompt at several
//!   temperatures concurrently

pub mod cancellation;
pub mod compare;
pub mod engine;
pub mod error;
pub mod params;
pub mod session;
pub mod sink;
pub mod token;

pub use cancellation::{CancellationHandle, CancellationToken};
pub use compare::{compare_temperatures, TemperatureRun};
pub use engine::{DecodeOutcome, Decoder, StopReason};
pub use error::DecodeError;
pub use params::DecodeParams;
pub use session::{DecodeSession, DecodeState};
pub use sink::{ChannelSink, CollectSink, DecodeEvent, SinkError, Terminal, TokenSink};
pub use token::GeneratedToken;
