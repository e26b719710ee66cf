use crate::cancellation::CancellationToken;
use crate::params::DecodeParams;

/// Lifecycle of a decode session.
///
/// `Idle -> Running -> {Completed, Cancelled, Failed}`. The three outcomes
/// are terminal: a finished session is never resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl DecodeState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DecodeState::Completed | DecodeState::Cancelled | DecodeState::Failed
        )
    }
}

/// State of one generation request.
///
/// Owns the token sequence (prompt followed by generated ids). Only the
/// decode loop running this session mutates it, appending exactly one id per
/// successful step; nothing is ever removed, also not after a failure.
#[derive(Debug)]
pub struct DecodeSession {
    sequence: Vec<u32>,
    prompt_len: usize,
    params: DecodeParams,
    cancel: CancellationToken,
    state: DecodeState,
}

impl DecodeSession {
    pub fn new(prompt: Vec<u32>, params: DecodeParams, cancel: CancellationToken) -> Self {
        let prompt_len = prompt.len();
        Self {
            sequence: prompt,
            prompt_len,
            params,
            cancel,
            state: DecodeState::Idle,
        }
    }

    /// Prompt ids followed by every generated id so far.
    pub fn sequence(&self) -> &[u32] {
        &self.sequence
    }

    pub fn prompt_len(&self) -> usize {
        self.prompt_len
    }

    /// Generated ids only.
    pub fn generated(&self) -> &[u32] {
        &self.sequence[self.prompt_len..]
    }

    pub fn generated_count(&self) -> usize {
        self.sequence.len() - self.prompt_len
    }

    pub fn params(&self) -> &DecodeParams {
        &self.params
    }

    pub fn state(&self) -> DecodeState {
        self.state
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn set_state(&mut self, state: DecodeState) {
        self.state = state;
    }

    pub(crate) fn push(&mut self, token_id: u32) {
        self.sequence.push(token_id);
    }
}
