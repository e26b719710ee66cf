//! Stop signal shared between a running decode session and its owner.
//!
//! The session side only reads the flag, at step boundaries; the owner side
//! only sets it. Once set it stays set.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone)]
struct Flag(Arc<AtomicBool>);

impl Flag {
    fn new(raised: bool) -> Self {
        Flag(Arc::new(AtomicBool::new(raised)))
    }

    fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.is_raised() { "cancelled" } else { "live" })
    }
}

/// Read side, carried by a [`DecodeSession`](crate::DecodeSession).
#[derive(Clone, Debug)]
pub struct CancellationToken {
    flag: Flag,
}

impl CancellationToken {
    /// A fresh token plus the handle that cancels it.
    ///
    /// ```
    /// use tp_decode::CancellationToken;
    ///
    /// let (token, handle) = CancellationToken::new();
    /// assert!(!token.is_cancelled());
    /// handle.cancel();
    /// assert!(token.is_cancelled());
    /// ```
    pub fn new() -> (Self, CancellationHandle) {
        let flag = Flag::new(false);
        let handle = CancellationHandle { flag: flag.clone() };
        (CancellationToken { flag }, handle)
    }

    /// A token nobody can cancel.
    pub fn never() -> Self {
        CancellationToken {
            flag: Flag::new(false),
        }
    }

    /// Useful for runs that should stop before their first step.
    pub fn already_cancelled() -> Self {
        CancellationToken {
            flag: Flag::new(true),
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.is_raised()
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::never()
    }
}

/// Write side. Clones cancel the same sessions.
#[derive(Clone, Debug)]
pub struct CancellationHandle {
    flag: Flag,
}

impl CancellationHandle {
    /// Ask every session holding a matching token to stop. Idempotent.
    pub fn cancel(&self) {
        self.flag.raise();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.is_raised()
    }

    /// A further token tied to this handle.
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            flag: self.flag.clone(),
        }
    }
}
