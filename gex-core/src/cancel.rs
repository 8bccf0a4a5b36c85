//! Cooperative cancellation for request-scoped operations

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{GexError, GexResult};

/// Cancellation flag shared between a request handler and the engine.
///
/// Clones observe the same flag. The engine checks the token at row-loop
/// boundaries; once cancelled, the current operation returns
/// [`GexError::Cancelled`] and any open transaction rolls back on drop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Return `Err(Cancelled)` once the token has been cancelled.
    pub fn check(&self) -> GexResult<()> {
        if self.is_cancelled() {
            Err(GexError::Cancelled)
        } else {
            Ok(())
        }
    }
}
