use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::FeatureQueryError;

/// Shared flag a caller flips to abandon an in-flight request
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Cancellation token and deadline handed to every feature query of a request
#[derive(Debug, Clone)]
pub struct RequestBudget {
    token: CancellationToken,
    started: Instant,
    timeout: Duration,
}

impl RequestBudget {
    pub fn new(token: CancellationToken, timeout: Duration) -> Self {
        Self {
            token,
            started: Instant::now(),
            timeout,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Time left before the deadline, `None` once it has passed
    pub fn remaining(&self) -> Option<Duration> {
        self.timeout.checked_sub(self.started.elapsed())
    }

    /// Fails with `Cancelled` or `TimedOut` when the request must stop.
    pub fn check(&self) -> Result<(), FeatureQueryError> {
        if self.token.is_cancelled() {
            return Err(FeatureQueryError::Cancelled);
        }
        match self.remaining() {
            Some(left) if !left.is_zero() => Ok(()),
            _ => Err(FeatureQueryError::TimedOut(self.timeout)),
        }
    }
}
