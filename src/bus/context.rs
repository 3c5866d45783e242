// Sysbus Gateway - Call Context
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Cancellation and deadline propagation for bus calls.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{CancelReason, GatewayError, Result};

/// Per-request context carried into every gateway operation.
///
/// Cloning shares the cancellation token, so cancelling any clone cancels
/// all of them.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context with no deadline that is only cancelled explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().timeout(timeout)
    }

    /// Tighten the deadline to at most `timeout` from now.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        });
        self
    }

    /// A child context: cancelled with its parent, cancellable on its own.
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Run `fut` until it completes, the context is cancelled, or the
    /// deadline passes, whichever comes first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(GatewayError::Cancelled(CancelReason::Cancelled));
        }
        if matches!(self.deadline, Some(deadline) if deadline <= Instant::now()) {
            return Err(GatewayError::Cancelled(CancelReason::DeadlineExceeded));
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(GatewayError::Cancelled(CancelReason::DeadlineExceeded)),
                },
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(GatewayError::Cancelled(CancelReason::Cancelled)),
            result = bounded => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_passes_through_result() {
        let ctx = CallContext::new();
        let value = ctx.run(async { Ok(42) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_cancelled_context_fails_before_polling() {
        let ctx = CallContext::new();
        ctx.cancel();
        let polled = std::sync::atomic::AtomicBool::new(false);
        let result: Result<()> = ctx
            .run(async {
                polled.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            })
            .await;
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
        assert!(matches!(
            result,
            Err(GatewayError::Cancelled(CancelReason::Cancelled))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let ctx = CallContext::with_timeout(Duration::from_millis(50));
        let result: Result<()> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert!(matches!(
            result,
            Err(GatewayError::Cancelled(CancelReason::DeadlineExceeded))
        ));
    }

    #[tokio::test]
    async fn test_cancel_while_in_flight() {
        let ctx = CallContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });
        let result: Result<()> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .await;
        assert!(matches!(
            result,
            Err(GatewayError::Cancelled(CancelReason::Cancelled))
        ));
    }

    #[tokio::test]
    async fn test_child_follows_parent() {
        let parent = CallContext::new();
        let child = parent.child();
        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn test_timeout_only_tightens() {
        let ctx = CallContext::with_timeout(Duration::from_secs(1));
        let first = ctx.deadline().unwrap();
        let relaxed = ctx.timeout(Duration::from_secs(60));
        assert_eq!(relaxed.deadline(), Some(first));
    }
}
