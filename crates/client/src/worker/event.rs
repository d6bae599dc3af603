//! Deferred completion for lifecycle steps.
//!
//! A lifecycle step (install, activate) is finished only once every
//! [`WorkToken`] handed out by its [`ExtendableEvent`] has been dropped.
//! A token that reports a failure makes the whole step fail.

use std::fmt;
use std::future::Future;

use tokio::sync::mpsc;

use paper_core::Error;

/// Which lifecycle step an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Install,
    Activate,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Install => f.write_str("install"),
            Step::Activate => f.write_str("activate"),
        }
    }
}

/// Keeps its lifecycle step open until dropped.
#[derive(Debug)]
pub struct WorkToken {
    failures: mpsc::UnboundedSender<Error>,
}

impl WorkToken {
    /// Release the token, failing the step with `err`.
    pub fn fail(self, err: Error) {
        let _ = self.failures.send(err);
    }
}

/// Handle passed to a lifecycle handler to extend the step's lifetime.
#[derive(Debug)]
pub struct ExtendableEvent {
    step: Step,
    failures: mpsc::UnboundedSender<Error>,
    settled: mpsc::UnboundedReceiver<Error>,
}

impl ExtendableEvent {
    pub fn new(step: Step) -> Self {
        let (failures, settled) = mpsc::unbounded_channel();
        Self { step, failures, settled }
    }

    /// Hand out a token; the step stays open while it lives.
    pub fn token(&self) -> WorkToken {
        WorkToken { failures: self.failures.clone() }
    }

    /// Keep the step open until `work` completes. An `Err` fails the step.
    pub fn wait_until<F>(&self, work: F)
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
    {
        let token = self.token();
        tokio::spawn(async move {
            if let Err(err) = work.await {
                token.fail(err);
            }
        });
    }

    /// Wait for every outstanding token, returning the first reported failure.
    pub async fn settle(self) -> Result<(), Error> {
        let Self { step, failures, mut settled } = self;
        drop(failures);

        let mut first = None;
        while let Some(err) = settled.recv().await {
            tracing::warn!(%step, error = %err, "lifecycle work failed");
            first.get_or_insert(err);
        }

        match first {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_settle_without_work() {
        let event = ExtendableEvent::new(Step::Install);
        assert!(event.settle().await.is_ok());
    }

    #[tokio::test]
    async fn test_settle_waits_for_wait_until() {
        let done = Arc::new(AtomicBool::new(false));
        let event = ExtendableEvent::new(Step::Activate);

        let flag = done.clone();
        event.wait_until(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        event.settle().await.unwrap();
        assert!(done.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_settle_waits_for_held_token() {
        let done = Arc::new(AtomicBool::new(false));
        let event = ExtendableEvent::new(Step::Install);
        let token = event.token();

        let flag = done.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            flag.store(true, Ordering::SeqCst);
            drop(token);
        });

        event.settle().await.unwrap();
        assert!(done.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_failed_work_fails_step() {
        let event = ExtendableEvent::new(Step::Install);
        event.wait_until(async { Ok(()) });
        event.wait_until(async { Err(Error::InvalidInput("boom".into())) });

        let result = event.settle().await;
        assert!(matches!(result, Err(Error::InvalidInput(msg)) if msg == "boom"));
    }
}
