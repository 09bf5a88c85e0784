//! Force-shutdown race and terminal dispositions.
//!
//! The race runs alongside the orchestrator's drain sequence and guarantees
//! the process can never hang indefinitely: a second signal or the global
//! deadline wins the race and forces an abnormal exit, while graceful
//! completion cancels the race cleanly.

use std::time::Duration;

use tokio::sync::broadcast;

use crate::lifecycle::signals::SignalMonitor;

/// Exit code for a shutdown interrupted by a second signal.
// Uncommon values, easy to tell apart from shell exit codes in supervisor logs.
pub const INTERRUPT_EXIT_CODE: i32 = 13;

/// Exit code for a shutdown that exceeded the global deadline.
pub const TIMEOUT_EXIT_CODE: i32 = 18;

/// Terminal outcome of a shutdown sequence. Decided exactly once, by
/// whichever of the race and the normal drain path finishes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Both fan-outs finished within the global deadline.
    Graceful,
    /// A second termination signal arrived mid-drain.
    Forced,
    /// The drain exceeded the global shutdown deadline.
    TimedOut,
}

impl Disposition {
    /// Process exit code for this outcome. Graceful is 0 by convention;
    /// the caller may substitute its own success code.
    pub fn exit_code(self) -> i32 {
        match self {
            Disposition::Graceful => 0,
            Disposition::Forced => INTERRUPT_EXIT_CODE,
            Disposition::TimedOut => TIMEOUT_EXIT_CODE,
        }
    }
}

/// Completion trigger for the force-shutdown race.
///
/// A broadcast channel the drain sequence fires once both fan-outs have
/// returned, telling the race to stand down.
pub struct Completion {
    tx: broadcast::Sender<()>,
}

impl Completion {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the completion event.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the completion event.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

/// Race "second signal", "global deadline elapsed", and "drain completed".
/// First event wins; the others are abandoned.
///
/// Consumes the signal monitor: the orchestrator has already taken the first
/// signal, so the next delivery observed here is the second.
pub async fn race(
    mut signals: SignalMonitor,
    shutdown_deadline: Duration,
    mut completion: broadcast::Receiver<()>,
) -> Disposition {
    let second_signal = async {
        match signals.recv().await {
            Some(name) => name,
            // Signal source gone; this arm can no longer fire.
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        name = second_signal => {
            tracing::warn!(signal = name, "second signal received, forcing shutdown");
            Disposition::Forced
        }
        _ = tokio::time::sleep(shutdown_deadline) => {
            tracing::warn!(
                deadline_ms = shutdown_deadline.as_millis() as u64,
                "shutdown deadline exceeded, forcing exit"
            );
            Disposition::TimedOut
        }
        _ = completion.recv() => {
            tracing::info!("shutdown completed before the deadline");
            Disposition::Graceful
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completion_wins() {
        let (_tx, signals) = SignalMonitor::channel();
        let completion = Completion::new();
        let rx = completion.subscribe();

        let handle = tokio::spawn(race(signals, Duration::from_secs(5), rx));
        completion.trigger();

        assert_eq!(handle.await.unwrap(), Disposition::Graceful);
    }

    #[tokio::test]
    async fn test_second_signal_wins() {
        let (tx, signals) = SignalMonitor::channel();
        let completion = Completion::new();
        let rx = completion.subscribe();

        let handle = tokio::spawn(race(signals, Duration::from_secs(5), rx));
        tx.send("SIGINT").await.unwrap();

        assert_eq!(handle.await.unwrap(), Disposition::Forced);
    }

    #[tokio::test]
    async fn test_deadline_wins() {
        let (_tx, signals) = SignalMonitor::channel();
        let completion = Completion::new();
        let rx = completion.subscribe();

        let outcome = race(signals, Duration::from_millis(20), rx).await;
        assert_eq!(outcome, Disposition::TimedOut);
    }

    #[tokio::test]
    async fn test_closed_signal_source_does_not_force() {
        let (tx, signals) = SignalMonitor::channel();
        drop(tx);
        let completion = Completion::new();
        let rx = completion.subscribe();

        let outcome = race(signals, Duration::from_millis(20), rx).await;
        assert_eq!(outcome, Disposition::TimedOut);
    }

    #[test]
    fn test_exit_codes_distinct() {
        assert_ne!(INTERRUPT_EXIT_CODE, TIMEOUT_EXIT_CODE);
        assert!(INTERRUPT_EXIT_CODE > 1);
        assert!(TIMEOUT_EXIT_CODE > 1);
    }
}
