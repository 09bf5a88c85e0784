//! OS signal handling.
//!
//! # Responsibilities
//! - Register handlers for the interrupt/terminate signal family
//! - Buffer up to two deliveries so a signal arriving while no one is
//!   receiving is not lost (the second delivery decides a forced exit)
//! - Expose a single blocking receive
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Only occurrence and count matter downstream; the signal name is carried
//!   for logging alone
//! - Signals the OS will not let a process intercept are not registered

use tokio::sync::mpsc;

/// Depth of the buffered signal queue.
const SIGNAL_QUEUE_DEPTH: usize = 2;

/// Monitor for process-termination signals.
///
/// Holds the consuming end of a buffered queue fed by a background task
/// subscribed to the OS. Consumption is destructive: the orchestrator takes
/// the first signal, the force-shutdown race takes the second.
pub struct SignalMonitor {
    rx: mpsc::Receiver<&'static str>,
}

impl SignalMonitor {
    /// Subscribe to the OS termination signals and start forwarding them
    /// into the queue.
    pub fn start() -> Self {
        let (tx, rx) = mpsc::channel(SIGNAL_QUEUE_DEPTH);
        tokio::spawn(forward_os_signals(tx));
        Self { rx }
    }

    /// A monitor fed by the caller instead of the OS. Tests use this to
    /// inject synthetic signals.
    pub fn channel() -> (mpsc::Sender<&'static str>, Self) {
        let (tx, rx) = mpsc::channel(SIGNAL_QUEUE_DEPTH);
        (tx, Self { rx })
    }

    /// Block until a signal occurs. Returns `None` only if the forwarding
    /// side has gone away.
    pub async fn recv(&mut self) -> Option<&'static str> {
        self.rx.recv().await
    }
}

#[cfg(unix)]
async fn forward_os_signals(tx: mpsc::Sender<&'static str>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(err) => {
            tracing::error!(%err, "failed to register SIGINT handler");
            return;
        }
    };
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(err) => {
            tracing::error!(%err, "failed to register SIGTERM handler");
            return;
        }
    };
    let mut sighup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(err) => {
            tracing::error!(%err, "failed to register SIGHUP handler");
            return;
        }
    };
    let mut sigquit = match signal(SignalKind::quit()) {
        Ok(s) => s,
        Err(err) => {
            tracing::error!(%err, "failed to register SIGQUIT handler");
            return;
        }
    };

    loop {
        let name = tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
            _ = sighup.recv() => "SIGHUP",
            _ = sigquit.recv() => "SIGQUIT",
        };
        tracing::info!(signal = name, "signal received");
        // Queue full means two deliveries are already pending; further ones
        // carry no additional meaning.
        if tx.try_send(name).is_err() && tx.is_closed() {
            return;
        }
    }
}

#[cfg(not(unix))]
async fn forward_os_signals(tx: mpsc::Sender<&'static str>) {
    loop {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::info!(signal = "ctrl-c", "signal received");
        if tx.try_send("ctrl-c").is_err() && tx.is_closed() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_buffers_two_signals() {
        let (tx, mut monitor) = SignalMonitor::channel();

        // Three deliveries while no one is receiving.
        tx.try_send("SIGINT").unwrap();
        tx.try_send("SIGTERM").unwrap();
        assert!(tx.try_send("SIGINT").is_err());

        assert_eq!(monitor.recv().await, Some("SIGINT"));
        assert_eq!(monitor.recv().await, Some("SIGTERM"));
    }

    #[tokio::test]
    async fn test_recv_returns_none_after_sender_drops() {
        let (tx, mut monitor) = SignalMonitor::channel();
        drop(tx);
        assert_eq!(monitor.recv().await, None);
    }
}
