//! Top-level shutdown orchestrator.
//!
//! # Responsibilities
//! - Own the managed services for the whole process lifetime
//! - Start every service on its own task (start failures are logged,
//!   never fatal to the orchestrator)
//! - Block on the first termination signal, then drain: stop fan-out,
//!   then callback fan-out, with the force-shutdown race alongside
//!
//! # Design Decisions
//! - The race and the drain sequence meet in a single `select!`, so exactly
//!   one of them decides the disposition; whichever resolves first wins and
//!   the loser is dropped
//! - Dropping the drain future aborts its fan-out tasks, which is what
//!   "preempting any in-progress fan-out" means inside the process; the
//!   binary then exits with the abnormal code
//! - Per-member deadlines are enforced twice: passed to the member so it can
//!   cooperate, and wrapped in a timeout so a non-cooperating member is
//!   abandoned

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::config::schema::ShutdownConfig;
use crate::error::Error;
use crate::lifecycle::shutdown::{self, Completion, Disposition};
use crate::lifecycle::signals::SignalMonitor;
use crate::service::{Service, ShutdownCallback};

/// Orchestrator for a process owning multiple managed services.
pub struct App {
    services: Vec<Arc<dyn Service>>,
    callbacks: Vec<ShutdownCallback>,
    config: ShutdownConfig,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field(
                "services",
                &self.services.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("callbacks", &self.callbacks.len())
            .field("config", &self.config)
            .finish()
    }
}

impl App {
    /// Create an orchestrator over `services`.
    ///
    /// Fails with [`Error::InsufficientServices`] when fewer than two
    /// services are supplied.
    pub fn new(services: Vec<Arc<dyn Service>>, config: ShutdownConfig) -> Result<Self, Error> {
        if services.len() < 2 {
            return Err(Error::InsufficientServices {
                got: services.len(),
            });
        }
        Ok(Self {
            services,
            callbacks: Vec::new(),
            config,
        })
    }

    /// Register a cleanup callback, invoked at most once during shutdown.
    pub fn register_callback(&mut self, callback: ShutdownCallback) {
        self.callbacks.push(callback);
    }

    /// Start all services, wait for a termination signal, then run the
    /// shutdown sequence. Returns the terminal disposition; the caller maps
    /// it to a process exit code.
    pub async fn run(self) -> Disposition {
        self.run_with(SignalMonitor::start()).await
    }

    /// [`run`](Self::run) with a caller-supplied signal source.
    pub async fn run_with(self, mut signals: SignalMonitor) -> Disposition {
        let App {
            services,
            callbacks,
            config,
        } = self;

        for service in &services {
            let service = service.clone();
            tokio::spawn(async move {
                if let Err(err) = service.start().await {
                    tracing::error!(service = service.name(), %err, "service exited with error");
                }
            });
        }

        match signals.recv().await {
            Some(signal) => {
                tracing::info!(signal, "termination signal received, shutting down")
            }
            None => tracing::warn!("signal source closed, shutting down"),
        }

        // The race owns the signal source from here on: the next delivery it
        // sees is the second signal.
        let completion = Completion::new();
        let mut race = tokio::spawn(shutdown::race(
            signals,
            config.shutdown_deadline(),
            completion.subscribe(),
        ));

        let drain = async {
            stop_all_services(services, config.service_stop_deadline()).await;
            run_all_callbacks(callbacks, config.callback_deadline()).await;
        };
        tokio::pin!(drain);

        tokio::select! {
            outcome = &mut race => {
                // Forced or TimedOut; the drain is dropped, aborting its
                // in-flight fan-out tasks. A dead race task here means the
                // drain was still running, so fail toward TimedOut.
                return join_race(outcome, Disposition::TimedOut);
            }
            _ = &mut drain => {}
        }

        completion.trigger();
        // The drain finished first; a dead race task cannot have forced
        // anything, so the outcome stays Graceful.
        join_race(race.await, Disposition::Graceful)
    }
}

/// Resolve the race task's join result, logging a task failure and falling
/// back to `fallback` instead of letting a dead race pass for a decision.
fn join_race(
    result: Result<Disposition, tokio::task::JoinError>,
    fallback: Disposition,
) -> Disposition {
    match result {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(%err, "force-shutdown race task failed");
            fallback
        }
    }
}

/// Stop every service concurrently, each bounded by `deadline`. Returns only
/// after every stop has returned or been abandoned; errors never abort
/// sibling stops.
async fn stop_all_services(services: Vec<Arc<dyn Service>>, deadline: Duration) {
    let mut set = JoinSet::new();
    for service in services {
        set.spawn(async move {
            let name = service.name().to_owned();
            match tokio::time::timeout(deadline, service.stop(deadline)).await {
                Ok(Ok(())) => tracing::info!(service = %name, "service stopped"),
                Ok(Err(err)) => {
                    tracing::warn!(service = %name, %err, "service stop failed")
                }
                Err(_) => tracing::warn!(
                    service = %name,
                    deadline_ms = deadline.as_millis() as u64,
                    "service stop abandoned at deadline"
                ),
            }
        });
    }
    while set.join_next().await.is_some() {}
    tracing::info!("all services stopped");
}

/// Run every cleanup callback concurrently, each bounded by `deadline`.
/// Callbacks have no error channel; an overrunning callback is abandoned.
async fn run_all_callbacks(callbacks: Vec<ShutdownCallback>, deadline: Duration) {
    let mut set = JoinSet::new();
    for (index, callback) in callbacks.into_iter().enumerate() {
        set.spawn(async move {
            if tokio::time::timeout(deadline, callback()).await.is_err() {
                tracing::warn!(
                    callback = index,
                    deadline_ms = deadline.as_millis() as u64,
                    "cleanup callback abandoned at deadline"
                );
            }
        });
    }
    while set.join_next().await.is_some() {}
    tracing::info!("all shutdown callbacks finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceError;
    use async_trait::async_trait;

    struct IdleService;

    #[async_trait]
    impl Service for IdleService {
        fn name(&self) -> &str {
            "idle"
        }
        fn addr(&self) -> &str {
            "127.0.0.1:0"
        }
        async fn start(&self) -> Result<(), ServiceError> {
            std::future::pending().await
        }
        async fn stop(&self, _deadline: Duration) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    #[test]
    fn test_requires_two_services() {
        let services: Vec<Arc<dyn Service>> = vec![Arc::new(IdleService)];
        let err = App::new(services, ShutdownConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InsufficientServices { got: 1 }));
    }

    #[test]
    fn test_two_services_accepted() {
        let services: Vec<Arc<dyn Service>> = vec![Arc::new(IdleService), Arc::new(IdleService)];
        assert!(App::new(services, ShutdownConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_dead_race_task_falls_back() {
        let join_err = tokio::spawn(async { panic!("task died") })
            .await
            .unwrap_err();

        assert_eq!(
            join_race(Err(join_err), Disposition::TimedOut),
            Disposition::TimedOut
        );
        assert_eq!(
            join_race(Ok(Disposition::Forced), Disposition::TimedOut),
            Disposition::Forced
        );
    }
}
