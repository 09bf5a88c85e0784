//! Shared helpers for shutdown sequencing tests.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use quiesce::{Service, ServiceError, ShutdownCallback};

/// Timestamped event log shared between mock services, callbacks, and the
/// test body.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<(String, Instant)>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, label: impl Into<String>) {
        self.events
            .lock()
            .unwrap()
            .push((label.into(), Instant::now()));
    }

    pub fn events(&self) -> Vec<(String, Instant)> {
        self.events.lock().unwrap().clone()
    }

    /// Timestamp of the first event with this label, if it was recorded.
    pub fn time_of(&self, label: &str) -> Option<Instant> {
        self.events()
            .into_iter()
            .find(|(l, _)| l == label)
            .map(|(_, t)| t)
    }

    pub fn has(&self, label: &str) -> bool {
        self.time_of(label).is_some()
    }
}

/// A managed service whose stop takes a configurable amount of time.
pub struct MockService {
    name: String,
    stop_latency: Duration,
    recorder: Recorder,
}

impl MockService {
    pub fn new(name: impl Into<String>, stop_latency: Duration, recorder: Recorder) -> Self {
        Self {
            name: name.into(),
            stop_latency,
            recorder,
        }
    }
}

#[async_trait]
impl Service for MockService {
    fn name(&self) -> &str {
        &self.name
    }

    fn addr(&self) -> &str {
        "127.0.0.1:0"
    }

    async fn start(&self) -> Result<(), ServiceError> {
        self.recorder.record(format!("{}:start", self.name));
        std::future::pending().await
    }

    async fn stop(&self, deadline: Duration) -> Result<(), ServiceError> {
        self.recorder.record(format!("{}:stop-begin", self.name));
        tokio::time::sleep(self.stop_latency).await;
        self.recorder.record(format!("{}:stop-end", self.name));
        if self.stop_latency > deadline {
            return Err(ServiceError::StopDeadlineExceeded {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// A callback that records when it begins and ends around a fixed amount of
/// simulated work.
#[allow(dead_code)]
pub fn recording_callback(
    recorder: Recorder,
    label: &'static str,
    work: Duration,
) -> ShutdownCallback {
    Box::new(move || {
        Box::pin(async move {
            recorder.record(format!("{label}:begin"));
            tokio::time::sleep(work).await;
            recorder.record(format!("{label}:end"));
        })
    })
}
