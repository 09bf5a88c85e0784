//! Managed service contract.
//!
//! # Data Flow
//! ```text
//! construction (handlers registered)
//!     → start() — blocks for the service's whole serving life
//!     → stop(deadline) — reject new work, drain, unblock start()
//! ```
//!
//! # Design Decisions
//! - The trait is object-safe so the orchestrator can own a heterogeneous
//!   set of services behind `Arc<dyn Service>`
//! - `stop` takes the deadline as a plain `Duration`; the caller additionally
//!   enforces it with a timeout, so a non-cooperating implementation is
//!   abandoned rather than trusted
//! - Handler registration lives on the concrete service type, before start

pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use thiserror::Error;

/// Errors a managed service can report from `start` or `stop`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("serve loop failed: {0}")]
    Serve(#[from] std::io::Error),

    #[error("service {name}: stop deadline exceeded")]
    StopDeadlineExceeded { name: String },

    #[error("service was never started")]
    NotStarted,

    #[error("service already started")]
    AlreadyStarted,
}

/// A long-running component with an explicit start/stop lifecycle, owned by
/// the orchestrator for the whole process lifetime.
#[async_trait]
pub trait Service: Send + Sync {
    /// Service identifier for logging.
    fn name(&self) -> &str;

    /// Address the service is (or will be) bound to.
    fn addr(&self) -> &str;

    /// Serve until stopped. Returns only on intentional stop or a fatal
    /// listener error.
    async fn start(&self) -> Result<(), ServiceError>;

    /// Stop accepting new work and finish or abandon in-flight work within
    /// `deadline`. Once stop begins, `start`'s block must unblock.
    async fn stop(&self, deadline: Duration) -> Result<(), ServiceError>;
}

/// A unit of cleanup work run during shutdown.
///
/// Callbacks have no error channel and no return value; they are invoked at
/// most once, concurrently with their siblings, and abandoned (the future is
/// dropped) if they outrun the per-callback deadline. They must not rely on
/// running to completion.
pub type ShutdownCallback = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;
