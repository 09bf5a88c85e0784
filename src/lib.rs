//! Graceful-shutdown orchestration for processes that own several
//! independently running network services.
//!
//! # Architecture Overview
//!
//! ```text
//!                ┌─────────────────────────────────────────────────┐
//!                │                  ORCHESTRATOR                   │
//!                │                                                 │
//!   SIGINT/      │  ┌─────────┐   first    ┌───────────────────┐  │
//!   SIGTERM ─────┼─▶│ signal  │──signal───▶│  stop fan-out     │  │
//!                │  │ monitor │            │  (all services,   │  │
//!                │  └────┬────┘            │   per-stop bound) │  │
//!                │       │ second          └─────────┬─────────┘  │
//!                │       │ signal                    ▼            │
//!                │       ▼                 ┌───────────────────┐  │
//!                │  ┌─────────┐            │ callback fan-out  │  │
//!                │  │ force-  │   global   │ (all callbacks,   │  │
//!                │  │shutdown │◀─deadline  │  per-call bound)  │  │
//!                │  │  race   │            └─────────┬─────────┘  │
//!                │  └────┬────┘                      │            │
//!                │       │ Forced / TimedOut         │ completion │
//!                │       ▼                           ▼            │
//!                │   exit(13/18)                  exit(0)         │
//!                └─────────────────────────────────────────────────┘
//! ```
//!
//! The orchestrator starts every managed service fire-and-forget, blocks on
//! the first termination signal, then drains: all services are stopped
//! concurrently (each bounded by its own deadline), then all cleanup
//! callbacks run concurrently (likewise bounded). A force-shutdown race runs
//! alongside the drain and turns a second signal or the global deadline into
//! an immediate abnormal exit, so a misbehaving service or callback can never
//! hang the process.

// Core subsystems
pub mod config;
pub mod service;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;

pub use config::schema::{AppConfig, ShutdownConfig};
pub use error::Error;
pub use lifecycle::orchestrator::App;
pub use lifecycle::shutdown::Disposition;
pub use lifecycle::signals::SignalMonitor;
pub use service::http::HttpService;
pub use service::{Service, ServiceError, ShutdownCallback};
