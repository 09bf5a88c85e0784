//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (orchestrator.rs):
//!     Construct with ≥2 services → start each on its own task
//!
//! Shutdown (orchestrator.rs + shutdown.rs):
//!     First signal → spawn force-shutdown race
//!                  → stop fan-out → callback fan-out → trigger completion
//!
//! Race (shutdown.rs):
//!     second signal   → Forced   (exit code 13)
//!     global deadline → TimedOut (exit code 18)
//!     completion      → Graceful (race ends without side effects)
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM/SIGHUP/SIGQUIT → buffered queue, depth 2
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: all services stop before any callback runs
//! - The race is the only enforcer of the global deadline; the fan-outs
//!   enforce only their own per-member deadlines
//! - Forced/TimedOut preempt the fan-outs; the caller maps the returned
//!   disposition to the process exit code

pub mod orchestrator;
pub mod shutdown;
pub mod signals;

pub use orchestrator::App;
pub use shutdown::{Completion, Disposition};
pub use signals::SignalMonitor;
