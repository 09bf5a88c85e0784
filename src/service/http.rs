//! Axum-backed managed HTTP service.
//!
//! # Responsibilities
//! - Register handlers before start
//! - Serve HTTP on the configured bind address
//! - On stop: reject new requests with 503, drain in-flight connections,
//!   unblock the serve loop
//!
//! # Design Decisions
//! - Drain rejection is a middleware over a shared flag, flipped by `stop`
//!   before the listener begins graceful shutdown
//! - `stop` observes the serve loop's completion through a watch channel so
//!   the deadline bounds the whole drain, not just the rejection flip

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{watch, Mutex};
use tower_http::trace::TraceLayer;

use crate::service::{Service, ServiceError};

/// HTTP service managed by the shutdown orchestrator.
pub struct HttpService {
    name: String,
    addr: String,
    /// Router under construction; taken by the serve loop at start.
    router: Mutex<Option<Router>>,
    draining: Arc<AtomicBool>,
    started: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
    finished_tx: watch::Sender<bool>,
}

impl HttpService {
    /// Create a new HTTP service with no routes.
    pub fn new(name: impl Into<String>, addr: impl Into<String>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        let (finished_tx, _) = watch::channel(false);
        Self {
            name: name.into(),
            addr: addr.into(),
            router: Mutex::new(Some(Router::new())),
            draining: Arc::new(AtomicBool::new(false)),
            started: AtomicBool::new(false),
            shutdown_tx,
            finished_tx,
        }
    }

    /// Register a handler. Builder-time only: `route` consumes the service,
    /// so all routes exist before `start` can be called.
    pub fn route(mut self, path: &str, handler: MethodRouter) -> Self {
        let slot = self.router.get_mut();
        if let Some(router) = slot.take() {
            *slot = Some(router.route(path, handler));
        }
        self
    }

    async fn serve(&self) -> Result<(), ServiceError> {
        let router = self
            .router
            .lock()
            .await
            .take()
            .ok_or(ServiceError::AlreadyStarted)?;

        let listener =
            TcpListener::bind(&self.addr)
                .await
                .map_err(|source| ServiceError::Bind {
                    addr: self.addr.clone(),
                    source,
                })?;

        let app = router
            .layer(middleware::from_fn_with_state(
                self.draining.clone(),
                reject_when_draining,
            ))
            .layer(TraceLayer::new_for_http());

        tracing::info!(service = %self.name, address = %self.addr, "HTTP service listening");

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.wait_for(|stopping| *stopping).await;
            })
            .await?;

        tracing::info!(service = %self.name, "HTTP service stopped");
        Ok(())
    }
}

#[async_trait]
impl Service for HttpService {
    fn name(&self) -> &str {
        &self.name
    }

    fn addr(&self) -> &str {
        &self.addr
    }

    async fn start(&self) -> Result<(), ServiceError> {
        self.started.store(true, Ordering::SeqCst);
        let result = self.serve().await;
        // Observed by stop() regardless of how the serve loop ended.
        let _ = self.finished_tx.send(true);
        result
    }

    async fn stop(&self, deadline: Duration) -> Result<(), ServiceError> {
        if !self.started.load(Ordering::SeqCst) {
            return Err(ServiceError::NotStarted);
        }

        self.draining.store(true, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(true);

        let mut finished = self.finished_tx.subscribe();
        let result = match tokio::time::timeout(deadline, finished.wait_for(|done| *done)).await {
            Ok(_) => Ok(()),
            Err(_) => Err(ServiceError::StopDeadlineExceeded {
                name: self.name.clone(),
            }),
        };
        result
    }
}

/// Reject new requests once the service is draining.
async fn reject_when_draining(
    State(draining): State<Arc<AtomicBool>>,
    request: Request,
    next: Next,
) -> Response {
    if draining.load(Ordering::SeqCst) {
        tracing::debug!(uri = %request.uri(), "rejecting request during drain");
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    next.run(request).await
}
