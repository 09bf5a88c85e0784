use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quiesce::config::loader::load_config;
use quiesce::config::schema::HttpServiceConfig;
use quiesce::{App, AppConfig, Disposition, HttpService, Service};

#[derive(Parser)]
#[command(name = "quiesce", about = "Multi-service process with graceful shutdown")]
struct Args {
    /// Path to a TOML config file. Defaults apply when absent.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path).map_err(quiesce::Error::from)?,
        None => default_config(),
    };

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    config
                        .log_filter
                        .clone()
                        .unwrap_or_else(|| "quiesce=debug,tower_http=debug".into()),
                )
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        services = config.services.len(),
        shutdown_deadline_ms = config.shutdown.shutdown_deadline_ms,
        "quiesce starting"
    );

    let mut services: Vec<Arc<dyn Service>> = Vec::new();
    for entry in &config.services {
        let name = entry.name.clone();
        let service = HttpService::new(&entry.name, &entry.bind_address).route(
            "/",
            get(move || {
                let name = name.clone();
                async move { format!("hello from {name}") }
            }),
        );
        services.push(Arc::new(service));
    }

    let mut app = App::new(services, config.shutdown.clone())?;
    app.register_callback(Box::new(|| Box::pin(flush_cache_to_db())));

    match app.run().await {
        Disposition::Graceful => {
            tracing::info!("shutdown complete");
            Ok(())
        }
        abnormal => {
            // Supervisors distinguish interrupted vs. timed-out drains by code.
            process::exit(abnormal.exit_code());
        }
    }
}

fn default_config() -> AppConfig {
    AppConfig {
        services: vec![
            HttpServiceConfig {
                name: "business".into(),
                bind_address: "127.0.0.1:8080".into(),
            },
            HttpServiceConfig {
                name: "admin".into(),
                bind_address: "127.0.0.1:8081".into(),
            },
        ],
        ..Default::default()
    }
}

/// Example cleanup: flush a local cache to its backing store. Abandoned if it
/// outruns the per-callback deadline.
async fn flush_cache_to_db() {
    tracing::info!("flushing local cache to database");
    tokio::time::sleep(Duration::from_secs(1)).await;
    tracing::info!("cache flushed");
}
