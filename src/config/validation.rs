//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check service count, name uniqueness, address parseability
//! - Validate value ranges (deadlines > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("at least two services are required, got {got}")]
    TooFewServices { got: usize },

    #[error("duplicate service name: {name}")]
    DuplicateServiceName { name: String },

    #[error("service {name}: invalid bind address {address}")]
    InvalidBindAddress { name: String, address: String },

    #[error("shutdown deadline of 0ms would force-exit immediately")]
    ZeroShutdownDeadline,
}

/// Run all semantic checks, collecting every failure.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.services.len() < 2 {
        errors.push(ValidationError::TooFewServices {
            got: config.services.len(),
        });
    }

    let mut seen = HashSet::new();
    for svc in &config.services {
        if !seen.insert(svc.name.as_str()) {
            errors.push(ValidationError::DuplicateServiceName {
                name: svc.name.clone(),
            });
        }
        if svc.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidBindAddress {
                name: svc.name.clone(),
                address: svc.bind_address.clone(),
            });
        }
    }

    if config.shutdown.shutdown_deadline_ms == 0 {
        errors.push(ValidationError::ZeroShutdownDeadline);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
