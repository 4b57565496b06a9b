// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! HIE Portal API Server
//!
//! Role-based administrative portal backend for a regional
//! health-information-exchange program. Delegates identity and storage to a
//! managed backend and hosts the privileged approval and staff-management
//! procedures.

use hie_portal::{config::Config, session::RetryPolicy, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting HIE Portal API");

    // Build shared state (backend clients, session store, services)
    let state = Arc::new(AppState::new(config, RetryPolicy::default()));
    tracing::info!(backend = %state.config.backend_url, "Backend clients initialized");

    // Build router
    let app = hie_portal::routes::create_router(state.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hie_portal=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
