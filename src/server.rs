//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the active
//! profile, compiled security header policy, and uptime), [`build_router`]
//! for constructing the Axum router with middleware layers, and
//! [`shutdown_signal`] for SIGTERM / Ctrl+C handling.

use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;

use crate::config::Profile;
use crate::csp_report::csp_report_handler;
use crate::health::health_handler;
use crate::middleware::{self, security_headers::SecurityHeaders};

pub struct AppState {
    pub profile: Profile,
    pub security_headers: SecurityHeaders,
    pub start_time: Instant,
}

impl AppState {
    #[must_use]
    pub fn new(profile: Profile, security_headers: SecurityHeaders) -> Self {
        Self {
            profile,
            security_headers,
            start_time: Instant::now(),
        }
    }
}

pub fn build_router(state: Arc<AppState>, max_body: usize) -> Router {
    let routes = Router::new()
        .route("/health", get(health_handler))
        .route("/health/", get(health_handler))
        .route("/csp-report", post(csp_report_handler))
        .route("/csp-report/", post(csp_report_handler))
        .with_state(Arc::clone(&state));

    middleware::apply(routes, &state.security_headers, max_body)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
