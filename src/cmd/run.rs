//! `gatehouse run` — start the HTTP server.
//!
//! Initializes logging, validates the settings, compiles the security
//! header policy once, and serves the router until SIGTERM / Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config::validation;
use crate::error::GatehouseError;
use crate::logging;
use crate::middleware::security_headers::SecurityHeaders;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), GatehouseError> {
    let settings = &args.settings;

    let log_format = logging::resolve_format(args.pretty, args.json, settings.profile);
    logging::init(&args.log_level, log_format);

    #[cfg(feature = "sentry-integration")]
    let _sentry_guard = args.sentry_dsn.as_ref().map(|dsn| {
        crate::sentry_integration::init(
            dsn,
            args.sentry_environment.as_deref(),
            settings.profile,
        )
    });

    validation::validate(&settings.security, settings.profile)
        .map_err(|errors| GatehouseError::SettingsValidation { errors })?;

    let policy = SecurityHeaders::from_config(&settings.security, settings.profile)?;
    let csp = policy
        .csp_header()
        .map_or_else(|| "off".to_string(), ToString::to_string);
    let headers_enabled = policy.is_enabled();

    let state = Arc::new(AppState::new(settings.profile, policy));
    let router = server::build_router(state, args.max_body);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        profile = %settings.profile,
        security_headers = headers_enabled,
        csp = %csp,
        "gatehouse started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("gatehouse stopped");
    Ok(())
}
