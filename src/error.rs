//! Unified error types for Gatehouse.
//!
//! Defines [`GatehouseError`] (startup and CLI failures),
//! [`ValidationError`] for settings validation failures, and
//! [`ApiError`] for request-level failures that render as HTTP
//! responses. All use `thiserror` for `Display` and `Error` derives.
//! Error messages include contextual hints to guide the user toward a fix.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub setting: String,
    pub env: &'static str,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {} ({}): {}", self.setting, self.env, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatehouseError {
    #[error("Invalid value for {setting}: {source}")]
    InvalidHeaderValue {
        setting: &'static str,
        #[source]
        source: axum::http::header::InvalidHeaderValue,
    },

    #[error("Settings validation failed:\n{}", format_errors(.errors))]
    SettingsValidation { errors: Vec<ValidationError> },

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(StatusCode),
}

/// Errors raised while handling a request, rendered as `{"detail": ...}`.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("Malformed CSP report: {0}")]
    MalformedReport(#[from] serde_json::Error),

    #[error("CSP report contained no violations")]
    EmptyReport,
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MalformedReport(_) | Self::EmptyReport => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({ "detail": self.to_string() });
        (status, Json(body)).into_response()
    }
}
