//! `POST /csp-report` endpoint handler.
//!
//! Browsers post Content-Security-Policy violations here when the policy
//! names this endpoint in `report-uri` or `report-to`. Two payload shapes
//! are accepted:
//!
//! - legacy `application/csp-report`: `{"csp-report": {"document-uri": ...}}`
//! - Reporting API `application/reports+json`:
//!   `[{"type": "csp-violation", "body": {"documentURL": ...}}]`
//!
//! Each violation is logged at WARN. The request id is attached by the
//! log formatter, so a report can be matched to the response that
//! carried the offending policy.

use axum::body::Bytes;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::error::ApiError;

/// One violation, normalized across both payload shapes.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct CspViolation {
    #[serde(rename = "document-uri", alias = "documentURL")]
    pub document_uri: Option<String>,

    #[serde(rename = "violated-directive")]
    pub violated_directive: Option<String>,

    #[serde(rename = "effective-directive", alias = "effectiveDirective")]
    pub effective_directive: Option<String>,

    #[serde(rename = "blocked-uri", alias = "blockedURL")]
    pub blocked_uri: Option<String>,

    #[serde(rename = "source-file", alias = "sourceFile")]
    pub source_file: Option<String>,

    #[serde(rename = "line-number", alias = "lineNumber")]
    pub line_number: Option<u64>,

    pub disposition: Option<String>,
}

impl CspViolation {
    /// The directive that was violated, preferring the effective one.
    #[must_use]
    pub fn directive(&self) -> &str {
        self.effective_directive
            .as_deref()
            .or(self.violated_directive.as_deref())
            .unwrap_or("-")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReportPayload {
    Legacy {
        #[serde(rename = "csp-report")]
        csp_report: CspViolation,
    },
    Reports(Vec<ReportEntry>),
}

#[derive(Deserialize)]
struct ReportEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    body: Option<CspViolation>,
}

/// Extract every CSP violation from a report body.
pub fn parse_report(body: &[u8]) -> Result<Vec<CspViolation>, ApiError> {
    let violations: Vec<CspViolation> = match serde_json::from_slice(body)? {
        ReportPayload::Legacy { csp_report } => vec![csp_report],
        ReportPayload::Reports(entries) => entries
            .into_iter()
            .filter(|e| e.kind == "csp-violation")
            .filter_map(|e| e.body)
            .collect(),
    };

    if violations.is_empty() {
        return Err(ApiError::EmptyReport);
    }
    Ok(violations)
}

pub async fn csp_report_handler(body: Bytes) -> Result<StatusCode, ApiError> {
    let violations = parse_report(&body).inspect_err(|e| {
        tracing::debug!(error = %e, bytes = body.len(), "rejected CSP report");
    })?;

    for violation in &violations {
        tracing::warn!(
            document_uri = violation.document_uri.as_deref().unwrap_or("-"),
            directive = violation.directive(),
            blocked_uri = violation.blocked_uri.as_deref().unwrap_or("-"),
            source_file = violation.source_file.as_deref().unwrap_or("-"),
            line = violation.line_number,
            disposition = violation.disposition.as_deref().unwrap_or("-"),
            "csp violation"
        );
    }

    Ok(StatusCode::NO_CONTENT)
}
