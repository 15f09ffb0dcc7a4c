//! Settings validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`SecurityHeadersConfig`]
//! for values that would produce an illegal or meaningless header:
//! control characters, unknown `Referrer-Policy` tokens, and empty
//! policies. Returns a list of [`ValidationError`] values with
//! per-setting suggestions.

use axum::http::HeaderValue;

use super::model::{Profile, SecurityHeadersConfig};
use crate::error::ValidationError;

pub const REFERRER_POLICY_TOKENS: &[&str] = &[
    "no-referrer",
    "no-referrer-when-downgrade",
    "origin",
    "origin-when-cross-origin",
    "same-origin",
    "strict-origin",
    "strict-origin-when-cross-origin",
    "unsafe-url",
];

/// Validate that a string can be sent as an HTTP header value.
pub fn validate_header_value(value: &str) -> Result<(), String> {
    HeaderValue::from_str(value)
        .map(|_| ())
        .map_err(|_| "contains characters not allowed in an HTTP header".into())
}

/// Validate a `Referrer-Policy` value (a comma-separated fallback list).
///
/// On failure returns the message and, when the token looks like a typo
/// of a known one, a suggestion.
pub fn validate_referrer_policy(value: &str) -> Result<(), (String, Option<String>)> {
    let tokens: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return Err(("cannot be empty".into(), None));
    }

    for token in tokens {
        if REFERRER_POLICY_TOKENS.contains(&token) {
            continue;
        }
        let normalized = token.to_ascii_lowercase().replace('_', "-");
        let suggestion = if REFERRER_POLICY_TOKENS.contains(&normalized.as_str()) {
            format!("did you mean '{normalized}'?")
        } else {
            format!("expected one of: {}", REFERRER_POLICY_TOKENS.join(", "))
        };
        return Err((format!("unknown token '{token}'"), Some(suggestion)));
    }

    Ok(())
}

/// Check every setting that will actually be sent.
///
/// Values for headers that are switched off are ignored: with the master
/// switch off nothing is checked, and the CSP policy is only checked when
/// CSP is enabled.
pub fn validate(
    config: &SecurityHeadersConfig,
    profile: Profile,
) -> Result<(), Vec<ValidationError>> {
    if !config.enabled {
        return Ok(());
    }

    let mut errors = Vec::new();

    let referrer_policy = config.referrer_policy(profile);
    if let Err((message, suggestion)) = validate_referrer_policy(referrer_policy) {
        errors.push(ValidationError {
            setting: "referrer_policy".into(),
            env: "REFERRER_POLICY",
            message,
            suggestion,
        });
    } else if let Err(message) = validate_header_value(referrer_policy) {
        errors.push(ValidationError {
            setting: "referrer_policy".into(),
            env: "REFERRER_POLICY",
            message,
            suggestion: None,
        });
    }

    if config.permissions_policy.trim().is_empty() {
        errors.push(ValidationError {
            setting: "permissions_policy".into(),
            env: "PERMISSIONS_POLICY",
            message: "cannot be empty while security headers are enabled".into(),
            suggestion: Some(format!(
                "unset it to use the default '{}'",
                super::model::DEFAULT_PERMISSIONS_POLICY
            )),
        });
    } else if let Err(message) = validate_header_value(&config.permissions_policy) {
        errors.push(ValidationError {
            setting: "permissions_policy".into(),
            env: "PERMISSIONS_POLICY",
            message,
            suggestion: None,
        });
    }

    if config.csp_enabled {
        if config.csp_policy.trim().is_empty() {
            errors.push(ValidationError {
                setting: "csp_policy".into(),
                env: "CSP_POLICY",
                message: "cannot be empty when CSP is enabled".into(),
                suggestion: Some("set CSP_ENABLED=false to disable the header".into()),
            });
        } else if let Err(message) = validate_header_value(&config.csp_policy) {
            errors.push(ValidationError {
                setting: "csp_policy".into(),
                env: "CSP_POLICY",
                message,
                suggestion: Some("separate directives with ';' on a single line".into()),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(config: &SecurityHeadersConfig, profile: Profile) -> String {
    if !config.enabled {
        return format!("settings are valid (profile: {profile})\n  security headers disabled");
    }

    let mut lines = vec![
        format!("  Referrer-Policy: {}", config.referrer_policy(profile)),
        format!("  Permissions-Policy: {}", config.permissions_policy),
        "  X-Content-Type-Options: nosniff".to_string(),
    ];

    match config.csp_header_name() {
        Some(name) => lines.push(format!("  {name}: {}", config.csp_policy)),
        None => lines.push("  Content-Security-Policy: (disabled)".to_string()),
    }

    format!(
        "settings are valid (profile: {profile})\n{}",
        lines.join("\n")
    )
}
