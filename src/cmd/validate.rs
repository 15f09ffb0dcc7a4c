//! `gatehouse validate` — check the resolved settings for errors.
//!
//! Resolves settings exactly as `run` would (flags, environment, `.env`),
//! validates them, and reports the effective response headers in either
//! human-readable text or machine-readable JSON format.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::validation;
use crate::error::GatehouseError;
use crate::middleware::security_headers::SecurityHeaders;

pub fn execute(args: &ValidateArgs) -> Result<(), GatehouseError> {
    let settings = &args.settings;

    if let Err(errors) = validation::validate(&settings.security, settings.profile) {
        match args.format {
            ValidateFormat::Text => {
                eprintln!("\u{2717} settings have {} errors\n", errors.len());
                for error in &errors {
                    eprintln!("{error}");
                }
            }
            ValidateFormat::Json => {
                let json_errors: Vec<serde_json::Value> = errors
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "setting": e.setting,
                            "env": e.env,
                            "message": e.message,
                            "suggestion": e.suggestion,
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": false,
                        "errors": json_errors,
                    })
                );
            }
        }
        return Err(GatehouseError::SettingsValidation { errors });
    }

    match args.format {
        ValidateFormat::Text => {
            println!(
                "\u{2713} {}",
                validation::format_validation_report(&settings.security, settings.profile)
            );
        }
        ValidateFormat::Json => {
            let headers = effective_headers(&SecurityHeaders::from_config(
                &settings.security,
                settings.profile,
            )?);
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "profile": settings.profile,
                    "settings": settings.security,
                    "headers": headers,
                })
            );
        }
    }

    Ok(())
}

/// Headers the policy would add to a response that sets none of its own.
fn effective_headers(policy: &SecurityHeaders) -> serde_json::Map<String, serde_json::Value> {
    policy
        .headers()
        .into_iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                serde_json::Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Profile, SecurityHeadersConfig};

    #[test]
    fn effective_headers_reflect_policy() {
        let config = SecurityHeadersConfig {
            csp_enabled: true,
            ..Default::default()
        };
        let policy = SecurityHeaders::from_config(&config, Profile::Production).unwrap();
        let headers = effective_headers(&policy);

        assert_eq!(headers["referrer-policy"], "same-origin");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert!(headers.contains_key("content-security-policy-report-only"));
        assert_eq!(headers.len(), 4);
    }

    #[test]
    fn effective_headers_empty_when_disabled() {
        let config = SecurityHeadersConfig {
            enabled: false,
            ..Default::default()
        };
        let policy = SecurityHeaders::from_config(&config, Profile::Development).unwrap();
        assert!(effective_headers(&policy).is_empty());
    }
}
