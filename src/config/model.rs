//! Settings data structures shared by the `run` and `validate` commands.
//!
//! Contains [`Profile`] (the base/development/production split) and
//! [`SecurityHeadersConfig`]. Both are parsed by clap from flags or
//! environment variables and serialize with serde for reporting.

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, ValueEnum};
use serde::{Deserialize, Serialize};

pub const DEFAULT_REFERRER_POLICY: &str = "strict-origin-when-cross-origin";
pub const PRODUCTION_REFERRER_POLICY: &str = "same-origin";
pub const DEFAULT_PERMISSIONS_POLICY: &str = "geolocation=(), microphone=(), camera=()";
pub const DEFAULT_CSP_POLICY: &str =
    "default-src 'self'; object-src 'none'; base-uri 'self'; frame-ancestors 'none'";

/// Deployment profile layered over the base settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Development,
    Production,
}

impl Profile {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    /// `Referrer-Policy` applied when none is configured explicitly.
    #[must_use]
    pub const fn default_referrer_policy(self) -> &'static str {
        match self {
            Self::Development => DEFAULT_REFERRER_POLICY,
            Self::Production => PRODUCTION_REFERRER_POLICY,
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Security response header policy.
///
/// Read once at startup; the middleware only ever sees the compiled
/// [`SecurityHeaders`](crate::middleware::security_headers::SecurityHeaders).
#[derive(Debug, Clone, PartialEq, Eq, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct SecurityHeadersConfig {
    /// Master switch for all security headers
    #[arg(
        long = "security-headers-enabled",
        env = "SECURITY_HEADERS_ENABLED",
        value_name = "BOOL",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        help_heading = "Security Headers"
    )]
    pub enabled: bool,

    /// Referrer-Policy value [default: profile dependent]
    #[arg(long, env = "REFERRER_POLICY", help_heading = "Security Headers")]
    pub referrer_policy: Option<String>,

    /// Permissions-Policy value
    #[arg(
        long,
        env = "PERMISSIONS_POLICY",
        default_value = DEFAULT_PERMISSIONS_POLICY,
        help_heading = "Security Headers"
    )]
    pub permissions_policy: String,

    /// Emit a Content-Security-Policy header
    #[arg(
        long,
        env = "CSP_ENABLED",
        value_name = "BOOL",
        default_value_t = false,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        help_heading = "Security Headers"
    )]
    pub csp_enabled: bool,

    /// Send the CSP as Content-Security-Policy-Report-Only
    #[arg(
        long,
        env = "CSP_REPORT_ONLY",
        value_name = "BOOL",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        help_heading = "Security Headers"
    )]
    pub csp_report_only: bool,

    /// Content-Security-Policy directives
    #[arg(
        long,
        env = "CSP_POLICY",
        default_value = DEFAULT_CSP_POLICY,
        help_heading = "Security Headers"
    )]
    pub csp_policy: String,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            referrer_policy: None,
            permissions_policy: DEFAULT_PERMISSIONS_POLICY.to_string(),
            csp_enabled: false,
            csp_report_only: true,
            csp_policy: DEFAULT_CSP_POLICY.to_string(),
        }
    }
}

impl SecurityHeadersConfig {
    /// Effective `Referrer-Policy`: the configured value, else the profile default.
    #[must_use]
    pub fn referrer_policy(&self, profile: Profile) -> &str {
        self.referrer_policy
            .as_deref()
            .unwrap_or_else(|| profile.default_referrer_policy())
    }

    /// Header carrying the CSP, or `None` when CSP is disabled.
    #[must_use]
    pub const fn csp_header_name(&self) -> Option<&'static str> {
        if !self.csp_enabled {
            None
        } else if self.csp_report_only {
            Some("Content-Security-Policy-Report-Only")
        } else {
            Some("Content-Security-Policy")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_tightens_referrer_policy() {
        let config = SecurityHeadersConfig::default();
        assert_eq!(
            config.referrer_policy(Profile::Development),
            "strict-origin-when-cross-origin"
        );
        assert_eq!(config.referrer_policy(Profile::Production), "same-origin");
    }

    #[test]
    fn explicit_referrer_policy_wins_over_profile() {
        let config = SecurityHeadersConfig {
            referrer_policy: Some("no-referrer".into()),
            ..Default::default()
        };
        assert_eq!(config.referrer_policy(Profile::Production), "no-referrer");
    }

    #[test]
    fn csp_header_name_follows_flags() {
        let mut config = SecurityHeadersConfig::default();
        assert_eq!(config.csp_header_name(), None);

        config.csp_enabled = true;
        assert_eq!(
            config.csp_header_name(),
            Some("Content-Security-Policy-Report-Only")
        );

        config.csp_report_only = false;
        assert_eq!(config.csp_header_name(), Some("Content-Security-Policy"));
    }

    #[test]
    fn profile_serializes_lowercase() {
        let json = serde_json::to_string(&Profile::Production).unwrap();
        assert_eq!(json, "\"production\"");
    }
}
