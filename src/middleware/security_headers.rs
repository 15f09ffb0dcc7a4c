//! Defensive response headers driven by static settings.
//!
//! [`SecurityHeaders`] is compiled once from [`SecurityHeadersConfig`] at
//! startup and turned into `SetResponseHeaderLayer::if_not_present`
//! layers: a value placed on the response by a handler or an inner layer
//! is never replaced. Values for headers that are switched off are never
//! compiled, so they cannot fail startup.

use axum::http::header::{
    CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY_REPORT_ONLY, REFERRER_POLICY,
    X_CONTENT_TYPE_OPTIONS,
};
use axum::http::{HeaderName, HeaderValue};
use tower::layer::util::Stack;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{Profile, SecurityHeadersConfig};
use crate::error::GatehouseError;

pub static PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

pub type HeaderLayer = SetResponseHeaderLayer<HeaderValue>;

/// `Referrer-Policy`, `Permissions-Policy` and `X-Content-Type-Options`.
pub type BaselineLayer = Stack<HeaderLayer, Stack<HeaderLayer, HeaderLayer>>;

#[derive(Debug, Clone)]
struct Baseline {
    referrer_policy: HeaderValue,
    permissions_policy: HeaderValue,
}

#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    /// `None` when the master switch is off.
    baseline: Option<Baseline>,
    csp: Option<(HeaderName, HeaderValue)>,
}

impl SecurityHeaders {
    pub fn from_config(
        config: &SecurityHeadersConfig,
        profile: Profile,
    ) -> Result<Self, GatehouseError> {
        if !config.enabled {
            return Ok(Self {
                baseline: None,
                csp: None,
            });
        }

        let baseline = Baseline {
            referrer_policy: header_value("REFERRER_POLICY", config.referrer_policy(profile))?,
            permissions_policy: header_value("PERMISSIONS_POLICY", &config.permissions_policy)?,
        };

        let csp = if config.csp_enabled {
            let name = if config.csp_report_only {
                CONTENT_SECURITY_POLICY_REPORT_ONLY
            } else {
                CONTENT_SECURITY_POLICY
            };
            Some((name, header_value("CSP_POLICY", &config.csp_policy)?))
        } else {
            None
        };

        Ok(Self {
            baseline: Some(baseline),
            csp,
        })
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.baseline.is_some()
    }

    /// Header name carrying the CSP, if one is emitted.
    #[must_use]
    pub fn csp_header(&self) -> Option<&HeaderName> {
        self.csp.as_ref().map(|(name, _)| name)
    }

    /// Headers added to a response that sets none of its own, in order.
    #[must_use]
    pub fn headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        let mut headers = Vec::new();
        if let Some(baseline) = &self.baseline {
            headers.push((REFERRER_POLICY, baseline.referrer_policy.clone()));
            headers.push((PERMISSIONS_POLICY.clone(), baseline.permissions_policy.clone()));
            headers.push((X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")));
        }
        if let Some((name, value)) = &self.csp {
            headers.push((name.clone(), value.clone()));
        }
        headers
    }

    #[must_use]
    pub fn baseline_layer(&self) -> Option<BaselineLayer> {
        self.baseline.as_ref().map(|baseline| {
            Stack::new(
                SetResponseHeaderLayer::if_not_present(
                    X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ),
                Stack::new(
                    SetResponseHeaderLayer::if_not_present(
                        PERMISSIONS_POLICY.clone(),
                        baseline.permissions_policy.clone(),
                    ),
                    SetResponseHeaderLayer::if_not_present(
                        REFERRER_POLICY,
                        baseline.referrer_policy.clone(),
                    ),
                ),
            )
        })
    }

    #[must_use]
    pub fn csp_layer(&self) -> Option<HeaderLayer> {
        self.csp
            .as_ref()
            .map(|(name, value)| SetResponseHeaderLayer::if_not_present(name.clone(), value.clone()))
    }
}

fn header_value(setting: &'static str, value: &str) -> Result<HeaderValue, GatehouseError> {
    HeaderValue::from_str(value)
        .map_err(|source| GatehouseError::InvalidHeaderValue { setting, source })
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use axum::body::Body;
    use axum::http::{HeaderMap, Request, Response};
    use tower::{service_fn, ServiceBuilder, ServiceExt};

    use super::*;

    fn compile(config: &SecurityHeadersConfig) -> SecurityHeaders {
        SecurityHeaders::from_config(config, Profile::Development).unwrap()
    }

    fn names(policy: &SecurityHeaders) -> Vec<String> {
        policy
            .headers()
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Run `policy`'s layers over a handler that pre-sets `preset`.
    async fn respond(policy: &SecurityHeaders, preset: HeaderMap) -> HeaderMap {
        let service = ServiceBuilder::new()
            .option_layer(policy.baseline_layer())
            .option_layer(policy.csp_layer())
            .service(service_fn(move |_req: Request<Body>| {
                let preset = preset.clone();
                async move {
                    let mut response = Response::new(Body::empty());
                    *response.headers_mut() = preset;
                    Ok::<_, Infallible>(response)
                }
            }));
        let response = service
            .oneshot(Request::new(Body::empty()))
            .await
            .unwrap();
        response.headers().clone()
    }

    #[test]
    fn defaults_set_baseline_headers_without_csp() {
        let policy = compile(&SecurityHeadersConfig::default());
        assert_eq!(
            names(&policy),
            ["referrer-policy", "permissions-policy", "x-content-type-options"]
        );

        let headers = policy.headers();
        assert_eq!(headers[0].1, "strict-origin-when-cross-origin");
        assert_eq!(headers[1].1, "geolocation=(), microphone=(), camera=()");
        assert_eq!(headers[2].1, "nosniff");
        assert!(policy.csp_layer().is_none());
    }

    #[test]
    fn disabled_emits_nothing() {
        let config = SecurityHeadersConfig {
            enabled: false,
            csp_enabled: true,
            ..Default::default()
        };
        let policy = compile(&config);
        assert!(!policy.is_enabled());
        assert!(policy.headers().is_empty());
        assert!(policy.baseline_layer().is_none());
        assert!(policy.csp_layer().is_none());
    }

    #[test]
    fn switched_off_values_are_not_compiled() {
        let config = SecurityHeadersConfig {
            enabled: false,
            permissions_policy: "camera=()\r\nX-Evil: 1".into(),
            ..Default::default()
        };
        assert!(SecurityHeaders::from_config(&config, Profile::Development).is_ok());

        let config = SecurityHeadersConfig {
            csp_enabled: false,
            csp_policy: "default-src 'self';\nimg-src *".into(),
            ..Default::default()
        };
        let policy = compile(&config);
        assert!(policy.csp_header().is_none());
    }

    #[test]
    fn report_only_csp_uses_report_only_header() {
        let config = SecurityHeadersConfig {
            csp_enabled: true,
            csp_policy: "default-src 'none'".into(),
            ..Default::default()
        };
        let policy = compile(&config);
        assert_eq!(policy.csp_header(), Some(&CONTENT_SECURITY_POLICY_REPORT_ONLY));
        assert_eq!(policy.headers()[3].1, "default-src 'none'");
    }

    #[test]
    fn enforcing_csp_uses_enforcing_header() {
        let config = SecurityHeadersConfig {
            csp_enabled: true,
            csp_report_only: false,
            ..Default::default()
        };
        let policy = compile(&config);
        assert_eq!(policy.csp_header(), Some(&CONTENT_SECURITY_POLICY));
        assert_eq!(
            policy.headers()[3].1,
            crate::config::model::DEFAULT_CSP_POLICY
        );
    }

    #[tokio::test]
    async fn layers_fill_in_missing_headers() {
        let config = SecurityHeadersConfig {
            csp_enabled: true,
            ..Default::default()
        };
        let headers = respond(&compile(&config), HeaderMap::new()).await;

        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert!(headers.contains_key("referrer-policy"));
        assert!(headers.contains_key("permissions-policy"));
        assert!(headers.contains_key("content-security-policy-report-only"));
        assert!(!headers.contains_key("content-security-policy"));
    }

    #[tokio::test]
    async fn layers_preserve_existing_values() {
        let config = SecurityHeadersConfig {
            csp_enabled: true,
            csp_report_only: false,
            ..Default::default()
        };
        let mut preset = HeaderMap::new();
        preset.insert("referrer-policy", HeaderValue::from_static("no-referrer"));
        preset.insert(
            "content-security-policy",
            HeaderValue::from_static("default-src *"),
        );
        let headers = respond(&compile(&config), preset).await;

        assert_eq!(headers.get("referrer-policy").unwrap(), "no-referrer");
        assert_eq!(headers.get_all("referrer-policy").iter().count(), 1);
        assert_eq!(
            headers.get("content-security-policy").unwrap(),
            "default-src *"
        );
    }

    #[tokio::test]
    async fn disabled_layers_leave_response_untouched() {
        let config = SecurityHeadersConfig {
            enabled: false,
            ..Default::default()
        };
        let headers = respond(&compile(&config), HeaderMap::new()).await;
        assert!(headers.is_empty());
    }

    #[test]
    fn production_profile_defaults_to_same_origin() {
        let policy =
            SecurityHeaders::from_config(&SecurityHeadersConfig::default(), Profile::Production)
                .unwrap();
        assert_eq!(policy.headers()[0].1, "same-origin");
    }

    #[test]
    fn illegal_header_value_is_rejected() {
        let config = SecurityHeadersConfig {
            permissions_policy: "camera=()\r\nX-Evil: 1".into(),
            ..Default::default()
        };
        let err = SecurityHeaders::from_config(&config, Profile::Development).unwrap_err();
        assert!(err.to_string().contains("PERMISSIONS_POLICY"));
    }
}
