//! Optional Sentry error tracking integration.
//!
//! Initializes the Sentry SDK with the provided DSN. The environment tag
//! defaults to the active settings profile. The returned guard must be
//! held for the lifetime of the application to ensure errors and panics
//! are reported.

use crate::config::Profile;

pub fn init(dsn: &str, environment: Option<&str>, profile: Profile) -> sentry::ClientInitGuard {
    let parsed_dsn = match dsn.parse() {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::warn!(error = %e, "invalid Sentry DSN, error tracking disabled");
            None
        }
    };

    let environment = environment.unwrap_or_else(|| profile.as_str()).to_string();

    sentry::init(sentry::ClientOptions {
        dsn: parsed_dsn,
        environment: Some(environment.into()),
        release: Some(concat!("gatehouse@", env!("CARGO_PKG_VERSION")).into()),
        ..Default::default()
    })
}
