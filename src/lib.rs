//! Gatehouse is an HTTP edge service for request correlation and
//! defensive response headers.
//!
//! Every request gets exactly one `X-Request-ID`, adopted from the client
//! or generated, which is echoed on the response and stamped on every log
//! line emitted while the request is handled. Every response gets a
//! settings-driven set of security headers (`Referrer-Policy`,
//! `Permissions-Policy`, `X-Content-Type-Options`, and an optional CSP),
//! never overriding a value a handler already set.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, validate, health).
//! - [`config`] -- Profile-aware settings from flags, env, and `.env`, plus
//!   validation.
//! - [`csp_report`] -- `POST /csp-report` violation report intake.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`health`] -- `GET /health` endpoint handler.
//! - [`logging`] -- Structured tracing setup; every line carries the
//!   request id in scope.
//! - [`middleware`] -- Request correlator and security header injector as
//!   Tower layers.
//! - [`server`] -- Axum server setup, shared application state, and
//!   graceful shutdown.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `sentry-integration` | Sentry error tracking |
//! | `full` | All features |

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod csp_report;
pub mod error;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod server;

#[cfg(feature = "sentry-integration")]
pub mod sentry_integration;
