//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, validate, health), and their associated argument
//! structs. Every setting has an environment variable equivalent for
//! container deployments, and a `.env` file in the working directory is
//! read before parsing.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{Profile, SecurityHeadersConfig};

#[derive(Parser)]
#[command(
    name = "gatehouse",
    version,
    about = "HTTP edge service with request correlation and security headers",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        gatehouse run                              Start on 0.0.0.0:8000\n  \
        gatehouse run --csp-enabled true           Start with a report-only CSP\n  \
        gatehouse validate                         Check settings from env / .env"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Run(Box<RunArgs>),

    /// Validate settings without starting
    Validate(ValidateArgs),

    /// Check health of a running instance
    Health(HealthArgs),
}

/// Settings shared by every command that builds the header policy.
#[derive(Args, Clone, Debug)]
pub struct SettingsArgs {
    /// Settings profile layered over the base defaults
    #[arg(long, env = "APP_ENV", value_enum, default_value_t = Profile::Development)]
    pub profile: Profile,

    #[command(flatten)]
    pub security: SecurityHeadersConfig,
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        gatehouse run                                       Development defaults\n  \
        gatehouse run -p 8080 --pretty                      Local dev mode\n  \
        APP_ENV=production CSP_ENABLED=true gatehouse run   Production with CSP")]
pub struct RunArgs {
    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[command(flatten)]
    pub settings: SettingsArgs,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (wins over --pretty, profile, and TTY detection)
    #[arg(
        long,
        env = "JSON_LOGS",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub json: bool,

    // -- Observability --
    /// Sentry DSN (enables error tracking)
    #[cfg(feature = "sentry-integration")]
    #[arg(long, env = "SENTRY_DSN", help_heading = "Observability")]
    pub sentry_dsn: Option<String>,

    /// Sentry environment tag [default: the profile]
    #[cfg(feature = "sentry-integration")]
    #[arg(long, env = "SENTRY_ENVIRONMENT", help_heading = "Observability")]
    pub sentry_environment: Option<String>,

    // -- Tuning --
    /// Max request body size in bytes
    #[arg(
        long,
        env = "MAX_BODY_SIZE",
        default_value_t = 65_536,
        help_heading = "Tuning"
    )]
    pub max_body: usize,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:8000")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}
