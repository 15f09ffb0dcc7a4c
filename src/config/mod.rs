//! Settings composition and validation.
//!
//! Settings come from command-line flags, environment variables, and an
//! optional `.env` file, in that order of precedence. A [`Profile`]
//! (development or production) adjusts the defaults layered underneath.
//! Submodules provide the data model and validation logic.

pub mod model;
pub mod validation;

pub use model::{Profile, SecurityHeadersConfig};

/// Load `.env` from the working directory into the process environment.
///
/// Must run before clap parses arguments so that `env = "..."` fallbacks
/// see the values. Variables already set in the environment win. A
/// missing file is not an error.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(e) if e.not_found() => {}
        Err(e) => eprintln!("Warning: failed to load .env file: {e}"),
    }
}
