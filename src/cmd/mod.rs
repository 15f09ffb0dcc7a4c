//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`validate`], or [`health`]. Each handler
//! lives in its own submodule.

pub mod health;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::GatehouseError;

pub async fn dispatch(cli: Cli) -> Result<(), GatehouseError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args),
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  gatehouse v{version} \u{2014} request correlation and security headers\n\n  \
         No command provided. To get started:\n\n    \
         gatehouse run                     Start the server on 0.0.0.0:8000\n    \
         gatehouse validate                Check settings from env and .env\n    \
         gatehouse health                  Probe a running instance\n    \
         gatehouse --help                  See all commands and options\n"
    );
}
