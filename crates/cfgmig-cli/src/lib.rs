//! cfgmig Command-Line Front End
//!
//! Argument definition, store settings overlay and subcommand handlers of
//! the `cfgmig` binary. Store settings come from an optional TOML file and
//! are overridden by flags; the resulting [`cfgmig_store::StoreConfig`] is
//! handed to the store client explicitly.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cli;
pub mod commands;
pub mod logging;
pub mod settings;

use anyhow::{bail, Result};
use clap::ArgMatches;

/// Dispatch the parsed command line
///
/// # Errors
/// Returns the error of the selected subcommand
pub async fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("migrate", args)) => commands::run_migrate(args).await,
        Some(("steps", _)) => {
            commands::run_steps();
            Ok(())
        }
        Some(("chain", args)) => commands::run_chain(args),
        Some((other, _)) => bail!("unknown subcommand '{other}'"),
        None => bail!("no subcommand given"),
    }
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
